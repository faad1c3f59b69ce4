/// Upload panel
///
/// Two slot cards with previews, the fuse button, and the outcome pane
/// for the current pipeline state.

use iced::widget::{button, column, container, image, row, text};
use iced::{Alignment, Element, Length};

use crate::fusion::pipeline::{FusionPipeline, FusionState};
use crate::upload::slot::UploadSlot;
use crate::{Message, SlotIndex};

pub fn panel<'a>(
    slots: &'a [UploadSlot; 2],
    pipeline: &'a FusionPipeline,
    latest: Option<&'a image::Handle>,
    status: &'a str,
) -> Element<'a, Message> {
    let can_fuse = slots.iter().all(|slot| slot.is_filled()) && !pipeline.is_pending();

    let fuse_label = if pipeline.is_pending() {
        "Creating your fusion…"
    } else {
        "Fuse Characters"
    };

    let content = column![
        text("Character Fusion").size(40),
        row![
            slot_card(SlotIndex::First, &slots[0]),
            slot_card(SlotIndex::Second, &slots[1]),
        ]
        .spacing(30),
        button(text(fuse_label).size(20))
            .on_press_maybe(can_fuse.then_some(Message::Fuse))
            .padding(12),
        outcome_pane(pipeline.state(), latest),
        text(status).size(14),
    ]
    .spacing(20)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into()
}

fn slot_card<'a>(index: SlotIndex, slot: &'a UploadSlot) -> Element<'a, Message> {
    let body: Element<'a, Message> = match (slot.preview(), slot.file()) {
        (Some(handle), Some(file)) => column![
            image(handle.clone()).width(Length::Fixed(220.0)),
            text(file.name.as_str()).size(13),
            button("Clear").on_press(Message::ClearSlot(index)),
        ]
        .spacing(8)
        .align_x(Alignment::Center)
        .into(),
        _ => column![
            button("Choose Image")
                .on_press(Message::PickImage(index))
                .padding(10),
            text("or drop a file onto the window").size(13),
        ]
        .spacing(8)
        .align_x(Alignment::Center)
        .into(),
    };

    column![text(index.label()).size(18), body]
        .spacing(10)
        .align_x(Alignment::Center)
        .into()
}

fn outcome_pane<'a>(
    state: &'a FusionState,
    latest: Option<&'a image::Handle>,
) -> Element<'a, Message> {
    match state {
        FusionState::Idle => text("Upload both characters, then fuse them into one scene.")
            .size(15)
            .into(),
        FusionState::Pending => text("Merging your characters… this may take a moment.")
            .size(15)
            .into(),
        FusionState::Failed(reason) => column![
            text("Something went wrong").size(17),
            text(reason.as_str()).size(14),
        ]
        .spacing(6)
        .align_x(Alignment::Center)
        .into(),
        FusionState::Succeeded(_) => {
            let mut col = column![text("✨ Fusion complete!").size(17)]
                .spacing(8)
                .align_x(Alignment::Center);
            // The freshest gallery entry is the produced image once the
            // publish lands and its bytes arrive
            if let Some(handle) = latest {
                col = col.push(image(handle.clone()).width(Length::Fixed(320.0)));
            }
            col.into()
        }
    }
}
