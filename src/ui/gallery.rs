/// Gallery grid
///
/// Renders the synchronized mirror as a wrapping grid of cards, with
/// loading, error, and empty states.

use iced::widget::{column, container, image, text};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use crate::gallery::mirror::GalleryArtifact;
use crate::gallery::sync::GallerySync;
use crate::gallery::thumbs::ThumbnailCache;
use crate::Message;

pub fn section<'a>(sync: &'a GallerySync, thumbs: &'a ThumbnailCache) -> Element<'a, Message> {
    let heading = text(format!("Community Gallery ({})", sync.mirror().len())).size(28);

    let body: Element<'a, Message> = if sync.is_loading() {
        text("Loading gallery…").size(15).into()
    } else if let Some(reason) = sync.error() {
        column![
            text("Gallery unavailable").size(17),
            text(reason).size(14),
            text("It will refresh automatically once the store answers.").size(13),
        ]
        .spacing(6)
        .align_x(Alignment::Center)
        .into()
    } else if sync.mirror().is_empty() {
        text("No creations yet. Be the first to publish a fusion!")
            .size(15)
            .into()
    } else {
        let cards: Vec<Element<'a, Message>> = sync
            .mirror()
            .artifacts()
            .iter()
            .map(|artifact| card(artifact, thumbs.get(&artifact.id)))
            .collect();

        Wrap::with_elements(cards)
            .spacing(16.0)
            .line_spacing(16.0)
            .into()
    };

    container(column![heading, body].spacing(18).align_x(Alignment::Center))
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into()
}

fn card<'a>(
    artifact: &'a GalleryArtifact,
    thumb: Option<&'a image::Handle>,
) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match thumb {
        Some(handle) => image(handle.clone()).width(Length::Fixed(180.0)).into(),
        // Bytes still on their way; the card fills in when they land
        None => container(text("…").size(24))
            .center_x(Length::Fixed(180.0))
            .center_y(Length::Fixed(180.0))
            .into(),
    };

    let title = artifact.display_title.as_deref().unwrap_or("Fusion creation");

    column![
        picture,
        text(title).size(13),
        text(artifact.created_label()).size(11),
    ]
    .spacing(4)
    .align_x(Alignment::Center)
    .into()
}
