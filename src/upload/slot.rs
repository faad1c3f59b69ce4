/// Upload slot state
///
/// Each of the two upload positions is an `UploadSlot`. Validation is
/// asynchronous, so a slot stamps every validation it starts with a
/// generation counter; a result only lands if its stamp still matches.
/// That gives last-submitted-wins without any shared-state gymnastics:
/// staleness is a single equality test.
///
/// Invariant: a slot holds a preview handle iff it holds a validated
/// file, and never more than one live handle at a time.

use iced::widget::image;

use super::preview::{PreviewGuard, PreviewHandle};
use super::validator::{UploadRejection, ValidatedFile};

/// What happened when an async validation result reached the slot.
#[derive(Debug, PartialEq)]
pub enum SlotOutcome {
    /// The file was accepted and the slot now holds it plus a fresh preview
    Accepted,
    /// The file was rejected; the slot is empty and the reason is surfaced
    Rejected(UploadRejection),
    /// A newer validation superseded this one; nothing changed
    Stale,
}

#[derive(Debug, Default)]
pub struct UploadSlot {
    file: Option<ValidatedFile>,
    preview: Option<PreviewHandle>,
    generation: u64,
}

impl UploadSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new validation: empty the slot (releasing any live
    /// preview) and return the stamp the eventual result must carry.
    pub fn begin(&mut self) -> u64 {
        self.empty();
        self.generation += 1;
        self.generation
    }

    /// Land an async validation result carrying `generation`.
    ///
    /// Results stamped with anything but the current generation are
    /// discarded: a later `begin` always wins over an earlier result,
    /// accepted or not.
    pub fn resolve(
        &mut self,
        generation: u64,
        result: Result<ValidatedFile, UploadRejection>,
        guard: &PreviewGuard,
    ) -> SlotOutcome {
        if generation != self.generation {
            return SlotOutcome::Stale;
        }

        match result {
            Ok(file) => {
                // begin() already emptied the slot, so this is the only
                // live handle for this slot
                self.preview = Some(guard.acquire(file.bytes.clone()));
                self.file = Some(file);
                SlotOutcome::Accepted
            }
            Err(rejection) => {
                self.empty();
                SlotOutcome::Rejected(rejection)
            }
        }
    }

    /// Manually clear the slot, releasing its preview.
    /// Also invalidates any validation still in flight.
    pub fn clear(&mut self) {
        self.empty();
        self.generation += 1;
    }

    pub fn file(&self) -> Option<&ValidatedFile> {
        self.file.as_ref()
    }

    /// Renderable preview handle, present iff the slot is filled.
    pub fn preview(&self) -> Option<&image::Handle> {
        self.preview.as_ref().and_then(|p| p.widget_handle())
    }

    pub fn is_filled(&self) -> bool {
        self.file.is_some()
    }

    fn empty(&mut self) {
        if let Some(mut preview) = self.preview.take() {
            preview.release();
        }
        self.file = None;
    }
}
