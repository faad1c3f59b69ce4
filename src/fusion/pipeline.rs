/// Fusion submission state machine
///
/// `Idle → Pending → {Succeeded, Failed} → Idle` (a fresh submission
/// from any terminal state re-enters Pending and clears the prior
/// outcome). At most one request is ever in flight: `submit` refuses to
/// produce a second request while Pending, and every completed request
/// carries a sequence stamp so a stale completion can never land.

use thiserror::Error;

use crate::upload::slot::UploadSlot;
use crate::upload::validator::ValidatedFile;

use super::client::{ArtifactRef, FusionError};

/// The fixed instruction sent with every fusion request.
pub const FUSION_INSTRUCTION: &str = "Create a stunning artistic scene that seamlessly combines \
    these two characters into one cohesive image. The characters should appear naturally together \
    in various poses like standing side by side, sitting on a bench, in a car, at a diner, or any \
    other natural setting. Make it look like they belong in the same world and are interacting in \
    a believable way.";

/// Everything the fusion endpoint needs. Built only when both slots are
/// filled; immutable once submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionRequest {
    pub first: ValidatedFile,
    pub second: ValidatedFile,
    pub instruction: &'static str,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FusionState {
    #[default]
    Idle,
    Pending,
    Succeeded(ArtifactRef),
    Failed(String),
}

/// Why a submission did not start.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitBlocked {
    #[error("both images are required before fusing")]
    IncompleteInput,

    /// A request is already in flight; the caller must not issue another
    #[error("a fusion is already in progress")]
    InFlight,
}

#[derive(Debug, Default)]
pub struct FusionPipeline {
    state: FusionState,
    seq: u64,
}

impl FusionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FusionState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, FusionState::Pending)
    }

    /// Try to start a submission from the two upload slots.
    ///
    /// On success the pipeline is Pending and the caller must issue
    /// exactly one outbound request, reporting its completion back via
    /// `resolve` with the returned sequence stamp.
    pub fn submit(
        &mut self,
        first: &UploadSlot,
        second: &UploadSlot,
    ) -> Result<(u64, FusionRequest), SubmitBlocked> {
        if self.is_pending() {
            return Err(SubmitBlocked::InFlight);
        }

        let (Some(a), Some(b)) = (first.file(), second.file()) else {
            return Err(SubmitBlocked::IncompleteInput);
        };

        self.seq += 1;
        self.state = FusionState::Pending;

        Ok((
            self.seq,
            FusionRequest {
                first: a.clone(),
                second: b.clone(),
                instruction: FUSION_INSTRUCTION,
            },
        ))
    }

    /// Land a request completion carrying `seq`.
    ///
    /// Returns the new state, or `None` when the completion was stale
    /// (not the in-flight submission) and was discarded.
    pub fn resolve(
        &mut self,
        seq: u64,
        outcome: Result<ArtifactRef, FusionError>,
    ) -> Option<&FusionState> {
        if seq != self.seq || !self.is_pending() {
            return None;
        }

        self.state = match outcome {
            Ok(artifact) => FusionState::Succeeded(artifact),
            Err(error) => FusionState::Failed(error.to_string()),
        };

        Some(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::preview::PreviewGuard;

    fn filled_slot(name: &str) -> UploadSlot {
        let guard = PreviewGuard::new();
        let mut slot = UploadSlot::new();
        let gen = slot.begin();
        slot.resolve(
            gen,
            Ok(ValidatedFile {
                name: name.to_string(),
                mime: "image/png".to_string(),
                bytes: vec![1, 2, 3],
            }),
            &guard,
        );
        slot
    }

    fn artifact(url: &str) -> ArtifactRef {
        ArtifactRef {
            id: Some("abc".to_string()),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_submit_requires_both_slots() {
        let mut pipeline = FusionPipeline::new();
        let empty = UploadSlot::new();
        let filled = filled_slot("a.png");

        assert_eq!(
            pipeline.submit(&empty, &filled).unwrap_err(),
            SubmitBlocked::IncompleteInput
        );
        assert_eq!(
            pipeline.submit(&filled, &empty).unwrap_err(),
            SubmitBlocked::IncompleteInput
        );
        // A failed precondition never transitions
        assert_eq!(*pipeline.state(), FusionState::Idle);
    }

    #[test]
    fn test_double_submit_issues_one_request() {
        let mut pipeline = FusionPipeline::new();
        let (first, second) = (filled_slot("a.png"), filled_slot("b.png"));

        assert!(pipeline.submit(&first, &second).is_ok());
        // Second submit while Pending must not produce a request
        assert_eq!(
            pipeline.submit(&first, &second).unwrap_err(),
            SubmitBlocked::InFlight
        );
    }

    #[test]
    fn test_success_and_failure_transitions() {
        let mut pipeline = FusionPipeline::new();
        let (first, second) = (filled_slot("a.png"), filled_slot("b.png"));

        let (seq, request) = pipeline.submit(&first, &second).unwrap();
        assert_eq!(request.instruction, FUSION_INSTRUCTION);
        assert_eq!(request.first.name, "a.png");

        let state = pipeline.resolve(seq, Ok(artifact("https://x/1.png"))).unwrap();
        assert_eq!(*state, FusionState::Succeeded(artifact("https://x/1.png")));

        // A fresh submission from the terminal state clears the outcome
        let (seq, _) = pipeline.submit(&first, &second).unwrap();
        assert!(pipeline.is_pending());

        let state = pipeline
            .resolve(seq, Err(FusionError::Service("out of capacity".to_string())))
            .unwrap();
        assert_eq!(*state, FusionState::Failed("out of capacity".to_string()));
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut pipeline = FusionPipeline::new();
        let (first, second) = (filled_slot("a.png"), filled_slot("b.png"));

        let (old_seq, _) = pipeline.submit(&first, &second).unwrap();
        pipeline.resolve(old_seq, Err(FusionError::Request("timeout".to_string())));

        let (seq, _) = pipeline.submit(&first, &second).unwrap();
        assert_ne!(old_seq, seq);

        // Late duplicate completion of the old request: discarded
        assert!(pipeline.resolve(old_seq, Ok(artifact("https://x/old.png"))).is_none());
        assert!(pipeline.is_pending());

        pipeline.resolve(seq, Ok(artifact("https://x/new.png"))).unwrap();
        assert_eq!(
            *pipeline.state(),
            FusionState::Succeeded(artifact("https://x/new.png"))
        );
    }
}
