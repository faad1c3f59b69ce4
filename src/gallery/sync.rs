/// Gallery synchronizer
///
/// Reconciles the remote store's change feed with the local mirror.
/// Every subscription gets an epoch stamp; completions from a previous
/// epoch (a superseded initial fetch, a feed tick that raced an
/// unsubscribe) are discarded with a single equality test. The initial
/// full listing and the change feed are independent: a failed initial
/// load is reported once and any later feed snapshot clears it.

use super::mirror::{GalleryArtifact, GalleryMirror};

#[derive(Debug, Default)]
pub struct GallerySync {
    mirror: GalleryMirror,
    /// Initial-load failure, cleared by any later applied snapshot
    error: Option<String>,
    /// True between subscribe and the first applied snapshot or error
    loading: bool,
    epoch: u64,
    subscribed: bool,
}

impl GallerySync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new subscription epoch. Returns the epoch stamp every
    /// completion for this subscription must carry.
    pub fn subscribe(&mut self) -> u64 {
        self.epoch += 1;
        self.subscribed = true;
        self.loading = true;
        self.error = None;
        self.epoch
    }

    /// Stop delivery. Idempotent; bumps the epoch so anything still in
    /// flight (including the initial fetch) resolves as stale.
    pub fn unsubscribe(&mut self) {
        if self.subscribed {
            self.subscribed = false;
            self.loading = false;
            self.epoch += 1;
        }
    }

    /// Land the initial full-listing result. Returns whether it was
    /// applied (false = stale or unsubscribed, discarded).
    pub fn apply_initial(
        &mut self,
        epoch: u64,
        result: Result<Vec<GalleryArtifact>, String>,
    ) -> bool {
        if !self.is_current(epoch) {
            return false;
        }

        self.loading = false;
        match result {
            Ok(snapshot) => {
                self.error = None;
                self.mirror.apply_snapshot(snapshot);
            }
            Err(reason) => {
                // The feed subscription stays live; a later snapshot
                // supersedes this error
                self.error = Some(reason);
            }
        }
        true
    }

    /// Land a feed-delivered snapshot. Returns whether it was applied.
    pub fn apply_feed(&mut self, epoch: u64, snapshot: Vec<GalleryArtifact>) -> bool {
        if !self.is_current(epoch) {
            return false;
        }

        self.loading = false;
        self.error = None;
        self.mirror.apply_snapshot(snapshot);
        true
    }

    /// Take ownership of a freshly-published artifact.
    pub fn adopt(&mut self, artifact: GalleryArtifact) {
        self.mirror.adopt(artifact);
    }

    pub fn mirror(&self) -> &GalleryMirror {
        &self.mirror
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.subscribed && epoch == self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(id: &str, timestamp: i64) -> GalleryArtifact {
        GalleryArtifact {
            id: id.to_string(),
            url: format!("https://store.example/{id}.png"),
            timestamp,
            display_title: None,
        }
    }

    fn ids(sync: &GallerySync) -> Vec<&str> {
        sync.mirror().artifacts().iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_initial_load_populates_mirror() {
        let mut sync = GallerySync::new();
        let epoch = sync.subscribe();
        assert!(sync.is_loading());

        assert!(sync.apply_initial(epoch, Ok(vec![artifact("a", 100)])));
        assert!(!sync.is_loading());
        assert_eq!(ids(&sync), vec!["a"]);
        assert!(sync.error().is_none());
    }

    #[test]
    fn test_failed_initial_load_is_cleared_by_feed_snapshot() {
        let mut sync = GallerySync::new();
        let epoch = sync.subscribe();

        assert!(sync.apply_initial(epoch, Err("listing unavailable".to_string())));
        assert_eq!(sync.error(), Some("listing unavailable"));

        // The feed is independent of the initial fetch and clears the error
        assert!(sync.apply_feed(epoch, vec![artifact("a", 100), artifact("b", 200)]));
        assert!(sync.error().is_none());
        assert_eq!(ids(&sync), vec!["b", "a"]);
    }

    #[test]
    fn test_late_initial_result_after_unsubscribe_is_discarded() {
        let mut sync = GallerySync::new();
        let epoch = sync.subscribe();
        sync.apply_feed(epoch, vec![artifact("a", 100)]);

        sync.unsubscribe();

        // The initial fetch resolves after the unsubscribe
        assert!(!sync.apply_initial(epoch, Ok(vec![artifact("z", 999)])));
        assert!(!sync.apply_feed(epoch, vec![artifact("z", 999)]));
        assert_eq!(ids(&sync), vec!["a"]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let mut sync = GallerySync::new();
        sync.subscribe();
        sync.unsubscribe();
        let epoch_after_first = sync.epoch();

        sync.unsubscribe();
        sync.unsubscribe();
        assert_eq!(sync.epoch(), epoch_after_first);
        assert!(!sync.is_subscribed());
    }

    #[test]
    fn test_resubscribe_invalidates_prior_epoch() {
        let mut sync = GallerySync::new();
        let old = sync.subscribe();
        sync.unsubscribe();
        let new = sync.subscribe();
        assert_ne!(old, new);

        assert!(!sync.apply_feed(old, vec![artifact("stale", 1)]));
        assert!(sync.apply_feed(new, vec![artifact("fresh", 2)]));
        assert_eq!(ids(&sync), vec!["fresh"]);
    }

    #[test]
    fn test_adopt_merges_published_artifact() {
        let mut sync = GallerySync::new();
        let epoch = sync.subscribe();
        sync.apply_feed(epoch, vec![artifact("a", 100)]);

        sync.adopt(artifact("fresh", 300));
        assert_eq!(ids(&sync), vec!["fresh", "a"]);

        // The next authoritative snapshot remains the source of truth
        sync.apply_feed(epoch, vec![artifact("a", 100)]);
        assert_eq!(ids(&sync), vec!["a"]);
    }

    #[test]
    fn test_failed_publish_leaves_mirror_untouched() {
        // A fusion can succeed while its publish fails; nothing is
        // adopted and the mirror must not contain the artifact
        let mut sync = GallerySync::new();
        let epoch = sync.subscribe();
        sync.apply_feed(epoch, vec![artifact("a", 100)]);

        assert_eq!(ids(&sync), vec!["a"]);
    }
}
