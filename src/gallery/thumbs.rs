/// Thumbnail cache for gallery rendering
///
/// Gallery artifacts live behind remote URLs, so their bytes are fetched
/// once and cached as widget handles. The cache tracks in-flight fetches
/// to avoid duplicates and drops entries for artifacts the mirror no
/// longer contains.

use std::collections::{HashMap, HashSet};

use iced::widget::image;

use super::mirror::GalleryArtifact;

#[derive(Debug, Default)]
pub struct ThumbnailCache {
    handles: HashMap<String, image::Handle>,
    pending: HashSet<String>,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&image::Handle> {
        self.handles.get(id)
    }

    /// Mark every artifact without cached bytes or an in-flight fetch as
    /// pending, and return those needing a fetch. Also evicts cache
    /// entries for artifacts the mirror no longer reports.
    pub fn reconcile(&mut self, artifacts: &[GalleryArtifact]) -> Vec<GalleryArtifact> {
        let current: HashSet<&str> = artifacts.iter().map(|a| a.id.as_str()).collect();
        self.handles.retain(|id, _| current.contains(id.as_str()));

        let mut to_fetch = Vec::new();
        for artifact in artifacts {
            if self.handles.contains_key(&artifact.id) || self.pending.contains(&artifact.id) {
                continue;
            }
            self.pending.insert(artifact.id.clone());
            to_fetch.push(artifact.clone());
        }
        to_fetch
    }

    /// Land a fetch result. `None` means the fetch failed; the entry is
    /// unmarked so a later reconcile can retry it.
    pub fn store(&mut self, id: String, bytes: Option<Vec<u8>>) {
        self.pending.remove(&id);
        if let Some(bytes) = bytes {
            self.handles.insert(id, image::Handle::from_bytes(bytes));
        }
    }
}

/// Fetch artifact bytes for the cache. Failures map to `None`; a missing
/// thumbnail only degrades one gallery card.
pub async fn fetch(url: String) -> Option<Vec<u8>> {
    let response = reqwest::Client::new().get(&url).send().await.ok()?;
    let response = response.error_for_status().ok()?;
    Some(response.bytes().await.ok()?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(id: &str) -> GalleryArtifact {
        GalleryArtifact {
            id: id.to_string(),
            url: format!("https://store.example/{id}.png"),
            timestamp: 0,
            display_title: None,
        }
    }

    #[test]
    fn test_reconcile_requests_each_artifact_once() {
        let mut cache = ThumbnailCache::new();
        let artifacts = vec![artifact("a"), artifact("b")];

        let first = cache.reconcile(&artifacts);
        assert_eq!(first.len(), 2);

        // Still pending: no duplicate fetches
        let second = cache.reconcile(&artifacts);
        assert!(second.is_empty());
    }

    #[test]
    fn test_store_and_get() {
        let mut cache = ThumbnailCache::new();
        cache.reconcile(&[artifact("a")]);

        cache.store("a".to_string(), Some(vec![1, 2, 3]));
        assert!(cache.get("a").is_some());
        assert!(cache.reconcile(&[artifact("a")]).is_empty());
    }

    #[test]
    fn test_failed_fetch_is_retried_on_next_reconcile() {
        let mut cache = ThumbnailCache::new();
        cache.reconcile(&[artifact("a")]);

        cache.store("a".to_string(), None);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.reconcile(&[artifact("a")]).len(), 1);
    }

    #[test]
    fn test_reconcile_evicts_removed_artifacts() {
        let mut cache = ThumbnailCache::new();
        cache.reconcile(&[artifact("a"), artifact("b")]);
        cache.store("a".to_string(), Some(vec![1]));
        cache.store("b".to_string(), Some(vec![2]));

        cache.reconcile(&[artifact("b")]);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }
}
