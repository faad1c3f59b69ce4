/// Gallery mirror
///
/// The mirror is an ordered, deduplicated view of the artifacts the
/// store most recently reported. The change feed delivers authoritative
/// full snapshots, not deltas, so applying a snapshot replaces the whole
/// mirror with the normalized snapshot set. Normalization is idempotent:
/// applying the same snapshot twice leaves the mirror unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single fused-image artifact resident in the store.
/// Identity is `id`; two records with the same id are the same artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryArtifact {
    pub id: String,
    pub url: String,
    /// Creation time, milliseconds since the epoch
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_title: Option<String>,
}

impl GalleryArtifact {
    /// Human-readable creation date for the gallery cards.
    pub fn created_label(&self) -> String {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown date".to_string())
    }
}

/// Ordered sequence of artifacts: newest-first by timestamp, ties broken
/// by ascending id for determinism, no duplicate ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryMirror {
    artifacts: Vec<GalleryArtifact>,
}

impl GalleryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mirror with the normalized snapshot.
    pub fn apply_snapshot(&mut self, snapshot: Vec<GalleryArtifact>) {
        self.artifacts = normalize(snapshot);
    }

    /// Merge one freshly-published artifact into the mirror by id.
    /// A later authoritative snapshot supersedes the merge either way.
    pub fn adopt(&mut self, artifact: GalleryArtifact) {
        let mut next = std::mem::take(&mut self.artifacts);
        next.push(artifact);
        self.artifacts = normalize(next);
    }

    pub fn artifacts(&self) -> &[GalleryArtifact] {
        &self.artifacts
    }

    pub fn newest(&self) -> Option<&GalleryArtifact> {
        self.artifacts.first()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }
}

/// Deduplicate by id (the last occurrence wins) and sort newest-first,
/// ascending id on equal timestamps.
fn normalize(snapshot: Vec<GalleryArtifact>) -> Vec<GalleryArtifact> {
    let mut by_id: HashMap<String, GalleryArtifact> = HashMap::with_capacity(snapshot.len());
    for artifact in snapshot {
        by_id.insert(artifact.id.clone(), artifact);
    }

    let mut out: Vec<GalleryArtifact> = by_id.into_values().collect();
    out.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
    out
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

    fn ids(mirror: &GalleryMirror) -> Vec<&str> {
        mirror.artifacts().iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_snapshot_sorts_newest_first() {
        let mut mirror = GalleryMirror::new();
        mirror.apply_snapshot(vec![artifact("a", 100), artifact("b", 200)]);
        assert_eq!(ids(&mirror), vec!["b", "a"]);
    }

    #[test]
    fn test_equal_timestamps_break_ties_by_id() {
        let mut mirror = GalleryMirror::new();
        mirror.apply_snapshot(vec![artifact("z", 50), artifact("m", 50), artifact("a", 50)]);
        assert_eq!(ids(&mirror), vec!["a", "m", "z"]);
    }

    #[test]
    fn test_duplicate_ids_are_collapsed_last_wins() {
        let mut mirror = GalleryMirror::new();
        let mut updated = artifact("a", 100);
        updated.url = "https://store.example/a-v2.png".to_string();

        mirror.apply_snapshot(vec![artifact("a", 100), artifact("b", 200), updated.clone()]);
        assert_eq!(mirror.len(), 2);
        assert_eq!(mirror.artifacts()[1], updated);
    }

    #[test]
    fn test_repeated_snapshot_is_idempotent() {
        let snapshot = vec![artifact("a", 100), artifact("b", 200), artifact("c", 150)];

        let mut mirror = GalleryMirror::new();
        mirror.apply_snapshot(snapshot.clone());
        let once = mirror.clone();

        mirror.apply_snapshot(snapshot);
        assert_eq!(mirror, once);
    }

    #[test]
    fn test_snapshot_drops_entries_the_store_no_longer_reports() {
        let mut mirror = GalleryMirror::new();
        mirror.apply_snapshot(vec![artifact("a", 100), artifact("b", 200)]);
        mirror.apply_snapshot(vec![artifact("b", 200)]);
        assert_eq!(ids(&mirror), vec!["b"]);
    }

    #[test]
    fn test_adopt_inserts_in_order_and_dedups() {
        let mut mirror = GalleryMirror::new();
        mirror.apply_snapshot(vec![artifact("a", 100), artifact("c", 300)]);

        mirror.adopt(artifact("b", 200));
        assert_eq!(ids(&mirror), vec!["c", "b", "a"]);

        // Adopting a record the store already reported replaces it
        mirror.adopt(artifact("c", 300));
        assert_eq!(mirror.len(), 3);
    }

    #[test]
    fn test_newest() {
        let mut mirror = GalleryMirror::new();
        assert!(mirror.newest().is_none());
        mirror.apply_snapshot(vec![artifact("a", 100), artifact("b", 200)]);
        assert_eq!(mirror.newest().unwrap().id, "b");
    }

    #[test]
    fn test_wire_shape_round_trips_camel_case() {
        let json = r#"{"id":"a","url":"https://x/a.png","timestamp":123,"displayTitle":"Duo"}"#;
        let parsed: GalleryArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.display_title.as_deref(), Some("Duo"));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), json);
    }
}
