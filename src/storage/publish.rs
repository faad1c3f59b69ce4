/// Result publisher
///
/// On a successful fusion the produced image lives behind a service URL.
/// Publishing re-fetches those bytes, stages them as a tracked transient
/// resource, writes them into the store under a display label, and
/// releases the staged resource on every exit path. Both failure modes
/// are reported but non-fatal: the fusion itself already succeeded, and
/// retry happens by resubmitting the pipeline.

use thiserror::Error;

use crate::fusion::client::ArtifactRef;
use crate::gallery::mirror::GalleryArtifact;
use crate::upload::preview::PreviewGuard;

/// Display label attached to every published fusion
pub const PUBLISH_LABEL: &str = "Character Fusion";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PublishError {
    #[error("failed to fetch the fused image: {0}")]
    FetchFailed(String),

    #[error("failed to store the fused image: {0}")]
    WriteFailed(String),
}

/// Fetch the produced artifact and write it into the store.
/// On success the returned record's ownership passes to the gallery
/// synchronizer.
pub async fn publish(
    storage_url: String,
    guard: PreviewGuard,
    artifact: ArtifactRef,
    label: String,
) -> Result<GalleryArtifact, PublishError> {
    let response = reqwest::Client::new()
        .get(&artifact.url)
        .send()
        .await
        .map_err(|e| PublishError::FetchFailed(e.to_string()))?
        .error_for_status()
        .map_err(|e| PublishError::FetchFailed(e.to_string()))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PublishError::FetchFailed(e.to_string()))?
        .to_vec();

    // Stage the fetched bytes as a tracked transient resource for the
    // duration of the write
    let mut staged = guard.acquire(bytes);

    let result = match staged.bytes() {
        Some(data) => super::store_artifact(storage_url, data.to_vec(), label)
            .await
            .map_err(|e| PublishError::WriteFailed(e.to_string())),
        None => Err(PublishError::WriteFailed(
            "staged image was already released".to_string(),
        )),
    };

    // Released whether the write succeeded or not
    staged.release();

    result
}
