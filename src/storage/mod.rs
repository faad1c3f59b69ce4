/// Artifact store HTTP client
///
/// The store is an external collaborator consumed through three
/// primitives: a one-shot full listing, an idempotent multipart write,
/// and a change feed. The feed contract is authoritative full snapshots
/// (never deltas), rendered here as a periodic full listing stream that
/// plugs into `iced::Subscription`.

pub mod publish;

use std::time::Duration;

use iced::futures::{stream, Stream};
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::gallery::mirror::GalleryArtifact;

/// How often the change feed polls the store for a fresh snapshot
pub const FEED_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Request(String),

    #[error("storage response was malformed: {0}")]
    Decode(String),
}

/// One-shot full listing of every artifact in the store.
pub async fn list_artifacts(storage_url: String) -> Result<Vec<GalleryArtifact>, StorageError> {
    let response = reqwest::Client::new()
        .get(format!("{storage_url}/artifacts"))
        .send()
        .await
        .map_err(|e| StorageError::Request(e.to_string()))?
        .error_for_status()
        .map_err(|e| StorageError::Request(e.to_string()))?;

    response
        .json::<Vec<GalleryArtifact>>()
        .await
        .map_err(|e| StorageError::Decode(e.to_string()))
}

/// Write image bytes into the store under a display label.
/// Idempotent from the caller's perspective: retrying after a transient
/// failure is safe.
pub async fn store_artifact(
    storage_url: String,
    bytes: Vec<u8>,
    label: String,
) -> Result<GalleryArtifact, StorageError> {
    let part = Part::bytes(bytes)
        .file_name("fusion.png")
        .mime_str("image/png")
        .map_err(|e| StorageError::Request(e.to_string()))?;

    let form = Form::new().part("file", part).text("label", label);

    let response = reqwest::Client::new()
        .post(format!("{storage_url}/artifacts"))
        .multipart(form)
        .send()
        .await
        .map_err(|e| StorageError::Request(e.to_string()))?
        .error_for_status()
        .map_err(|e| StorageError::Request(e.to_string()))?;

    response
        .json::<GalleryArtifact>()
        .await
        .map_err(|e| StorageError::Decode(e.to_string()))
}

/// Change-feed stream: yields an authoritative full snapshot per tick.
/// Transient listing failures are logged and retried on the next tick;
/// only the initial load has a user-facing error state.
pub fn watch(storage_url: String) -> impl Stream<Item = Vec<GalleryArtifact>> + Send {
    stream::unfold(storage_url, |url| async move {
        loop {
            tokio::time::sleep(FEED_POLL_INTERVAL).await;
            match list_artifacts(url.clone()).await {
                Ok(snapshot) => return Some((snapshot, url)),
                Err(e) => eprintln!("⚠️  Gallery feed poll failed: {e}"),
            }
        }
    })
}
