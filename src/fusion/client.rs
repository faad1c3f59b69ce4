/// HTTP client for the remote fusion endpoint
///
/// The endpoint accepts a multipart form with both image payloads and
/// the instruction text, and answers with a JSON artifact reference.
/// On a non-success status the body may carry a human-readable
/// `message` field; when present it is surfaced verbatim.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

use super::pipeline::FusionRequest;

/// Reference to a produced artifact, as returned by the fusion service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArtifactRef {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
}

/// Error body shape of the fusion service. Only `message` is relied upon.
#[derive(Debug, Deserialize)]
struct ServiceFailure {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FusionError {
    /// The request never produced a usable response (network, transport)
    #[error("fusion request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status
    #[error("{0}")]
    Service(String),
}

/// Submit a fusion request and return the produced artifact reference.
pub async fn combine(service_url: String, request: FusionRequest) -> Result<ArtifactRef, FusionError> {
    let form = Form::new()
        .part("image1", image_part(request.first.bytes, request.first.name, &request.first.mime)?)
        .part("image2", image_part(request.second.bytes, request.second.name, &request.second.mime)?)
        .text("prompt", request.instruction);

    let response = reqwest::Client::new()
        .post(format!("{service_url}/api/images/combine"))
        .multipart(form)
        .send()
        .await
        .map_err(|e| FusionError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        // Prefer the service's own message; fall back to something generic
        let message = response
            .json::<ServiceFailure>()
            .await
            .ok()
            .and_then(|failure| failure.message)
            .unwrap_or_else(|| format!("fusion service returned {status}"));
        return Err(FusionError::Service(message));
    }

    response
        .json::<ArtifactRef>()
        .await
        .map_err(|e| FusionError::Request(e.to_string()))
}

fn image_part(bytes: Vec<u8>, name: String, mime: &str) -> Result<Part, FusionError> {
    Part::bytes(bytes)
        .file_name(name)
        .mime_str(mime)
        .map_err(|e| FusionError::Request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_ref_deserializes_without_id() {
        let parsed: ArtifactRef =
            serde_json::from_str(r#"{"url": "https://cdn.example/fused.png"}"#).unwrap();
        assert_eq!(parsed.id, None);
        assert_eq!(parsed.url, "https://cdn.example/fused.png");
    }

    #[test]
    fn test_service_failure_tolerates_missing_message() {
        let parsed: ServiceFailure = serde_json::from_str(r#"{"code": 42}"#).unwrap();
        assert_eq!(parsed.message, None);

        let parsed: ServiceFailure =
            serde_json::from_str(r#"{"message": "both images are required"}"#).unwrap();
        assert_eq!(parsed.message.as_deref(), Some("both images are required"));
    }
}
