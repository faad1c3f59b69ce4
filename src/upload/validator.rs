/// Upload validation
///
/// A picked file passes three checks, in order, short-circuiting on the
/// first failure:
/// 1. the MIME type must indicate an image
/// 2. the size must not exceed 4 MiB
/// 3. the bytes must actually decode as a raster image
///
/// The decode probe is the expensive step and runs on a blocking thread
/// so it never stalls the UI loop.

use std::path::Path;

use thiserror::Error;

/// Maximum accepted upload size (4 MiB)
pub const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

/// A file as it comes out of the picker or a drop event: named,
/// typed by extension, fully read into memory, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A file that passed every validation check.
#[derive(Clone, PartialEq)]
pub struct ValidatedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ValidatedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// Keep Debug output readable; the byte payload can be megabytes.
impl std::fmt::Debug for ValidatedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Why a candidate file was turned away. All of these are locally
/// recoverable: the user picks a different file and tries again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadRejection {
    #[error("file type {0} is not a supported image format")]
    InvalidType(String),

    #[error("image is too large ({size_mib:.2} MiB); maximum size is 4 MiB")]
    TooLarge { size_mib: f64 },

    #[error("unable to load image; the file may be corrupted or not a valid image")]
    Corrupt,

    #[error("unable to read file: {0}")]
    Unreadable(String),
}

/// Run the synchronous checks (type, then size) against a candidate.
pub fn check_candidate(file: &PickedFile) -> Result<(), UploadRejection> {
    if !file.mime.starts_with("image/") {
        return Err(UploadRejection::InvalidType(file.mime.clone()));
    }

    if file.bytes.len() > MAX_UPLOAD_BYTES {
        let size_mib = file.bytes.len() as f64 / 1024.0 / 1024.0;
        return Err(UploadRejection::TooLarge { size_mib });
    }

    Ok(())
}

/// Probe that the bytes decode as a raster image.
///
/// Decoding is CPU-bound, so it runs via `spawn_blocking`; the bytes are
/// handed back on success so the caller avoids a copy.
pub async fn probe_decode(bytes: Vec<u8>) -> Result<Vec<u8>, UploadRejection> {
    tokio::task::spawn_blocking(move || match image::load_from_memory(&bytes) {
        Ok(_) => Ok(bytes),
        Err(_) => Err(UploadRejection::Corrupt),
    })
    .await
    .map_err(|e| UploadRejection::Unreadable(format!("decode task failed: {e}")))?
}

/// Full validation of a candidate: ordered checks, then the decode probe.
pub async fn validate(file: PickedFile) -> Result<ValidatedFile, UploadRejection> {
    check_candidate(&file)?;

    let bytes = probe_decode(file.bytes).await?;

    Ok(ValidatedFile {
        name: file.name,
        mime: file.mime,
        bytes,
    })
}

/// Read a file from disk and validate it as an upload candidate.
pub async fn load_and_validate(path: std::path::PathBuf) -> Result<ValidatedFile, UploadRejection> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| UploadRejection::Unreadable(e.to_string()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());

    validate(PickedFile {
        mime: mime_for_path(&path),
        name,
        bytes,
    })
    .await
}

/// Derive a MIME type from the file extension. Native file handles carry
/// no content type, so the extension is the best signal available before
/// the decode probe confirms the bytes.
pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
    .to_string()
}
