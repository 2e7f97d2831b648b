use crate::asset::ImageAsset;
use crate::constants::{IMAGE_MIME_PREFIX, MAX_UPLOAD_SIZE};
use crate::error::{ValidationError, WorkflowError};
use crate::formats::mime_type_for_path;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A file offered by the user, before any checks.
///
/// Picking a file and dropping one produce the same candidate, so both paths
/// go through [`validate`] and then into the session.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadCandidate {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, declaring its media type from the extension.
    ///
    /// The policy is checked against the file's metadata first, so a rejected
    /// file is never read into memory.
    pub async fn from_path(path: &Path) -> Result<Self, WorkflowError> {
        let read_error = |e: std::io::Error| WorkflowError::Read(path.to_path_buf(), Arc::new(e));
        let mime_type = mime_type_for_path(path);

        let metadata = tokio::fs::metadata(path).await.map_err(read_error)?;
        check_constraints(mime_type, metadata.len())?;

        let bytes = tokio::fs::read(path).await.map_err(read_error)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Check a declared media type and size against the upload policy
///
/// The size ceiling is checked first, so an oversized file is `TooLarge`
/// whatever its type.
pub fn check_constraints(mime_type: &str, size_bytes: u64) -> Result<(), ValidationError> {
    if size_bytes > MAX_UPLOAD_SIZE {
        return Err(ValidationError::TooLarge(size_bytes, MAX_UPLOAD_SIZE));
    }

    if !is_image_mime_type(mime_type) {
        return Err(ValidationError::WrongType(mime_type.to_string()));
    }

    Ok(())
}

/// Check if the declared media type indicates an image
pub fn is_image_mime_type(mime_type: &str) -> bool {
    mime_type
        .get(..IMAGE_MIME_PREFIX.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(IMAGE_MIME_PREFIX))
        .unwrap_or(false)
}

/// Validate a candidate and wrap it as an [`ImageAsset`]
pub fn validate(candidate: UploadCandidate) -> Result<ImageAsset, ValidationError> {
    check_constraints(&candidate.mime_type, candidate.size_bytes())?;
    debug!(
        name = %candidate.name,
        mime = %candidate.mime_type,
        size = candidate.size_bytes(),
        "candidate accepted by validator"
    );

    Ok(ImageAsset::new(
        candidate.name,
        candidate.mime_type,
        candidate.bytes,
    ))
}
