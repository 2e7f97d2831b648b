use crate::constants::{
    CODEC_UNAVAILABLE_MESSAGE, COMPRESSION_FAILED_MESSAGE, INVALID_PARAMETERS_MESSAGE,
    IN_PROGRESS_MESSAGE, NO_ORIGINAL_MESSAGE, TOO_LARGE_MESSAGE, WRONG_TYPE_MESSAGE,
};
use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Rejections raised by the file validator before a file enters the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Not an image: declared media type is {0:?}")]
    WrongType(String),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    TooLarge(u64, u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Codec unavailable: {0}")]
    CodecUnavailable(String),
}

#[derive(Debug, Clone, Error)]
pub enum CompressionError {
    #[error("No original image has been accepted")]
    NoOriginal,

    #[error("A compression is already in progress")]
    InProgress,

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid maximum dimension: {0}. Must be greater than 0")]
    InvalidMaxDimension(u32),

    #[error("Compression failed: {0}")]
    CompressionFailed(#[source] Arc<dyn StdError + Send + Sync>),
}

impl CompressionError {
    /// Wraps a codec failure, keeping the cause chain intact for diagnostics.
    pub fn failed(cause: anyhow::Error) -> Self {
        let boxed: Box<dyn StdError + Send + Sync> = cause.into();
        CompressionError::CompressionFailed(Arc::from(boxed))
    }
}

#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, Arc<std::io::Error>),
}

impl WorkflowError {
    /// The single message shown to a person for this kind of failure.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::Validation(ValidationError::WrongType(_)) => {
                WRONG_TYPE_MESSAGE.to_string()
            }
            WorkflowError::Validation(ValidationError::TooLarge(..)) => {
                TOO_LARGE_MESSAGE.to_string()
            }
            WorkflowError::Codec(CodecError::CodecUnavailable(_)) => {
                CODEC_UNAVAILABLE_MESSAGE.to_string()
            }
            WorkflowError::Compression(CompressionError::NoOriginal) => {
                NO_ORIGINAL_MESSAGE.to_string()
            }
            WorkflowError::Compression(CompressionError::InProgress) => {
                IN_PROGRESS_MESSAGE.to_string()
            }
            WorkflowError::Compression(
                CompressionError::InvalidQuality(_) | CompressionError::InvalidMaxDimension(_),
            ) => format!("{} {}", INVALID_PARAMETERS_MESSAGE, self),
            WorkflowError::Compression(CompressionError::CompressionFailed(cause)) => {
                format!("{} {}", COMPRESSION_FAILED_MESSAGE, cause)
            }
            WorkflowError::Read(path, err) => format!("Could not read {:?}: {}", path, err),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: target size must be a positive number of MB, got {0}")]
    InvalidTargetSize(f64),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
