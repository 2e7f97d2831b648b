use crate::constants::{MAX_QUALITY, MIN_QUALITY};
use crate::error::CompressionError;
use std::fmt;
use std::sync::Arc;

/// An immutable image payload with the attributes a browser `File` carries.
///
/// Cloning is cheap: the bytes are shared, never copied or mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl ImageAsset {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the payload, for registries that outlive this value.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

/// User-chosen settings for one compression attempt. Passed through to the
/// invoker, never stored on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionParameters {
    quality_percent: u8,
    max_dimension_px: u32,
}

impl CompressionParameters {
    pub fn new(quality_percent: u8, max_dimension_px: u32) -> Result<Self, CompressionError> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality_percent) {
            return Err(CompressionError::InvalidQuality(quality_percent));
        }
        if max_dimension_px == 0 {
            return Err(CompressionError::InvalidMaxDimension(max_dimension_px));
        }

        Ok(Self {
            quality_percent,
            max_dimension_px,
        })
    }

    pub fn quality_percent(&self) -> u8 {
        self.quality_percent
    }

    pub fn max_dimension_px(&self) -> u32 {
        self.max_dimension_px
    }
}
