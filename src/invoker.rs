use crate::asset::{CompressionParameters, ImageAsset};
use crate::codec::{CodecHandle, CodecOptions};
use crate::config::WorkflowConfig;
use crate::constants::DEFAULT_TARGET_SIZE_MB;
use crate::error::CompressionError;
use tracing::{info, warn};

/// Translates user parameters into codec options and runs one encode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionInvoker {
    target_size_mb: f64,
    prefer_off_thread: bool,
}

impl Default for CompressionInvoker {
    fn default() -> Self {
        Self {
            target_size_mb: DEFAULT_TARGET_SIZE_MB,
            prefer_off_thread: true,
        }
    }
}

impl CompressionInvoker {
    pub fn new(target_size_mb: f64, prefer_off_thread: bool) -> Self {
        Self {
            target_size_mb,
            prefer_off_thread,
        }
    }

    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self::new(config.target_size_mb, config.prefer_off_thread)
    }

    pub fn codec_options(&self, params: &CompressionParameters) -> CodecOptions {
        CodecOptions {
            target_size_mb: self.target_size_mb,
            max_dimension_px: params.max_dimension_px(),
            initial_quality: f64::from(params.quality_percent()) / 100.0,
            prefer_off_thread: self.prefer_off_thread,
        }
    }

    /// Exactly one codec call; the output is returned as the codec produced it.
    pub async fn compress(
        &self,
        original: &ImageAsset,
        params: &CompressionParameters,
        codec: &CodecHandle,
    ) -> Result<ImageAsset, CompressionError> {
        let options = self.codec_options(params);
        match codec.encode(original, &options).await {
            Ok(result) => {
                info!(
                    codec = codec.name(),
                    name = original.name(),
                    before = original.size_bytes(),
                    after = result.size_bytes(),
                    "compression finished"
                );
                Ok(result)
            }
            Err(cause) => {
                let message = format!("{:#}", cause);
                warn!(codec = codec.name(), name = original.name(), error = %message, "codec rejected input");
                Err(CompressionError::failed(cause))
            }
        }
    }
}
