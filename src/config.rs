use crate::asset::CompressionParameters;
use crate::constants::{DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY, DEFAULT_TARGET_SIZE_MB};
use crate::error::{CompressionError, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// Tunable workflow settings, read from TOML.
///
/// ```toml
/// target_size_mb = 0.5
/// prefer_off_thread = true
/// default_quality = 80
/// default_max_dimension = 1920
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    pub target_size_mb: f64,
    pub prefer_off_thread: bool,
    pub default_quality: u8,
    pub default_max_dimension: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            target_size_mb: DEFAULT_TARGET_SIZE_MB,
            prefer_off_thread: true,
            default_quality: DEFAULT_QUALITY,
            default_max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl WorkflowConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        check_target_size(config.target_size_mb)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&text)
    }

    /// Overrides the compression target, e.g. from the command line.
    pub fn set_target_size_mb(&mut self, target_size_mb: f64) -> Result<(), ConfigError> {
        check_target_size(target_size_mb)?;
        self.target_size_mb = target_size_mb;
        Ok(())
    }

    /// Parameters from explicit choices, falling back to the configured defaults.
    pub fn parameters(
        &self,
        quality: Option<u8>,
        max_dimension: Option<u32>,
    ) -> Result<CompressionParameters, CompressionError> {
        CompressionParameters::new(
            quality.unwrap_or(self.default_quality),
            max_dimension.unwrap_or(self.default_max_dimension),
        )
    }
}

fn check_target_size(target_size_mb: f64) -> Result<(), ConfigError> {
    if target_size_mb.is_finite() && target_size_mb > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidTargetSize(target_size_mb))
    }
}
