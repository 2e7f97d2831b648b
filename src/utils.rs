/// Helper arithmetic shared by the preview and the result summary.
use crate::constants::{KIB, MIB};
use std::fmt;

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * `"512 B"` below 1 KiB, `"1.5 KB"` below 1 MiB, otherwise `"1.9 MB"`.
///   Divisors are binary; there is no unit above MB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{} B", bytes)
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

/// Size change between an original and its compressed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Whole percent saved; negative when the result grew.
    Percent(i64),
    /// The original was empty, so no ratio exists.
    Undefined,
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduction::Percent(p) => write!(f, "{}%", p),
            Reduction::Undefined => write!(f, "undefined"),
        }
    }
}

/// Calculate the size reduction as a rounded percentage
///
/// Rounds half up, so `(1 - 0.125) * 100 = 87.5` becomes 88.
pub fn calculate_reduction(original_size: u64, compressed_size: u64) -> Reduction {
    if original_size == 0 {
        return Reduction::Undefined;
    }
    let ratio = (1.0 - compressed_size as f64 / original_size as f64) * 100.0;
    Reduction::Percent((ratio + 0.5).floor() as i64)
}
