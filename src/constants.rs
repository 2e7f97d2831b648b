pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;
pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

/// Upload ceiling. Fixed policy, not configurable.
pub const MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Soft size target handed to the codec, in megabytes.
pub const DEFAULT_TARGET_SIZE_MB: f64 = 0.5;

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * 1024;

pub const IMAGE_MIME_PREFIX: &str = "image/";
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";
pub const DOWNLOAD_NAME_PREFIX: &str = "compressed_";
pub const BLOB_URL_PREFIX: &str = "blob:squeeze/";

// Native codec search toward the target size
pub const MAX_ENCODE_ITERATIONS: u32 = 10;
pub const ITERATION_SCALE_FACTOR: f32 = 0.95;
pub const MIN_ENCODE_QUALITY: u8 = 5;
pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;

pub const WRONG_TYPE_MESSAGE: &str = "Please select a valid image file (JPG, PNG, etc.)";
pub const TOO_LARGE_MESSAGE: &str = "File size too large! Maximum 10MB allowed.";
pub const NO_ORIGINAL_MESSAGE: &str = "Please upload an image first!";
pub const IN_PROGRESS_MESSAGE: &str = "Compression is already running, please wait.";
pub const CODEC_UNAVAILABLE_MESSAGE: &str =
    "Image compression library could not be loaded. Please try again.";
pub const COMPRESSION_FAILED_MESSAGE: &str = "Error compressing image:";
pub const INVALID_PARAMETERS_MESSAGE: &str = "Invalid compression settings:";

pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const REDUCTION_PREFIX: &str = "🎯 Reduction:";
pub const SUCCESS_PREFIX: &str = "✅";
pub const INFO_PREFIX: &str = "📋";
pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
