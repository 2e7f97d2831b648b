/// Image format utilities and type-safe format handling
///
/// Maps file extensions to declared media types on intake, and declared media
/// types to the encoder the native codec uses on output.
use crate::constants::FALLBACK_MIME_TYPE;
use image::ImageFormat;
use std::fmt;
use std::path::Path;

/// Formats recognised on intake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqueezeImageFormat {
    Jpeg,
    Png,
    WebP,
    Bmp,
    Tiff,
    Gif,
}

impl SqueezeImageFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(SqueezeImageFormat::Jpeg),
            "png" => Some(SqueezeImageFormat::Png),
            "webp" => Some(SqueezeImageFormat::WebP),
            "bmp" => Some(SqueezeImageFormat::Bmp),
            "tif" | "tiff" => Some(SqueezeImageFormat::Tiff),
            "gif" => Some(SqueezeImageFormat::Gif),
            _ => None,
        }
    }

    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(SqueezeImageFormat::Jpeg),
            "image/png" => Some(SqueezeImageFormat::Png),
            "image/webp" => Some(SqueezeImageFormat::WebP),
            "image/bmp" => Some(SqueezeImageFormat::Bmp),
            "image/tiff" => Some(SqueezeImageFormat::Tiff),
            "image/gif" => Some(SqueezeImageFormat::Gif),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            SqueezeImageFormat::Jpeg => "image/jpeg",
            SqueezeImageFormat::Png => "image/png",
            SqueezeImageFormat::WebP => "image/webp",
            SqueezeImageFormat::Bmp => "image/bmp",
            SqueezeImageFormat::Tiff => "image/tiff",
            SqueezeImageFormat::Gif => "image/gif",
        }
    }
}

/// Formats the native codec can write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JPEG format with lossy compression
    Jpeg,
    /// PNG format with lossless compression, optimised by oxipng
    Png,
    /// WebP format (lossless encoder)
    WebP,
}

impl OutputFormat {
    /// Output format for a declared input type. Inputs without a writer of
    /// their own (BMP, TIFF, GIF, unknown) are re-encoded as JPEG.
    pub fn for_mime_type(mime_type: &str) -> Self {
        match SqueezeImageFormat::from_mime_type(mime_type) {
            Some(SqueezeImageFormat::Png) => OutputFormat::Png,
            Some(SqueezeImageFormat::WebP) => OutputFormat::WebP,
            _ => OutputFormat::Jpeg,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    /// Convert to the image crate's ImageFormat
    pub fn to_image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
        }
    }

    /// Whether the quality factor changes the encoded size
    pub fn is_lossy(&self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
        };
        write!(f, "{}", name)
    }
}

/// Declared media type for a file on disk, judged by extension only
pub fn mime_type_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(SqueezeImageFormat::from_extension)
        .map(|format| format.mime_type())
        .unwrap_or(FALLBACK_MIME_TYPE)
}
