use crate::asset::ImageAsset;
use crate::utils::format_file_size;
use image::ImageReader;
use std::io::Cursor;

/// What the preview pane shows for an accepted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub name: String,
    pub mime_type: String,
    pub original_size: String,
    /// `None` when the header could not be read; the file is still accepted.
    pub dimensions: Option<(u32, u32)>,
}

impl Preview {
    pub fn describe(asset: &ImageAsset) -> Self {
        Self {
            name: asset.name().to_string(),
            mime_type: asset.mime_type().to_string(),
            original_size: format_file_size(asset.size_bytes()),
            dimensions: read_dimensions(asset.bytes()),
        }
    }

    pub fn aspect_ratio(&self) -> Option<f64> {
        self.dimensions
            .filter(|&(_, h)| h > 0)
            .map(|(w, h)| w as f64 / h as f64)
    }
}

// Header only, no full decode.
fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
