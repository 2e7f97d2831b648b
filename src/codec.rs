//! Codec service boundary and the built-in codec backed by `image` and `oxipng`.

use crate::asset::ImageAsset;
use crate::constants::{
    ITERATION_SCALE_FACTOR, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, MAX_ENCODE_ITERATIONS,
    MIB, MIN_ENCODE_QUALITY, ZOPFLI_ITERATIONS,
};
use crate::formats::OutputFormat;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use oxipng::{Deflaters, Options};
use std::io::Cursor;
use std::num::NonZeroU8;
use std::sync::Arc;
use tracing::debug;

/// Options understood by a codec's `encode` operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodecOptions {
    /// Soft ceiling for the encoded size, in megabytes.
    pub target_size_mb: f64,
    /// Longest side allowed in the output, in pixels.
    pub max_dimension_px: u32,
    /// Starting quality in `[0, 1]`.
    pub initial_quality: f64,
    /// Run the encode away from the caller's thread where supported.
    pub prefer_off_thread: bool,
}

impl CodecOptions {
    pub fn target_size_bytes(&self) -> u64 {
        (self.target_size_mb * MIB as f64).max(0.0) as u64
    }
}

/// A loaded codec capability. Shared read-only by every compression.
#[async_trait]
pub trait ImageCodec: Send + Sync {
    fn name(&self) -> &str;

    async fn encode(&self, asset: &ImageAsset, options: &CodecOptions) -> anyhow::Result<ImageAsset>;
}

pub type CodecHandle = Arc<dyn ImageCodec>;

/// Somewhere a codec can be fetched from. Each call is one load attempt.
#[async_trait]
pub trait CodecSource: Send + Sync {
    async fn load(&self) -> anyhow::Result<CodecHandle>;
}

/// Re-encodes with the `image` crate, optimising PNG output with oxipng.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCodec;

#[async_trait]
impl ImageCodec for NativeCodec {
    fn name(&self) -> &str {
        "native"
    }

    async fn encode(&self, asset: &ImageAsset, options: &CodecOptions) -> anyhow::Result<ImageAsset> {
        if options.prefer_off_thread {
            let asset = asset.clone();
            let options = *options;
            tokio::task::spawn_blocking(move || encode_blocking(&asset, &options))
                .await
                .context("encoder worker stopped")?
        } else {
            encode_blocking(asset, options)
        }
    }
}

/// Hands out [`NativeCodec`]; loading cannot fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCodecSource;

#[async_trait]
impl CodecSource for NativeCodecSource {
    async fn load(&self) -> anyhow::Result<CodecHandle> {
        Ok(Arc::new(NativeCodec))
    }
}

fn encode_blocking(asset: &ImageAsset, options: &CodecOptions) -> anyhow::Result<ImageAsset> {
    let img = ImageReader::new(Cursor::new(asset.bytes()))
        .with_guessed_format()
        .context("could not read image header")?
        .decode()
        .context("could not decode image")?;

    let format = OutputFormat::for_mime_type(asset.mime_type());
    let mut img = fit_within(img, options.max_dimension_px);
    let mut quality = quality_percent(options.initial_quality);
    let target = options.target_size_bytes();

    let mut encoded = encode_once(&img, format, quality)?;
    let mut iteration = 1;
    while encoded.len() as u64 > target && iteration < MAX_ENCODE_ITERATIONS {
        if format.is_lossy() && quality > MIN_ENCODE_QUALITY {
            quality = ((quality as f32 * ITERATION_SCALE_FACTOR) as u8).max(MIN_ENCODE_QUALITY);
        }
        let (width, height) = img.dimensions();
        let next_width = (width as f32 * ITERATION_SCALE_FACTOR) as u32;
        let next_height = (height as f32 * ITERATION_SCALE_FACTOR) as u32;
        if next_width == 0 || next_height == 0 {
            break;
        }
        img = img.resize_exact(next_width, next_height, FilterType::Lanczos3);
        encoded = encode_once(&img, format, quality)?;
        iteration += 1;
    }

    debug!(
        format = %format,
        quality,
        iterations = iteration,
        size = encoded.len(),
        "native encode finished"
    );

    Ok(ImageAsset::new(asset.name(), format.mime_type(), encoded))
}

/// Shrink so the longest side is at most `max_dimension`, keeping aspect ratio.
pub fn fit_within(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return img;
    }
    img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
}

fn quality_percent(initial_quality: f64) -> u8 {
    (initial_quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}

fn encode_once(img: &DynamicImage, format: OutputFormat, quality: u8) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
                .context("JPEG encode failed")?;
        }
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buf), format.to_image_format())
                .context("PNG encode failed")?;
            buf = oxipng::optimize_from_memory(&buf, &png_options(quality)?)
                .map_err(|e| anyhow!("PNG optimization error: {}", e))?;
        }
        OutputFormat::WebP => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_to(&mut Cursor::new(&mut buf), format.to_image_format())
                .context("WebP encode failed")?;
        }
    }
    Ok(buf)
}

fn png_options(quality: u8) -> anyhow::Result<Options> {
    let mut options = Options::from_preset(4);
    options.deflate = if quality >= 90 {
        let iterations =
            NonZeroU8::new(ZOPFLI_ITERATIONS).ok_or_else(|| anyhow!("zopfli iterations must be non-zero"))?;
        Deflaters::Zopfli { iterations }
    } else if quality >= 70 {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    };
    Ok(options)
}
