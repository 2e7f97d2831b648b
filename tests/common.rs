#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use squeeze_workflow::{CodecHandle, CodecOptions, CodecSource, ImageAsset, ImageCodec};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Returns a result of a fixed size, keeping name and type.
pub struct FixedSizeCodec {
    pub output_size: usize,
}

#[async_trait]
impl ImageCodec for FixedSizeCodec {
    fn name(&self) -> &str {
        "fixed-size"
    }

    async fn encode(&self, asset: &ImageAsset, _options: &CodecOptions) -> anyhow::Result<ImageAsset> {
        Ok(ImageAsset::new(
            asset.name(),
            asset.mime_type(),
            vec![0u8; self.output_size],
        ))
    }
}

/// Fails the first `failures` encodes with a decode error, then halves the input.
pub struct FlakyCodec {
    calls: AtomicUsize,
    failures: usize,
}

impl FlakyCodec {
    pub fn new(failures: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures,
        }
    }
}

#[async_trait]
impl ImageCodec for FlakyCodec {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn encode(&self, asset: &ImageAsset, _options: &CodecOptions) -> anyhow::Result<ImageAsset> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            anyhow::bail!("decode error: corrupt image data");
        }
        Ok(halved(asset))
    }
}

/// Signals `started` on entry and holds the encode until `release` fires.
#[derive(Default)]
pub struct GatedCodec {
    pub started: Notify,
    pub release: Notify,
    pub fail: bool,
}

impl GatedCodec {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ImageCodec for GatedCodec {
    fn name(&self) -> &str {
        "gated"
    }

    async fn encode(&self, asset: &ImageAsset, _options: &CodecOptions) -> anyhow::Result<ImageAsset> {
        self.started.notify_one();
        self.release.notified().await;
        if self.fail {
            anyhow::bail!("decode error: truncated stream");
        }
        Ok(halved(asset))
    }
}

/// Hands out one codec, optionally failing the first few loads.
pub struct ScriptedSource {
    codec: CodecHandle,
    failures: usize,
    pub loads: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(codec: CodecHandle) -> Self {
        Self::failing_first(codec, 0)
    }

    pub fn failing_first(codec: CodecHandle, failures: usize) -> Self {
        Self {
            codec,
            failures,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodecSource for ScriptedSource {
    async fn load(&self) -> anyhow::Result<CodecHandle> {
        let call = self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if call < self.failures {
            anyhow::bail!("failed to fetch codec script");
        }
        Ok(Arc::clone(&self.codec))
    }
}

pub fn halved(asset: &ImageAsset) -> ImageAsset {
    let half = asset.bytes()[..asset.bytes().len() / 2].to_vec();
    ImageAsset::new(asset.name(), asset.mime_type(), half)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x ^ y) % 256) as u8])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(bytes).unwrap();
    path
}
