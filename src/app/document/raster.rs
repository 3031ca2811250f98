// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/document/raster.rs
//
// Raster collaborators backed by the `image` crate: file loading and
// crop encoding (JPEG / PNG).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use sha2::{Digest, Sha256};

use super::{EncodedImage, ImageHandle, ImageSource, Rasterizer, SourceImage};
use crate::constant::{ARTIFACT_HASH_LEN, ARTIFACT_PREFIX};
use crate::domain::crop::{CropRegion, SourceRect};

/// Loads a raster image from disk. No path means the user picked nothing.
#[derive(Debug, Clone, Default)]
pub struct FileImageSource {
    path: Option<PathBuf>,
}

impl FileImageSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

/// Decode an image file on the calling thread.
pub fn open(path: &Path) -> anyhow::Result<SourceImage> {
    let document = ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(SourceImage::from_handle(ImageHandle::new(path, document)))
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn load_image(&self) -> anyhow::Result<Option<SourceImage>> {
        let Some(path) = self.path.clone() else {
            return Ok(None);
        };
        let source = tokio::task::spawn_blocking(move || open(&path)).await??;
        log::debug!("loaded {:?}", source.handle);
        Ok(Some(source))
    }
}

/// Encoding of rasterized crops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Map 0..1 quality onto the JPEG 1..=100 scale.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Writes crops into a directory under content-derived names.
#[derive(Debug, Clone)]
pub struct ImageRasterizer {
    output_dir: PathBuf,
    format: OutputFormat,
}

impl ImageRasterizer {
    pub fn new(output_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    fn artifact_path(&self, handle: &ImageHandle, region: CropRegion, quality: u8) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(handle.label().to_string_lossy().as_bytes());
        let (x, y, w, h) = region.as_tuple();
        for value in [x, y, w, h, u32::from(quality)] {
            hasher.update(value.to_le_bytes());
        }
        let digest = format!("{:x}", hasher.finalize());
        let name = format!(
            "{ARTIFACT_PREFIX}-{}.{}",
            &digest[..ARTIFACT_HASH_LEN],
            self.format.extension()
        );
        self.output_dir.join(name)
    }
}

fn encode(image: &DynamicImage, path: &Path, format: OutputFormat, quality: u8) -> anyhow::Result<()> {
    match format {
        OutputFormat::Jpeg => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            JpegEncoder::new_with_quality(&mut writer, quality).encode_image(&image.to_rgb8())?;
            writer.flush()?;
        }
        OutputFormat::Png => image.save_with_format(path, ImageFormat::Png)?,
    }
    Ok(())
}

#[async_trait]
impl Rasterizer for ImageRasterizer {
    async fn render(
        &self,
        handle: &ImageHandle,
        region: SourceRect,
        quality: f32,
    ) -> anyhow::Result<EncodedImage> {
        let image = handle.shared();
        let (img_w, img_h) = (image.width(), image.height());
        let region = region
            .to_region(img_w, img_h)
            .with_context(|| format!("Crop {region:?} is outside the {img_w}x{img_h} image"))?;

        let quality = jpeg_quality(quality);
        let path = self.artifact_path(handle, region, quality);
        let format = self.format;
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;

        let target = path.clone();
        tokio::task::spawn_blocking(move || {
            let (x, y, w, h) = region.as_tuple();
            let cropped = image.crop_imm(x, y, w, h);
            encode(&cropped, &target, format, quality)
        })
        .await??;

        log::info!("wrote {}x{} crop to {}", region.width, region.height, path.display());
        Ok(EncodedImage {
            path,
            width: region.width,
            height: region.height,
        })
    }
}
