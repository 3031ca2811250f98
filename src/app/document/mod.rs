// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/document/mod.rs
//
// Document module root: source image handles and the collaborator seams
// for image acquisition and final rasterization.

pub mod raster;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};

use crate::domain::crop::SourceRect;

/// Opaque handle to a decoded source image, cheap to clone.
#[derive(Clone)]
pub struct ImageHandle {
    label: PathBuf,
    image: Arc<DynamicImage>,
}

impl ImageHandle {
    pub fn new(label: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self {
            label: label.into(),
            image: Arc::new(image),
        }
    }

    /// Where the image came from (file path or a synthetic name).
    pub fn label(&self) -> &Path {
        &self.label
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub(crate) fn shared(&self) -> Arc<DynamicImage> {
        Arc::clone(&self.image)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.image.dimensions();
        write!(f, "ImageHandle({}, {w}x{h})", self.label.display())
    }
}

/// A loaded image plus its intrinsic pixel size.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub handle: ImageHandle,
    pub width: u32,
    pub height: u32,
}

impl SourceImage {
    pub fn from_handle(handle: ImageHandle) -> Self {
        let (width, height) = handle.image().dimensions();
        Self {
            handle,
            width,
            height,
        }
    }
}

/// Encoded crop result written by a rasterizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Image acquisition (picker, camera, file).
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Load the user's image. `Ok(None)` means the user backed out.
    async fn load_image(&self) -> anyhow::Result<Option<SourceImage>>;
}

/// Final crop rasterization and encoding.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Cut `region` (source pixels) out of `handle` and encode it.
    async fn render(
        &self,
        handle: &ImageHandle,
        region: SourceRect,
        quality: f32,
    ) -> anyhow::Result<EncodedImage>;
}
