// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/mapper.rs
//
// Display space to source space conversion, used once at commit time.

use super::rect::{CanvasBounds, CropRect};
use super::region::CropRegion;

/// Crop rectangle in source pixel units, still real-valued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRect {
    /// Round to whole pixels and clip to the image.
    ///
    /// Edges are rounded independently so adjacent crops share borders.
    /// Returns `None` when nothing of the image is left.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_region(&self, image_width: u32, image_height: u32) -> Option<CropRegion> {
        let snap = |v: f64, max: u32| v.round().clamp(0.0, f64::from(max)) as u32;

        let left = snap(self.x, image_width);
        let top = snap(self.y, image_height);
        let right = snap(self.x + self.width, image_width);
        let bottom = snap(self.y + self.height, image_height);

        let region = CropRegion::new(left, top, right.saturating_sub(left), bottom.saturating_sub(top));
        region.is_valid().then_some(region)
    }
}

/// Per-axis scale between the canvas and the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    scale_x: f64,
    scale_y: f64,
}

impl CoordinateMapper {
    pub fn new(canvas: CanvasBounds, image_width: u32, image_height: u32) -> Self {
        Self {
            scale_x: f64::from(image_width) / f64::from(canvas.width),
            scale_y: f64::from(image_height) / f64::from(canvas.height),
        }
    }

    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    pub fn to_source(&self, rect: CropRect) -> SourceRect {
        SourceRect {
            x: f64::from(rect.x) * self.scale_x,
            y: f64::from(rect.y) * self.scale_y,
            width: f64::from(rect.width) * self.scale_x,
            height: f64::from(rect.height) * self.scale_y,
        }
    }
}
