// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/view/canvas.rs
//
// Two-surface render pipeline: a static image surface drawn once per load
// and an overlay surface redrawn on every published crop box.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use tiny_skia::{ColorU8, Pixmap, PixmapPaint, Transform};

use super::crop::paint_overlay;
use crate::domain::crop::{CanvasBounds, CropRect};

/// Draw counters, mostly for hosts that want to verify frame pacing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub image_draws: u64,
    pub overlay_draws: u64,
}

#[derive(Debug, Default)]
pub struct RenderPipeline {
    bounds: Option<CanvasBounds>,
    image_surface: Option<Pixmap>,
    overlay_surface: Option<Pixmap>,
    show_grid: bool,
    stats: RenderStats,
}

impl RenderPipeline {
    pub fn new(show_grid: bool) -> Self {
        Self {
            show_grid,
            ..Self::default()
        }
    }

    /// Create both surfaces for `bounds`, replacing any previous ones.
    pub fn attach(&mut self, bounds: CanvasBounds) -> bool {
        let (width, height) = bounds.pixel_size();
        match (Pixmap::new(width, height), Pixmap::new(width, height)) {
            (Some(image), Some(overlay)) => {
                self.bounds = Some(bounds);
                self.image_surface = Some(image);
                self.overlay_surface = Some(overlay);
                log::debug!("render surfaces attached at {width}x{height}");
                true
            }
            _ => {
                log::warn!("cannot allocate {width}x{height} render surfaces");
                self.detach();
                false
            }
        }
    }

    /// Drop both surfaces. Later draws are skipped until the next attach.
    pub fn detach(&mut self) {
        self.bounds = None;
        self.image_surface = None;
        self.overlay_surface = None;
    }

    pub fn is_attached(&self) -> bool {
        self.image_surface.is_some() && self.overlay_surface.is_some()
    }

    pub fn bounds(&self) -> Option<CanvasBounds> {
        self.bounds
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn image_surface(&self) -> Option<&Pixmap> {
        self.image_surface.as_ref()
    }

    pub fn overlay_surface(&self) -> Option<&Pixmap> {
        self.overlay_surface.as_ref()
    }

    /// Scale `image` onto the image surface. Done once per load or canvas change.
    pub fn draw_image(&mut self, image: &DynamicImage) {
        let Some(surface) = self.image_surface.as_mut() else {
            log::debug!("image surface not attached, draw skipped");
            return;
        };

        let scaled = imageops::resize(image, surface.width(), surface.height(), FilterType::Triangle);
        for (dst, src) in surface.pixels_mut().iter_mut().zip(scaled.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        self.stats.image_draws += 1;
    }

    /// Repaint the overlay for the current crop box.
    pub fn draw_overlay(&mut self, rect: &CropRect) {
        let Some(surface) = self.overlay_surface.as_mut() else {
            log::debug!("overlay surface not attached, draw skipped");
            return;
        };
        paint_overlay(surface, rect, self.show_grid);
        self.stats.overlay_draws += 1;
    }

    /// Flatten overlay over image into one straight-alpha RGBA image.
    pub fn compose(&self) -> Option<RgbaImage> {
        let mut frame = self.image_surface.clone()?;
        let overlay = self.overlay_surface.as_ref()?;
        frame.draw_pixmap(
            0,
            0,
            overlay.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        let (width, height) = (frame.width(), frame.height());
        let data = frame
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RgbaImage::from_raw(width, height, data)
    }
}
