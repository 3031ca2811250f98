// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/layout.rs
//
// Responsive sizing of the preview canvas.

use crate::config::LayoutConfig;
use crate::domain::crop::CanvasBounds;

/// Size of the host screen or window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl std::str::FromStr for Viewport {
    type Err = anyhow::Error;

    /// Parse `WIDTHxHEIGHT`, e.g. `390x844`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow::anyhow!("expected WIDTHxHEIGHT, got '{s}'"))?;
        Ok(Self::new(w.trim().parse()?, h.trim().parse()?))
    }
}

/// Largest box the preview may use on this viewport.
fn preview_box(viewport: Viewport, layout: &LayoutConfig, fullscreen: bool) -> (f32, f32) {
    if fullscreen {
        return (viewport.width, viewport.height);
    }
    (
        (viewport.width * layout.width_fraction).min(layout.max_width),
        (viewport.height * layout.height_fraction).min(layout.max_height),
    )
}

/// Scale the image into the preview box, keeping its aspect ratio.
///
/// Images smaller than the box keep their intrinsic size.
pub fn fit_canvas(
    image_width: u32,
    image_height: u32,
    viewport: Viewport,
    layout: &LayoutConfig,
    fullscreen: bool,
) -> Option<CanvasBounds> {
    if image_width == 0 || image_height == 0 {
        return None;
    }

    let (max_w, max_h) = preview_box(viewport, layout, fullscreen);
    let (w, h) = (image_width as f32, image_height as f32);
    let ratio = w / h;

    let (mut width, mut height);
    if w > h {
        width = w.min(max_w);
        height = width / ratio;
        if height > max_h {
            height = max_h;
            width = height * ratio;
        }
    } else {
        height = h.min(max_h);
        width = height * ratio;
        if width > max_w {
            width = max_w;
            height = width / ratio;
        }
    }

    CanvasBounds::new(width, height)
}
