// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/engine.rs
//
// Pure crop box geometry: drag, corner resize, aspect lock, clamping.

use super::rect::{CanvasBounds, CropRect, Handle};
use crate::constant::{INITIAL_CROP_FRACTION, RATIO_EPSILON};

/// Limits every computed rectangle must respect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    pub bounds: CanvasBounds,
    /// Requested minimum edge length.
    pub min_size: f32,
    /// Width / height, or 0 for a free box.
    pub aspect_ratio: f32,
}

impl Constraints {
    pub fn new(bounds: CanvasBounds, min_size: f32, aspect_ratio: f32) -> Self {
        Self {
            bounds,
            min_size,
            aspect_ratio,
        }
    }

    /// The locked ratio, if any.
    pub fn ratio(&self) -> Option<f32> {
        (self.aspect_ratio > 0.0).then_some(self.aspect_ratio)
    }

    /// Minimum edge actually enforced. Never larger than the canvas.
    pub fn effective_min(&self) -> f32 {
        self.min_size.min(self.bounds.min_side())
    }

    /// True when the requested minimum cannot fit on the canvas.
    pub fn is_degraded(&self) -> bool {
        self.min_size > self.bounds.min_side()
    }

    /// Smallest width allowed for a box of the locked ratio.
    fn min_ratio_width(&self, ratio: f32) -> f32 {
        let min = self.effective_min();
        min.max(min * ratio)
    }
}

/// Translate `rect` by `(dx, dy)` and keep it on the canvas. Size is unchanged.
pub fn compute_drag(rect: CropRect, dx: f32, dy: f32, bounds: CanvasBounds) -> CropRect {
    if dx == 0.0 && dy == 0.0 {
        return rect;
    }
    let max_x = (bounds.width - rect.width).max(0.0);
    let max_y = (bounds.height - rect.height).max(0.0);

    CropRect {
        x: (rect.x + dx).clamp(0.0, max_x),
        y: (rect.y + dy).clamp(0.0, max_y),
        ..rect
    }
}

/// Move the corner `handle` of `rect` by `(dx, dy)` with the opposite corner fixed.
///
/// Sizes are clamped to the canvas first and the ratio is fixed afterwards,
/// shrinking whichever side is too long. Shrinking an already bounded side
/// cannot leave the canvas, so the second pass never undoes the first.
pub fn compute_resize(
    rect: CropRect,
    handle: Handle,
    dx: f32,
    dy: f32,
    constraints: &Constraints,
) -> CropRect {
    // Rebuilding edges from the anchor is not exact in f32.
    if dx == 0.0 && dy == 0.0 {
        return rect;
    }

    let bounds = constraints.bounds;
    let min = constraints.effective_min();
    let anchor = rect.corner(handle.opposite());

    let (width, height) = match constraints.ratio() {
        None => (
            (rect.width + handle.x_sign() * dx).max(min),
            (rect.height + handle.y_sign() * dy).max(min),
        ),
        Some(ratio) => {
            let growth = handle.x_sign() * dx + handle.y_sign() * dy;
            let magnitude = (dx.abs() + dy.abs()) / 2.0;
            let signed = if growth > 0.0 {
                magnitude
            } else if growth < 0.0 {
                -magnitude
            } else {
                0.0
            };

            let width = (rect.width + signed).max(constraints.min_ratio_width(ratio));
            // Leave a resting box untouched on a zero-length gesture.
            let height = if signed == 0.0 && width == rect.width {
                rect.height
            } else {
                width / ratio
            };
            (width, height)
        }
    };

    // Room between the anchor and the canvas edge on the moving side.
    let room_x = if handle.is_left() {
        anchor.x
    } else {
        bounds.width - anchor.x
    };
    let room_y = if handle.is_top() {
        anchor.y
    } else {
        bounds.height - anchor.y
    };

    let width = clamp_span(width.min(room_x), min, bounds.width);
    let height = clamp_span(height.min(room_y), min, bounds.height);
    let (width, height) = fix_ratio(width, height, constraints.ratio());

    let x = if handle.is_left() {
        anchor.x - width
    } else {
        anchor.x
    };
    let y = if handle.is_top() {
        anchor.y - height
    } else {
        anchor.y
    };

    clamp_position(CropRect::new(x, y, width, height), bounds)
}

/// Centered starting box: a square (or ratio box) over a share of the shorter side.
pub fn initial_rect(constraints: &Constraints) -> CropRect {
    let bounds = constraints.bounds;
    let side = bounds.min_side() * INITIAL_CROP_FRACTION;
    let min = constraints.effective_min();

    let (width, height) = match constraints.ratio() {
        None => (side.max(min), side.max(min)),
        Some(ratio) => {
            let width = (bounds.width * INITIAL_CROP_FRACTION)
                .min(bounds.height * INITIAL_CROP_FRACTION * ratio)
                .max(constraints.min_ratio_width(ratio));
            (width, width / ratio)
        }
    };

    let (width, height) = settle(width, height, constraints);
    CropRect::new(
        (bounds.width - width) / 2.0,
        (bounds.height - height) / 2.0,
        width,
        height,
    )
}

/// Force an arbitrary rectangle back into `constraints`, keeping its top-left where possible.
pub fn normalize(rect: CropRect, constraints: &Constraints) -> CropRect {
    let (width, height) = settle(rect.width, rect.height, constraints);
    clamp_position(CropRect::new(rect.x, rect.y, width, height), constraints.bounds)
}

/// Clamp both sides into `[min, bounds]`, then restore the ratio.
fn settle(width: f32, height: f32, constraints: &Constraints) -> (f32, f32) {
    let min = constraints.effective_min();
    let width = clamp_span(width, min, constraints.bounds.width);
    let height = clamp_span(height, min, constraints.bounds.height);
    fix_ratio(width, height, constraints.ratio())
}

fn clamp_span(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min.min(max))
}

/// Shrink the side that is too long for `ratio`.
fn fix_ratio(width: f32, height: f32, ratio: Option<f32>) -> (f32, f32) {
    let Some(ratio) = ratio else {
        return (width, height);
    };
    if (width / height - ratio).abs() <= RATIO_EPSILON {
        return (width, height);
    }
    if width > height * ratio {
        (height * ratio, height)
    } else {
        (width, width / ratio)
    }
}

fn clamp_position(rect: CropRect, bounds: CanvasBounds) -> CropRect {
    CropRect {
        x: rect.x.clamp(0.0, (bounds.width - rect.width).max(0.0)),
        y: rect.y.clamp(0.0, (bounds.height - rect.height).max(0.0)),
        ..rect
    }
}
