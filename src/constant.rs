// SPDX-License-Identifier: GPL-3.0-or-later
// src/constant.rs
//
// Engine constants that should not be changed by the user.

/// Default minimum crop box edge in display pixels.
pub const DEFAULT_MIN_SIZE: f32 = 100.0;

/// Default output quality (0.0 - 1.0).
pub const DEFAULT_QUALITY: f32 = 0.8;

/// Default throttle period between published frames (~60 fps).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Radius of the touch hot-zone around each corner handle.
pub const DEFAULT_TOUCH_TOLERANCE: f32 = 20.0;

/// Tolerance for aspect ratio comparisons (float precision in ratio fix-up).
pub const RATIO_EPSILON: f32 = 0.0001;

/// Fraction of the canvas' shorter side used by the initial crop box.
pub const INITIAL_CROP_FRACTION: f32 = 0.6;

/// Outer handle glyph edge in pixels.
pub const HANDLE_SIZE: f32 = 16.0;

/// Inner handle glyph edge in pixels.
pub const HANDLE_INNER_SIZE: f32 = 8.0;

/// Handle outline stroke width.
pub const HANDLE_OUTLINE_WIDTH: f32 = 2.0;

/// Outer (white) border stroke width.
pub const BORDER_OUTER_WIDTH: f32 = 3.0;

/// Inner (accent) border stroke width.
pub const BORDER_INNER_WIDTH: f32 = 1.0;

/// Grid line stroke width.
pub const GRID_WIDTH: f32 = 1.0;

/// Number of cells per axis of the rule-of-thirds grid.
pub const GRID_DIVISIONS: u32 = 3;

/// Alpha of the dimming mask over the uncropped area.
pub const MASK_ALPHA: f32 = 0.6;

/// Alpha of the grid lines.
pub const GRID_ALPHA: f32 = 0.8;

/// Accent color (#007aff) as RGB.
pub const ACCENT_RGB: (u8, u8, u8) = (0x00, 0x7a, 0xff);

/// Share of the viewport width the preview may take.
pub const LAYOUT_WIDTH_FRACTION: f32 = 0.8;

/// Hard cap on preview width in pixels.
pub const LAYOUT_MAX_WIDTH: f32 = 600.0;

/// Share of the viewport height the preview may take.
pub const LAYOUT_HEIGHT_FRACTION: f32 = 0.5;

/// Hard cap on preview height in pixels.
pub const LAYOUT_MAX_HEIGHT: f32 = 500.0;

/// Prefix of rasterized artifact file names.
pub const ARTIFACT_PREFIX: &str = "crop";

/// Number of hex digits of the content hash kept in artifact names.
pub const ARTIFACT_HASH_LEN: usize = 16;
