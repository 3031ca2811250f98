// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/view/crop/overlay.rs
//
// Overlay surface painter: dimming mask, crop window, border, grid, handles.

use tiny_skia::{BlendMode, Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::constant::{
    ACCENT_RGB, BORDER_INNER_WIDTH, BORDER_OUTER_WIDTH, GRID_ALPHA, GRID_DIVISIONS, GRID_WIDTH,
    HANDLE_INNER_SIZE, HANDLE_OUTLINE_WIDTH, HANDLE_SIZE, MASK_ALPHA,
};
use crate::domain::crop::{CropRect, Handle};

fn mask_color() -> Color {
    Color::from_rgba(0.0, 0.0, 0.0, MASK_ALPHA).unwrap_or(Color::BLACK)
}

fn accent_color() -> Color {
    let (r, g, b) = ACCENT_RGB;
    Color::from_rgba8(r, g, b, 255)
}

fn grid_color() -> Color {
    Color::from_rgba(1.0, 1.0, 1.0, GRID_ALPHA).unwrap_or(Color::WHITE)
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint
}

/// Repaint the whole overlay for `rect`.
///
/// The window is punched out of the mask before the decorations are drawn.
pub fn paint_overlay(pixmap: &mut Pixmap, rect: &CropRect, show_grid: bool) {
    pixmap.fill(Color::TRANSPARENT);

    let full = Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32);
    if let Some(full) = full {
        pixmap.fill_rect(full, &solid(mask_color()), Transform::identity(), None);
    }

    let Some(window) = Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) else {
        log::debug!("degenerate crop rect {rect:?}, overlay left dimmed");
        return;
    };

    let mut punch = solid(Color::BLACK);
    punch.blend_mode = BlendMode::DestinationOut;
    punch.anti_alias = false;
    pixmap.fill_rect(window, &punch, Transform::identity(), None);

    paint_border(pixmap, rect);
    if show_grid {
        paint_grid(pixmap, rect);
    }
    paint_handles(pixmap, rect);
}

fn stroke_rect(pixmap: &mut Pixmap, rect: Rect, color: Color, width: f32) {
    let path = PathBuilder::from_rect(rect);
    let stroke = Stroke {
        width,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &solid(color), &stroke, Transform::identity(), None);
}

fn paint_border(pixmap: &mut Pixmap, rect: &CropRect) {
    if let Some(outer) = Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) {
        stroke_rect(pixmap, outer, Color::WHITE, BORDER_OUTER_WIDTH);
    }
    if let Some(inner) = Rect::from_xywh(rect.x + 1.0, rect.y + 1.0, rect.width - 2.0, rect.height - 2.0) {
        stroke_rect(pixmap, inner, accent_color(), BORDER_INNER_WIDTH);
    }
}

fn paint_grid(pixmap: &mut Pixmap, rect: &CropRect) {
    let step_x = rect.width / GRID_DIVISIONS as f32;
    let step_y = rect.height / GRID_DIVISIONS as f32;

    let mut pb = PathBuilder::new();
    for i in 1..GRID_DIVISIONS {
        let x = rect.x + step_x * i as f32;
        pb.move_to(x, rect.y);
        pb.line_to(x, rect.bottom());

        let y = rect.y + step_y * i as f32;
        pb.move_to(rect.x, y);
        pb.line_to(rect.right(), y);
    }

    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: GRID_WIDTH,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &solid(grid_color()), &stroke, Transform::identity(), None);
    }
}

fn paint_handles(pixmap: &mut Pixmap, rect: &CropRect) {
    let half = HANDLE_SIZE / 2.0;
    let inset = (HANDLE_SIZE - HANDLE_INNER_SIZE) / 2.0;

    for handle in Handle::ALL {
        let corner = rect.corner(handle);
        let (left, top) = (corner.x - half, corner.y - half);

        if let Some(outer) = Rect::from_xywh(left, top, HANDLE_SIZE, HANDLE_SIZE) {
            pixmap.fill_rect(outer, &solid(Color::WHITE), Transform::identity(), None);
            stroke_rect(pixmap, outer, accent_color(), HANDLE_OUTLINE_WIDTH);
        }
        if let Some(inner) =
            Rect::from_xywh(left + inset, top + inset, HANDLE_INNER_SIZE, HANDLE_INNER_SIZE)
        {
            pixmap.fill_rect(inner, &solid(accent_color()), Transform::identity(), None);
        }
    }
}
