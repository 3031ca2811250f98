// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/mod.rs
//
// Crop geometry: display-space rectangles, the constraint engine and the
// display-to-source mapping.

pub mod engine;
pub mod mapper;
pub mod rect;
pub mod region;

pub use engine::{Constraints, compute_drag, compute_resize, initial_rect, normalize};
pub use mapper::{CoordinateMapper, SourceRect};
pub use rect::{CanvasBounds, CropRect, Handle, Point};
pub use region::CropRegion;
