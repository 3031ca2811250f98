// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/view/mod.rs
//
// Interaction and rendering for the crop canvas.

pub mod canvas;
pub mod crop;

pub use canvas::{RenderPipeline, RenderStats};
