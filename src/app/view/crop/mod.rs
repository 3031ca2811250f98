// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/view/crop/mod.rs
//
// Crop interaction module: touch state machine, frame gate and overlay painter.

mod overlay;
mod selection;
mod throttle;

pub use overlay::paint_overlay;
pub use selection::{CropSelection, GestureState, HitTarget, hit_test};
pub use throttle::FrameGate;
