// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/mod.rs
//
// Crop session: controller, collaborators, state and rendering.

pub mod controller;
pub mod document;
pub mod layout;
pub mod message;
pub mod model;
pub mod view;

pub use controller::{CloseHandle, CropController, SessionError};
pub use layout::Viewport;
pub use message::{PointerEvent, SessionEvent};
pub use model::{CropSession, SessionState};
