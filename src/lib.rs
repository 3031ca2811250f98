// SPDX-License-Identifier: GPL-3.0-or-later
// src/lib.rs
//
// Touch-driven crop box engine.

pub mod app;
pub mod config;
pub mod constant;
pub mod domain;

pub use app::{CloseHandle, CropController, PointerEvent, SessionError, SessionEvent, Viewport};
pub use config::{AppConfig, LayoutConfig, SessionConfig};
