// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/message.rs
//
// Session messages: pointer input from the host and outward session events.

use std::path::PathBuf;
use std::time::Instant;

use crate::domain::crop::Point;

/// Raw single-pointer input in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { position: Point, at: Instant },
    Move { position: Point, at: Instant },
    Up { at: Instant },
}

/// Terminal outcome of a session. Exactly one is emitted per session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Cropped {
        artifact_path: PathBuf,
        width: u32,
        height: u32,
    },
    Cancelled,
    /// Rasterization failed; the session is over.
    Failed { reason: String },
}
