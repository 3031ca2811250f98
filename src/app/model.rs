// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/model.rs
//
// Session state owned by the controller.

use crate::app::document::SourceImage;
use crate::app::view::crop::CropSelection;
use crate::config::SessionConfig;
use crate::domain::crop::{CanvasBounds, CoordinateMapper, CropRect, SourceRect};

// =============================================================================
// Session
// =============================================================================

/// Everything that lives exactly as long as one crop session.
#[derive(Debug)]
pub struct CropSession {
    pub config: SessionConfig,
    pub source: SourceImage,
    pub bounds: CanvasBounds,
    pub selection: CropSelection,
}

impl CropSession {
    pub fn rect(&self) -> CropRect {
        self.selection.rect()
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.bounds, self.source.width, self.source.height)
    }

    /// Current crop box in source pixels.
    pub fn source_rect(&self) -> SourceRect {
        self.mapper().to_source(self.rect())
    }
}

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Default)]
pub enum SessionState {
    /// Waiting for the next session.
    #[default]
    Dormant,
    /// Image requested, metadata not yet available.
    Loading,
    Active(Box<CropSession>),
    /// Crop handed to the rasterizer; gestures are no longer accepted.
    Committing,
}

impl SessionState {
    pub fn is_dormant(&self) -> bool {
        matches!(self, SessionState::Dormant)
    }

    pub fn session(&self) -> Option<&CropSession> {
        match self {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut CropSession> {
        match self {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }
}
