// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/controller.rs
//
// Crop session controller: owns session state, drives the touch state
// machine and render pipeline, and talks to the external collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;

use super::document::{EncodedImage, ImageSource, Rasterizer};
use super::layout::{Viewport, fit_canvas};
use super::message::{PointerEvent, SessionEvent};
use super::model::{CropSession, SessionState};
use super::view::RenderPipeline;
use super::view::crop::CropSelection;
use crate::config::{LayoutConfig, SessionConfig};
use crate::domain::crop::{CanvasBounds, Constraints, CropRect, initial_rect};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("a crop session is already running")]
    AlreadyActive,
    #[error("no active crop session")]
    NoActiveSession,
    #[error("invalid session config: {0}")]
    InvalidConfig(String),
    #[error("image load failed: {0:#}")]
    Load(#[source] anyhow::Error),
    #[error("rasterization failed: {0:#}")]
    Rasterize(#[source] anyhow::Error),
    #[error("session was closed while an operation was pending")]
    Closed,
}

/// Lets the host close the component while a load or commit is in flight.
#[derive(Debug, Clone, Default)]
pub struct CloseHandle(Arc<AtomicBool>);

impl CloseHandle {
    pub fn close(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct CropController<S, R> {
    source: S,
    rasterizer: R,
    layout: LayoutConfig,
    viewport: Viewport,
    state: SessionState,
    pipeline: RenderPipeline,
    events: UnboundedSender<SessionEvent>,
    close: CloseHandle,
}

impl<S: ImageSource, R: Rasterizer> CropController<S, R> {
    pub fn new(
        source: S,
        rasterizer: R,
        layout: LayoutConfig,
        viewport: Viewport,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            source,
            rasterizer,
            layout,
            viewport,
            state: SessionState::Dormant,
            pipeline: RenderPipeline::default(),
            events,
            close: CloseHandle::default(),
        }
    }

    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&CropSession> {
        self.state.session()
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Start a session: load the image, size the canvas, place the initial box.
    ///
    /// Returns `Ok(false)` when the user backed out of image selection.
    pub async fn open(&mut self, config: SessionConfig) -> Result<bool, SessionError> {
        if !self.state.is_dormant() {
            return Err(SessionError::AlreadyActive);
        }
        config.validate().map_err(SessionError::InvalidConfig)?;

        self.close.reset();
        self.state = SessionState::Loading;
        let loaded = self.source.load_image().await;

        if self.close.is_closed() {
            log::info!("component closed during image load, result discarded");
            self.finish(SessionEvent::Cancelled);
            return Err(SessionError::Closed);
        }

        let source = match loaded {
            Ok(Some(source)) => source,
            Ok(None) => {
                log::info!("image selection cancelled");
                self.finish(SessionEvent::Cancelled);
                return Ok(false);
            }
            Err(e) => {
                log::error!("image load failed: {e:#}");
                self.finish(SessionEvent::Cancelled);
                return Err(SessionError::Load(e));
            }
        };

        let Some(bounds) = fit_canvas(
            source.width,
            source.height,
            self.viewport,
            &self.layout,
            config.fullscreen,
        ) else {
            self.finish(SessionEvent::Cancelled);
            return Err(SessionError::Load(anyhow::anyhow!(
                "{:?} has no pixels",
                source.handle
            )));
        };

        let constraints = Constraints::new(bounds, config.min_size, config.aspect_ratio);
        if constraints.is_degraded() {
            log::warn!(
                "min size {} does not fit a {}x{} canvas, using {}",
                config.min_size,
                bounds.width,
                bounds.height,
                constraints.effective_min()
            );
        }

        let selection = CropSelection::new(
            initial_rect(&constraints),
            constraints,
            config.touch_tolerance,
            config.frame_interval(),
        );

        log::info!(
            "crop session started: {}x{} image on {}x{} canvas",
            source.width,
            source.height,
            bounds.width,
            bounds.height
        );

        self.pipeline = RenderPipeline::new(config.show_grid);
        if self.pipeline.attach(bounds) {
            self.pipeline.draw_image(source.handle.image());
            self.pipeline.draw_overlay(&selection.rect());
        }

        self.state = SessionState::Active(Box::new(CropSession {
            config,
            source,
            bounds,
            selection,
        }));
        Ok(true)
    }

    /// Feed one pointer event. Returns the crop box when a frame was published.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<CropRect> {
        if self.end_if_closed() {
            return None;
        }
        let session = self.state.session_mut()?;
        let selection = &mut session.selection;

        let published = match event {
            PointerEvent::Down { position, at } => {
                selection.pointer_down(position, at);
                None
            }
            PointerEvent::Move { position, at } => selection.pointer_move(position, at),
            PointerEvent::Up { at } => selection.pointer_up(at),
        };

        if published.is_some() {
            self.pipeline.draw_overlay(&selection.rect());
        }
        published
    }

    /// Frame callback from the host.
    pub fn tick(&mut self, now: Instant) -> Option<CropRect> {
        if self.end_if_closed() {
            return None;
        }
        let session = self.state.session_mut()?;
        let published = session.selection.tick(now);
        if published.is_some() {
            self.pipeline.draw_overlay(&session.selection.rect());
        }
        published
    }

    /// Layout change: resize the canvas and carry the crop box over proportionally.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.end_if_closed() {
            return;
        }
        let Some(session) = self.state.session_mut() else {
            return;
        };

        let Some(bounds) = fit_canvas(
            session.source.width,
            session.source.height,
            viewport,
            &self.layout,
            session.config.fullscreen,
        ) else {
            return;
        };
        if bounds == session.bounds {
            return;
        }

        let rect = rescale(session.rect(), session.bounds, bounds);
        let constraints = Constraints::new(
            bounds,
            session.config.min_size,
            session.config.aspect_ratio,
        );
        session.selection.set_constraints(constraints, rect);
        session.bounds = bounds;
        log::debug!("canvas resized to {}x{}", bounds.width, bounds.height);

        if self.pipeline.attach(bounds) {
            self.pipeline.draw_image(session.source.handle.image());
            self.pipeline.draw_overlay(&session.selection.rect());
        }
    }

    /// Crop the source image at the current box and end the session.
    pub async fn commit(&mut self) -> Result<EncodedImage, SessionError> {
        if self.end_if_closed() {
            return Err(SessionError::Closed);
        }
        let session = match std::mem::take(&mut self.state) {
            SessionState::Active(session) => session,
            other => {
                self.state = other;
                return Err(SessionError::NoActiveSession);
            }
        };
        self.state = SessionState::Committing;

        let region = session.source_rect();
        log::info!("committing crop {:?} as source {:?}", session.rect(), region);
        let result = self
            .rasterizer
            .render(&session.source.handle, region, session.config.quality)
            .await;
        drop(session);

        if self.close.is_closed() {
            log::info!("component closed during rasterization, result discarded");
            self.finish(SessionEvent::Cancelled);
            return Err(SessionError::Closed);
        }

        match result {
            Ok(artifact) => {
                self.finish(SessionEvent::Cropped {
                    artifact_path: artifact.path.clone(),
                    width: artifact.width,
                    height: artifact.height,
                });
                Ok(artifact)
            }
            Err(e) => {
                log::error!("rasterization failed: {e:#}");
                self.finish(SessionEvent::Failed {
                    reason: format!("{e:#}"),
                });
                Err(SessionError::Rasterize(e))
            }
        }
    }

    /// User pressed cancel.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.state.session().is_none() {
            return Err(SessionError::NoActiveSession);
        }
        self.finish(SessionEvent::Cancelled);
        Ok(())
    }

    /// Host closed the component. Pending operations observe this on completion.
    pub fn close(&mut self) {
        self.close.close();
        if self.state.session().is_some() {
            self.finish(SessionEvent::Cancelled);
        }
    }

    /// End an active session whose close handle has fired.
    fn end_if_closed(&mut self) -> bool {
        if !self.close.is_closed() || self.state.session().is_none() {
            return false;
        }
        log::info!("component closed, crop session dropped");
        self.finish(SessionEvent::Cancelled);
        true
    }

    fn finish(&mut self, event: SessionEvent) {
        self.state = SessionState::Dormant;
        self.pipeline.detach();
        log::info!("crop session finished: {event:?}");
        if self.events.send(event).is_err() {
            log::warn!("session event dropped, host receiver is gone");
        }
    }
}

fn rescale(rect: CropRect, from: CanvasBounds, to: CanvasBounds) -> CropRect {
    let sx = to.width / from.width;
    let sy = to.height / from.height;
    CropRect::new(rect.x * sx, rect.y * sy, rect.width * sx, rect.height * sy)
}
