// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/view/crop/selection.rs
//
// Touch state machine: classifies pointer input into drag and resize
// gestures and publishes throttled crop box updates.

use std::time::{Duration, Instant};

use super::throttle::FrameGate;
use crate::domain::crop::{
    Constraints, CropRect, Handle, Point, compute_drag, compute_resize, normalize,
};

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Handle(Handle),
    Interior,
    Outside,
}

/// Active gesture. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        /// Pointer position at pointer-down.
        grab_point: Point,
        start: CropRect,
    },
    Resizing {
        handle: Handle,
        /// Pointer position at pointer-down.
        anchor_point: Point,
        start: CropRect,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }
}

/// Resolve a pointer position against the box.
///
/// Corner hot-zones are circles of radius `tolerance`. Overlapping zones go
/// to the nearest corner, ties to the first in `Handle::ALL`. Corners win
/// over the interior.
pub fn hit_test(rect: &CropRect, point: Point, tolerance: f32) -> HitTarget {
    let mut best: Option<(Handle, f32)> = None;
    for handle in Handle::ALL {
        let distance = rect.corner(handle).distance(point);
        if distance > tolerance {
            continue;
        }
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((handle, distance));
        }
    }

    match best {
        Some((handle, _)) => HitTarget::Handle(handle),
        None if rect.contains(point) => HitTarget::Interior,
        None => HitTarget::Outside,
    }
}

/// Crop box state for one session plus the gesture operating on it.
#[derive(Debug, Clone)]
pub struct CropSelection {
    rect: CropRect,
    gesture: GestureState,
    constraints: Constraints,
    tolerance: f32,
    gate: FrameGate,
    /// Latest pointer position not yet turned into a frame.
    pending: Option<Point>,
}

impl CropSelection {
    pub fn new(
        rect: CropRect,
        constraints: Constraints,
        tolerance: f32,
        frame_interval: Duration,
    ) -> Self {
        Self {
            rect: normalize(rect, &constraints),
            gesture: GestureState::Idle,
            constraints,
            tolerance,
            gate: FrameGate::new(frame_interval),
            pending: None,
        }
    }

    /// The last published rectangle.
    pub fn rect(&self) -> CropRect {
        self.rect
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Begin a gesture. Returns false when the pointer missed the box.
    pub fn pointer_down(&mut self, point: Point, now: Instant) -> bool {
        if !self.gesture.is_idle() {
            return false;
        }

        self.gesture = match hit_test(&self.rect, point, self.tolerance) {
            HitTarget::Handle(handle) => GestureState::Resizing {
                handle,
                anchor_point: point,
                start: self.rect,
            },
            HitTarget::Interior => GestureState::Dragging {
                grab_point: point,
                start: self.rect,
            },
            HitTarget::Outside => return false,
        };

        log::debug!("gesture start: {:?}", self.gesture);
        self.pending = None;
        self.gate.restart(now);
        true
    }

    /// Feed a move. Returns the new rectangle when a frame was published.
    pub fn pointer_move(&mut self, point: Point, now: Instant) -> Option<CropRect> {
        if self.gesture.is_idle() {
            return None;
        }

        self.pending = Some(point);
        if self.gate.try_admit(now) {
            self.flush()
        } else {
            log::trace!("frame coalesced at ({}, {})", point.x, point.y);
            None
        }
    }

    /// End the gesture, publishing any coalesced move first.
    pub fn pointer_up(&mut self, now: Instant) -> Option<CropRect> {
        if self.gesture.is_idle() {
            return None;
        }

        let published = if self.pending.is_some() {
            self.gate.mark(now);
            self.flush()
        } else {
            None
        };

        log::debug!("gesture end: {:?}", self.rect);
        self.gesture = GestureState::Idle;
        published
    }

    /// Frame callback: publish a coalesced move once its window has passed.
    pub fn tick(&mut self, now: Instant) -> Option<CropRect> {
        if self.pending.is_none() || !self.gate.try_admit(now) {
            return None;
        }
        self.flush()
    }

    /// Abort any gesture and refit the box to new constraints.
    pub fn set_constraints(&mut self, constraints: Constraints, rect: CropRect) {
        self.constraints = constraints;
        self.rect = normalize(rect, &constraints);
        self.gesture = GestureState::Idle;
        self.pending = None;
    }

    fn flush(&mut self) -> Option<CropRect> {
        let point = self.pending.take()?;
        let next = match self.gesture {
            GestureState::Idle => return None,
            GestureState::Dragging { grab_point, start } => compute_drag(
                start,
                point.x - grab_point.x,
                point.y - grab_point.y,
                self.constraints.bounds,
            ),
            GestureState::Resizing {
                handle,
                anchor_point,
                start,
            } => compute_resize(
                start,
                handle,
                point.x - anchor_point.x,
                point.y - anchor_point.y,
                &self.constraints,
            ),
        };

        self.rect = next;
        Some(next)
    }
}
