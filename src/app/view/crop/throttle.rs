// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/view/crop/throttle.rs
//
// Frame gate bounding how often geometry is published.

use std::time::{Duration, Instant};

/// Monotonic gate that admits at most one frame per `interval`.
///
/// Rejected frames are not lost: the caller keeps the latest input as
/// pending and flushes it on the next admitted frame or at gesture end.
#[derive(Debug, Clone)]
pub struct FrameGate {
    interval: Duration,
    last: Option<Instant>,
}

impl FrameGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Start a new frame window at `now` without publishing.
    pub fn restart(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Admit a frame at `now` if the interval has elapsed. Admission starts a new window.
    pub fn try_admit(&mut self, now: Instant) -> bool {
        let open = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if open {
            self.last = Some(now);
        }
        open
    }

    /// Record a frame published outside the gate (e.g. a forced flush).
    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }
}
