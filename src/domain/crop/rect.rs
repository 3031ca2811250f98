// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/rect.rs
//
// Display-space geometry types: canvas bounds, crop rectangle, handles.

/// A point in display space (canvas pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Size of the display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub width: f32,
    pub height: f32,
}

impl CanvasBounds {
    /// Returns `None` unless both sides are positive and finite.
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        (valid(width) && valid(height)).then_some(Self { width, height })
    }

    /// Shorter side of the canvas.
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Pixel size of a surface backing these bounds (at least 1x1).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width.round() as u32).max(1),
            (self.height.round() as u32).max(1),
        )
    }
}

/// One of the four corner affordances.
///
/// Enumeration order is the hit-test tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Handle {
    pub const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];

    /// True when the handle owns the left edge.
    pub fn is_left(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::BottomLeft)
    }

    /// True when the handle owns the top edge.
    pub fn is_top(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::TopRight)
    }

    /// Direction in which a positive x delta grows the box (+1 or -1).
    pub fn x_sign(self) -> f32 {
        if self.is_left() { -1.0 } else { 1.0 }
    }

    /// Direction in which a positive y delta grows the box (+1 or -1).
    pub fn y_sign(self) -> f32 {
        if self.is_top() { -1.0 } else { 1.0 }
    }

    /// The diagonally opposite handle.
    pub fn opposite(self) -> Handle {
        match self {
            Handle::TopLeft => Handle::BottomRight,
            Handle::TopRight => Handle::BottomLeft,
            Handle::BottomLeft => Handle::TopRight,
            Handle::BottomRight => Handle::TopLeft,
        }
    }
}

impl std::str::FromStr for Handle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tl" | "top-left" => Ok(Handle::TopLeft),
            "tr" | "top-right" => Ok(Handle::TopRight),
            "bl" | "bottom-left" => Ok(Handle::BottomLeft),
            "br" | "bottom-right" => Ok(Handle::BottomRight),
            other => Err(anyhow::anyhow!("unknown handle '{other}'")),
        }
    }
}

/// Crop rectangle in display space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Position of the given corner.
    pub fn corner(&self, handle: Handle) -> Point {
        match handle {
            Handle::TopLeft => Point::new(self.x, self.y),
            Handle::TopRight => Point::new(self.right(), self.y),
            Handle::BottomLeft => Point::new(self.x, self.bottom()),
            Handle::BottomRight => Point::new(self.right(), self.bottom()),
        }
    }

    /// Inclusive interior test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Whether the rectangle lies entirely inside `bounds` (with float slack).
    pub fn is_within(&self, bounds: CanvasBounds) -> bool {
        const SLACK: f32 = 1e-3;
        self.x >= -SLACK
            && self.y >= -SLACK
            && self.right() <= bounds.width + SLACK
            && self.bottom() <= bounds.height + SLACK
    }

    pub fn ratio(&self) -> f32 {
        self.width / self.height
    }
}
