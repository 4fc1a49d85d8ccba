//! Plane geometry primitives
//!
//! Coordinates follow screen conventions: x grows right, y grows down.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Point in container space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset
    pub x: f64,
    /// Vertical offset
    pub y: f64,
}

impl Point {
    /// Create point
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Same point shifted horizontally
    #[inline]
    #[must_use]
    pub fn offset_x(self, dx: f64) -> Self {
        Self::new(self.x + dx, self.y)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create rectangle
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Vertical midpoint
    #[inline]
    #[must_use]
    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Express this rectangle relative to `origin`'s top-left corner
    #[inline]
    #[must_use]
    pub fn relative_to(&self, origin: &Rect) -> Self {
        Self::new(self.x - origin.x, self.y - origin.y, self.width, self.height)
    }

    /// Same rectangle moved by `(dx, dy)`
    #[inline]
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}
