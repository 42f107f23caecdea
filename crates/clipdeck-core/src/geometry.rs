//! Geometric primitives for canvas layout.

use glam::Vec2 as GlamVec2;
use serde::{Deserialize, Serialize};

/// 2D vector.
pub type Vec2 = GlamVec2;

/// Width/height pair in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width divided by height, or `None` for a degenerate size.
    pub fn aspect_ratio(self) -> Option<f32> {
        if self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
        {
            Some(self.width / self.height)
        } else {
            None
        }
    }

    /// The smaller of the two dimensions.
    #[inline]
    pub fn min_dimension(self) -> f32 {
        self.width.min(self.height)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering the whole canvas.
    #[inline]
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.y + self.height
    }

    /// Center point.
    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Whether the rectangle lies entirely inside a canvas of `bounds`.
    pub fn is_within(self, bounds: Size) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= bounds.width
            && self.bottom() <= bounds.height
    }

    /// Pull the rectangle inside `bounds`.
    ///
    /// The origin is clamped first into `[0, bounds - size]`, then the size is
    /// cut so the far edges stay inside. Oversized rectangles end up at the
    /// origin with the canvas size.
    pub fn clamp_within(self, bounds: Size) -> Self {
        let x = self.x.min(bounds.width - self.width).max(0.0);
        let y = self.y.min(bounds.height - self.height).max(0.0);
        let width = self.width.min(bounds.width - x).max(0.0);
        let height = self.height.min(bounds.height - y).max(0.0);
        Self::new(x, y, width, height)
    }
}
