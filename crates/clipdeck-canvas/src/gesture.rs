//! Pointer gesture math for canvas drag, resize and rotate.
//!
//! Every position is derived from the geometry captured when the gesture
//! began plus the current pointer position, never accumulated per event, so
//! replaying the same pointer position yields the same result.

use clipdeck_core::{Overlay, Rect, Size, Vec2};

/// Corner handle used for resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// What the pointer is doing to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize(ResizeHandle),
    Rotate,
}

/// An active pointer gesture on one overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    origin_rect: Rect,
    origin_rotation: f32,
    pointer_start: Vec2,
}

impl Gesture {
    /// Capture the overlay's geometry at pointer-down.
    pub fn begin(kind: GestureKind, overlay: &Overlay, pointer: Vec2) -> Self {
        Self {
            kind,
            origin_rect: overlay.rect(),
            origin_rotation: overlay.rotation,
            pointer_start: pointer,
        }
    }

    pub fn origin_rect(&self) -> Rect {
        self.origin_rect
    }

    /// Pointer travel since the gesture began.
    pub fn delta(&self, pointer: Vec2) -> Vec2 {
        pointer - self.pointer_start
    }

    /// Unsnapped geometry for a move gesture.
    pub fn moved_rect(&self, pointer: Vec2) -> Rect {
        let d = self.delta(pointer);
        Rect::new(
            self.origin_rect.x + d.x,
            self.origin_rect.y + d.y,
            self.origin_rect.width,
            self.origin_rect.height,
        )
    }

    /// Geometry for a resize gesture.
    ///
    /// The corner opposite the handle stays fixed; the size never drops
    /// below `min_size` and the result stays inside the canvas.
    pub fn resized_rect(
        &self,
        handle: ResizeHandle,
        pointer: Vec2,
        canvas: Size,
        min_size: f32,
    ) -> Rect {
        let d = self.delta(pointer);
        let r = self.origin_rect;
        let (mut left, mut top, mut right, mut bottom) = (r.x, r.y, r.right(), r.bottom());

        match handle {
            ResizeHandle::TopLeft => {
                left = (left + d.x).min(right - min_size);
                top = (top + d.y).min(bottom - min_size);
            }
            ResizeHandle::TopRight => {
                right = (right + d.x).max(left + min_size);
                top = (top + d.y).min(bottom - min_size);
            }
            ResizeHandle::BottomLeft => {
                left = (left + d.x).min(right - min_size);
                bottom = (bottom + d.y).max(top + min_size);
            }
            ResizeHandle::BottomRight => {
                right = (right + d.x).max(left + min_size);
                bottom = (bottom + d.y).max(top + min_size);
            }
        }

        let left = left.max(0.0);
        let top = top.max(0.0);
        let right = right.min(canvas.width);
        let bottom = bottom.min(canvas.height);
        Rect::new(left, top, (right - left).max(0.0), (bottom - top).max(0.0))
    }

    /// Rotation in degrees, normalized to `[0, 360)`.
    ///
    /// The overlay turns by the angle swept by the pointer around its center.
    pub fn rotation(&self, pointer: Vec2) -> f32 {
        let center = self.origin_rect.center();
        let from = self.pointer_start - center;
        let to = pointer - center;
        if from.length_squared() == 0.0 || to.length_squared() == 0.0 {
            return self.origin_rotation;
        }
        let swept = from.perp_dot(to).atan2(from.dot(to)).to_degrees();
        (self.origin_rotation + swept).rem_euclid(360.0)
    }
}
