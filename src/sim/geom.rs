//! Axis-aligned rectangles in y-up world space
//!
//! Flight paths interpolate a rectangle's anchor: its right edge and bottom
//! edge, `(max.x, min.y)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    /// Rectangle of the given size whose bottom-left corner is `min`
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, max: min + size }
    }

    /// Rectangle of the given size whose anchor sits at `anchor`
    pub fn from_anchor(anchor: Vec2, size: Vec2) -> Self {
        Self::new(anchor.x - size.x, anchor.y, anchor.x, anchor.y + size.y)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Right edge / bottom edge point used for flight interpolation
    #[inline]
    pub fn anchor(&self) -> Vec2 {
        Vec2::new(self.max.x, self.min.y)
    }

    pub fn moved(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// True if a body of `size` fits inside this rectangle
    pub fn fits(&self, size: Vec2) -> bool {
        self.width() >= size.x && self.height() >= size.y
    }

    /// Where a body of `size` rests on this rectangle: centered horizontally,
    /// bottom edges aligned
    pub fn resting_spot(&self, size: Vec2) -> Self {
        let side_gap = (self.width() - size.x) / 2.0;
        Self::from_anchor(Vec2::new(self.max.x - side_gap, self.min.y), size)
    }
}
