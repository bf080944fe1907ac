//! Axis-aligned rectangle geometry for platforms
//!
//! World y grows downward, so `top()` is the smallest y of the rectangle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Closest point on (or inside) the rectangle to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.pos, self.pos + self.size)
    }

    /// Circle overlap test: strict, so a tangent circle does not collide
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        center.distance_squared(self.closest_point(center)) < radius * radius
    }

    /// Per-axis penetration of a circle measured from the rectangle centre.
    ///
    /// Returns `(overlap_x, overlap_y)`; the smaller one is the axis the
    /// circle came in on.
    pub fn circle_overlap(&self, center: Vec2, radius: f32) -> Vec2 {
        let delta = center - self.center();
        Vec2::new(
            radius + self.size.x / 2.0 - delta.x.abs(),
            radius + self.size.y / 2.0 - delta.y.abs(),
        )
    }
}
