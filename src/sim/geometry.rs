//! Axis-aligned rectangles
//!
//! Every solid thing in the arena (walls, barriers, tanks, projectiles,
//! power-ups) is collided as an `Aabb`. Overlap is strict: boxes that only
//! share an edge do not overlap, so a tank may slide flush along a wall.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle from its top-left corner and size
    pub fn from_corner(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Square of side `size` centered on `center`
    pub fn square(center: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
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
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Strict overlap test (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Point strictly inside
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    /// Grow by `amount` in total on each axis (half on every side)
    pub fn inflate(&self, amount: f32) -> Self {
        let half = Vec2::splat(amount / 2.0);
        Self {
            min: self.min - half,
            max: self.max + half,
        }
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: Vec2) -> Self {
        Self {
            min: self.min + amount,
            max: self.max - amount,
        }
    }

    /// Translate a box of the given size so it lies fully inside `self`,
    /// returning the corrected center
    pub fn clamp_center(&self, center: Vec2, size: f32) -> Vec2 {
        let half = size / 2.0;
        Vec2::new(
            clamp_axis(center.x, self.min.x + half, self.max.x - half),
            clamp_axis(center.y, self.min.y + half, self.max.y - half),
        )
    }
}

/// Clamp that tolerates an inverted range (box larger than the bounds)
#[inline]
fn clamp_axis(v: f32, lo: f32, hi: f32) -> f32 {
    if lo > hi { (lo + hi) / 2.0 } else { v.clamp(lo, hi) }
}
