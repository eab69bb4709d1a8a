//! Axis-aligned box geometry for entities and the player hit box
//!
//! Screen space: x grows to the right, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    /// Box centered horizontally on `cx` with its bottom edge at `bottom`
    pub fn from_bottom_center(cx: f32, bottom: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, bottom - h, w, h)
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
        (self.min + self.max) * 0.5
    }

    /// Shrink on every side (clamped so the box never inverts)
    pub fn inset(&self, amount: f32) -> Self {
        let half = Vec2::new(self.width(), self.height()) * 0.5;
        let d = Vec2::splat(amount).min(half);
        Self {
            min: self.min + d,
            max: self.max - d,
        }
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Horizontal span overlap only
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Shift horizontally (camera scroll)
    pub fn translate_x(&mut self, dx: f32) {
        self.min.x += dx;
        self.max.x += dx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_and_touching() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(5.0, 5.0, 10.0, 10.0);
        let c = Aabb::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Shared edge is not an overlap
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_inset_never_inverts() {
        let a = Aabb::new(0.0, 0.0, 10.0, 4.0);
        let shrunk = a.inset(3.0);
        assert!((shrunk.width() - 4.0).abs() < 1e-5);
        assert!(shrunk.height().abs() < 1e-5);
        assert_eq!(shrunk.center(), a.center());
    }

    #[test]
    fn test_from_bottom_center() {
        let a = Aabb::from_bottom_center(50.0, 100.0, 20.0, 30.0);
        assert_eq!(a.min, Vec2::new(40.0, 70.0));
        assert_eq!(a.max, Vec2::new(60.0, 100.0));
    }
}
