#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Vector and matrix types come from `glam`; this module adds the screen
//! viewport.

pub use glam::{Mat4, Quat, Vec2, Vec3};

/// Size of the visible drawing surface in physical pixels.
///
/// Screen coordinates are 0-indexed with the origin at the top-left corner
/// and y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Create a new viewport.
    #[inline]
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Check if the viewport has zero (or negative) area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a screen point lies inside the viewport.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width && y < self.height
    }

    /// Convert a screen point to normalized device coordinates (`[-1, 1]`,
    /// y up).
    #[inline]
    #[must_use]
    pub fn to_ndc(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(2.0 * x / self.width - 1.0, 1.0 - 2.0 * y / self.height)
    }

    /// Convert normalized device coordinates back to a screen point.
    #[inline]
    #[must_use]
    pub fn from_ndc(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        )
    }
}
