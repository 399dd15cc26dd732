#![forbid(unsafe_code)]

//! Color + depth pixel grid that pick targets render into.
//!
//! The hit tester only ever needs a 1×1 buffer, but the grid is general so a
//! software target can render a full frame for debugging.

use crate::color_key::{BACKGROUND, ColorKey};

#[derive(Debug, Clone, Copy, PartialEq)]
struct PickCell {
    color: ColorKey,
    depth: f32,
}

impl Default for PickCell {
    fn default() -> Self {
        Self {
            color: BACKGROUND,
            depth: f32::INFINITY,
        }
    }
}

/// Offscreen pick buffer.
#[derive(Debug, Clone)]
pub struct PickBuffer {
    width: u32,
    height: u32,
    cells: Vec<PickCell>,
}

impl PickBuffer {
    /// Create a buffer cleared to the background sentinel.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![PickCell::default(); size],
        }
    }

    /// Buffer width.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Color at `(x, y)`, or `None` outside the buffer.
    #[inline]
    #[must_use]
    pub fn color(&self, x: u32, y: u32) -> Option<ColorKey> {
        self.index(x, y).map(|i| self.cells[i].color)
    }

    /// Depth at `(x, y)`; `INFINITY` where nothing was drawn.
    #[inline]
    #[must_use]
    pub fn depth(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.cells[i].depth)
    }

    /// Write `color` at `(x, y)` if `depth` passes the less-than test.
    ///
    /// Returns `true` when the fragment was kept. Equal depth keeps the
    /// earlier fragment, so draw order breaks ties.
    pub fn write_if_nearer(&mut self, x: u32, y: u32, color: ColorKey, depth: f32) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        let cell = &mut self.cells[i];
        if depth < cell.depth {
            cell.color = color;
            cell.depth = depth;
            true
        } else {
            false
        }
    }

    /// Read the pixel at `(x, y)` as RGBA bytes.
    #[must_use]
    pub fn read_rgba8(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.color(x, y).map(ColorKey::to_rgba8)
    }

    /// Reset every pixel to the background sentinel at infinite depth.
    pub fn clear(&mut self) {
        self.cells.fill(PickCell::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_cleared() {
        let buf = PickBuffer::new(2, 2);
        assert_eq!(buf.color(1, 1), Some(BACKGROUND));
        assert_eq!(buf.depth(0, 0), Some(f32::INFINITY));
        assert_eq!(buf.color(2, 0), None);
    }

    #[test]
    fn depth_test_keeps_nearest() {
        let mut buf = PickBuffer::new(1, 1);
        let far = ColorKey::new(0, 0, 1);
        let near = ColorKey::new(0, 0, 2);
        assert!(buf.write_if_nearer(0, 0, far, 0.8));
        assert!(buf.write_if_nearer(0, 0, near, 0.2));
        assert!(!buf.write_if_nearer(0, 0, far, 0.5));
        assert_eq!(buf.color(0, 0), Some(near));
    }

    #[test]
    fn equal_depth_keeps_first() {
        let mut buf = PickBuffer::new(1, 1);
        buf.write_if_nearer(0, 0, ColorKey::new(1, 0, 0), 0.5);
        assert!(!buf.write_if_nearer(0, 0, ColorKey::new(2, 0, 0), 0.5));
        assert_eq!(buf.color(0, 0), Some(ColorKey::new(1, 0, 0)));
    }

    #[test]
    fn out_of_bounds_write_is_ignored() {
        let mut buf = PickBuffer::new(1, 1);
        assert!(!buf.write_if_nearer(3, 0, ColorKey::new(1, 1, 1), 0.0));
    }

    #[test]
    fn clear_resets() {
        let mut buf = PickBuffer::new(1, 1);
        buf.write_if_nearer(0, 0, ColorKey::new(5, 5, 5), 0.1);
        buf.clear();
        assert_eq!(buf.read_rgba8(0, 0), Some([0, 0, 0, 255]));
    }
}
