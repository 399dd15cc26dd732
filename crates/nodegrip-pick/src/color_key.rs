#![forbid(unsafe_code)]

//! 24-bit pick colors.
//!
//! Node `i` is drawn with the RGB value `i + 1`. Black (`0x000000`) is the
//! clear color of the offscreen buffer and never names a node, so the
//! encoding covers indices `[0, 2^24 - 2]`.
//!
//! # Invariants
//!
//! 1. `decode(encode(i)) == Some(i)` for every encodable `i`.
//! 2. `encode` is injective.
//! 3. `encode(i) != BACKGROUND`.

use nodegrip_core::NodeIndex;

/// Largest node count the 24-bit encoding can address.
pub const MAX_PICKABLE_NODES: u32 = 0x00FF_FFFF;

/// The cleared-background sentinel.
pub const BACKGROUND: ColorKey = ColorKey { r: 0, g: 0, b: 0 };

/// A flat RGB color that identifies one node in the offscreen buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorKey {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorKey {
    /// Create a color key from its channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into `0x00RRGGBB`.
    #[inline]
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Unpack from `0x00RRGGBB`; the top byte is ignored.
    #[inline]
    #[must_use]
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
        }
    }

    /// Color for a node index, or `None` past the 24-bit ceiling.
    #[inline]
    #[must_use]
    pub const fn encode(index: NodeIndex) -> Option<Self> {
        if index.get() >= MAX_PICKABLE_NODES {
            return None;
        }
        Some(Self::from_u32(index.get() + 1))
    }

    /// Node index for a color, or `None` for the background.
    #[inline]
    #[must_use]
    pub const fn decode(self) -> Option<NodeIndex> {
        let packed = self.to_u32();
        if packed == 0 {
            None
        } else {
            Some(NodeIndex::new(packed - 1))
        }
    }

    /// Whether this is the cleared background.
    #[inline]
    #[must_use]
    pub const fn is_background(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// RGBA bytes with opaque alpha, as read back from an 8-bit target.
    #[inline]
    #[must_use]
    pub const fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xFF]
    }

    /// Build from RGBA bytes; alpha is ignored.
    #[inline]
    #[must_use]
    pub const fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2])
    }

    /// Normalized float channels for instance color attributes.
    ///
    /// Every 8-bit value survives a round trip through `f32` and back with
    /// `(v * 255.0).round()`, so uploading these to an unlit shader is
    /// lossless on 8-bit targets.
    #[must_use]
    pub fn to_unit_rgb(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_index_is_not_black() {
        let c = ColorKey::encode(NodeIndex::new(0)).unwrap();
        assert_eq!(c, ColorKey::new(0, 0, 1));
        assert!(!c.is_background());
    }

    #[test]
    fn channel_layout() {
        let c = ColorKey::encode(NodeIndex::new(0x01_02_02)).unwrap();
        assert_eq!(c, ColorKey::new(0x01, 0x02, 0x03));
        assert_eq!(c.decode(), Some(NodeIndex::new(0x01_02_02)));
    }

    #[test]
    fn background_decodes_to_none() {
        assert_eq!(BACKGROUND.decode(), None);
        assert!(BACKGROUND.is_background());
    }

    #[test]
    fn ceiling() {
        let last = NodeIndex::new(MAX_PICKABLE_NODES - 1);
        let c = ColorKey::encode(last).unwrap();
        assert_eq!(c, ColorKey::new(0xFF, 0xFF, 0xFF));
        assert_eq!(c.decode(), Some(last));
        assert_eq!(ColorKey::encode(NodeIndex::new(MAX_PICKABLE_NODES)), None);
    }

    #[test]
    fn rgba_ignores_alpha() {
        let c = ColorKey::new(9, 8, 7);
        assert_eq!(ColorKey::from_rgba8([9, 8, 7, 0]), c);
        assert_eq!(c.to_rgba8(), [9, 8, 7, 255]);
    }

    #[test]
    fn unit_rgb_round_trips_bytes() {
        let c = ColorKey::new(1, 128, 255);
        let [r, g, b] = c.to_unit_rgb();
        let back = ColorKey::new(
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
        );
        assert_eq!(back, c);
    }
}
