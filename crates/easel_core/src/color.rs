//! Packed RGBA color
//!
//! Canvas colors travel through the command buffer as a single `u32`,
//! 8 bits per channel, ordered R, G, B, A from the most to the least
//! significant byte (`0xRRGGBBAA`).

use std::fmt;

/// 32-bit packed RGBA color (`0xRRGGBBAA`)
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PackedColor(pub u32);

impl PackedColor {
    pub const WHITE: PackedColor = PackedColor(0xFFFF_FFFF);
    pub const BLACK: PackedColor = PackedColor(0x0000_00FF);
    pub const RED: PackedColor = PackedColor(0xFF00_00FF);
    pub const GREEN: PackedColor = PackedColor(0x00FF_00FF);
    pub const BLUE: PackedColor = PackedColor(0x0000_FFFF);
    pub const TRANSPARENT: PackedColor = PackedColor(0);

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 0xFF)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Decode into `[r, g, b, a]`
    pub const fn channels(self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), self.a()]
    }

    /// Decode into normalized `[r, g, b, a]` in `0.0..=1.0`
    pub fn to_f32_array(self) -> [f32; 4] {
        let [r, g, b, a] = self.channels();
        [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ]
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for PackedColor {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<PackedColor> for u32 {
    fn from(color: PackedColor) -> Self {
        color.0
    }
}

impl From<[u8; 4]> for PackedColor {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::from_rgba(r, g, b, a)
    }
}

impl fmt::Debug for PackedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedColor(#{:08X})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_order() {
        let color = PackedColor(0x1122_3344);
        assert_eq!(color.channels(), [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(PackedColor::RED.channels(), [255, 0, 0, 255]);
    }

    #[test]
    fn test_pack_unpack_lossless() {
        // Walk the u32 space with a stride that touches every byte value
        let mut value: u32 = 0;
        loop {
            let color = PackedColor(value);
            let [r, g, b, a] = color.channels();
            assert_eq!(PackedColor::from_rgba(r, g, b, a), color);
            match value.checked_add(0x0101_0107) {
                Some(next) => value = next,
                None => break,
            }
        }
        for value in [0, u32::MAX, 0x8000_0001, 0x00FF_FF00] {
            assert_eq!(PackedColor::from(PackedColor(value).channels()).to_u32(), value);
        }
    }

    #[test]
    fn test_normalized() {
        assert_eq!(PackedColor::WHITE.to_f32_array(), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(PackedColor::TRANSPARENT.to_f32_array(), [0.0; 4]);
    }
}
