//! 8-bit RGB colors for widget labels

use serde::{Deserialize, Serialize};

/// Opaque RGB color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// From a packed `0xRRGGBB` value
    pub const fn from_hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    /// Packed `0x00BBGGRR`, the layout GDI expects
    pub const fn to_bgr(&self) -> u32 {
        (self.b as u32) << 16 | (self.g as u32) << 8 | self.r as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_conversions() {
        let c = Color::from_hex(0x4ade80);
        assert_eq!(c, Color { r: 0x4a, g: 0xde, b: 0x80 });
        assert_eq!(c.to_bgr(), 0x80de4a);
    }
}
