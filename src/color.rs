use crate::error::{ConfigurationError, Result};

/// Opaque RGB color. Alpha lives on the particle, not the color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Warm ember palette used when no palette is configured.
pub const DEFAULT_PALETTE: [Color; 5] = [
    Color::rgb(0xFB, 0x8C, 0x0D),
    Color::rgb(0xE3, 0x5E, 0x0B),
    Color::rgb(0xFA, 0x3A, 0x00),
    Color::rgb(0xE3, 0x1D, 0x0B),
    Color::rgb(0xFF, 0x1A, 0x4E),
];

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConfigurationError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ConfigurationError::InvalidColor(hex.to_string()))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Per-channel linear interpolation. `t` is clamped to [0, 1].
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Pack as `0xRRGGBBAA`.
    pub fn to_rgba(self, alpha: u8) -> u32 {
        (self.r as u32) << 24 | (self.g as u32) << 16 | (self.b as u32) << 8 | alpha as u32
    }
}

/// Parse a list of hex strings into a palette.
pub fn palette_from_hex(hexes: &[&str]) -> Result<Vec<Color>> {
    hexes.iter().map(|h| Color::from_hex(h)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(Color::from_hex("#FB8C0D").unwrap(), Color::rgb(0xFB, 0x8C, 0x0D));
        assert_eq!(Color::from_hex("ff1a4e").unwrap(), Color::rgb(0xFF, 0x1A, 0x4E));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Color::from_hex("#FB8C0").is_err());
        assert!(Color::from_hex("#GG8C0D").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn lerp_endpoints_and_clamp() {
        let a = Color::rgb(0, 100, 200);
        let b = Color::rgb(200, 100, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 5.0), b);
        assert_eq!(a.lerp(b, -1.0), a);
        assert_eq!(a.lerp(b, 0.5), Color::rgb(100, 100, 100));
    }

    #[test]
    fn packs_rgba() {
        assert_eq!(Color::rgb(0x12, 0x34, 0x56).to_rgba(0x78), 0x12345678);
    }

    #[test]
    fn default_palette_matches_hex() {
        let parsed =
            palette_from_hex(&["#FB8C0D", "#E35E0B", "#FA3A00", "#E31D0B", "#FF1A4E"]).unwrap();
        assert_eq!(parsed, DEFAULT_PALETTE.to_vec());
    }
}
