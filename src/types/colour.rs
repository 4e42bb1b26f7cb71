//! Colour values as written by the map editor.

use std::fmt;
use std::str::FromStr;

use palette::Srgba;
use serde::{Serialize, Serializer};

/// An RGBA colour value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Colour {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Colour {
    /// Create a new colour from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque colour from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent colour.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// White (the neutral tint).
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Parse an editor colour string.
    ///
    /// The editor writes `#RRGGBB`, or `#AARRGGBB` when the colour carries
    /// alpha (note: alpha comes *first*). The leading `#` is optional.
    pub fn from_tiled(s: &str) -> Option<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.is_ascii() {
            return None;
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        match hex.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::new(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
            _ => None,
        }
    }

    /// Convert to an RGBA array.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Normalized `[0, 1]` components, as engines expect for modulation.
    pub fn to_unit_rgba(self) -> [f32; 4] {
        let unit: Srgba<f32> = Srgba::new(self.r, self.g, self.b, self.a).into_format();
        [unit.red, unit.green, unit.blue, unit.alpha]
    }

    /// Normalized components with alpha scaled by a layer opacity.
    pub fn modulate(self, opacity: f64) -> [f32; 4] {
        let mut rgba = self.to_unit_rgba();
        rgba[3] *= opacity.clamp(0.0, 1.0) as f32;
        rgba
    }
}

impl FromStr for Colour {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_tiled(s).ok_or_else(|| format!("Invalid colour: {}", s))
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
        }
    }
}

impl Serialize for Colour {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tiled_rgb() {
        assert_eq!(Colour::from_tiled("#ff0000"), Some(Colour::rgb(255, 0, 0)));
        assert_eq!(
            Colour::from_tiled("1a1a2e"),
            Some(Colour::rgb(0x1a, 0x1a, 0x2e))
        );
    }

    #[test]
    fn test_from_tiled_alpha_first() {
        assert_eq!(
            Colour::from_tiled("#80ff0000"),
            Some(Colour::new(255, 0, 0, 128))
        );
    }

    #[test]
    fn test_from_tiled_invalid() {
        assert_eq!(Colour::from_tiled("#GGG000"), None);
        assert_eq!(Colour::from_tiled("#12345"), None);
        assert_eq!(Colour::from_tiled(""), None);
        assert_eq!(Colour::from_tiled("#ééé"), None);
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["#ff0000", "#80ff0000"] {
            let colour: Colour = text.parse().unwrap();
            assert_eq!(colour.to_string(), text);
        }
    }

    #[test]
    fn test_modulate_scales_alpha() {
        let rgba = Colour::WHITE.modulate(0.5);
        assert_eq!(rgba, [1.0, 1.0, 1.0, 0.5]);

        let red = Colour::rgb(255, 0, 0).to_unit_rgba();
        assert_eq!(red, [1.0, 0.0, 0.0, 1.0]);
    }
}
