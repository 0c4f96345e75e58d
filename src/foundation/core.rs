use serde::{Deserialize, Serialize};

use crate::foundation::error::{ColorWalkError, ColorWalkResult};
use crate::foundation::math::premul_rgba8;

pub use kurbo::{Affine, BezPath, Point, Rect, RoundedRect, Vec2};

/// Columns (and rows) of the collage grid.
pub const GRID_COLUMNS: usize = 3;

/// Cells in the collage grid, row-major.
pub const GRID_CELLS: usize = GRID_COLUMNS * GRID_COLUMNS;

/// Straight-alpha RGBA8 color.
///
/// Serialized as `#RRGGBB` (or `#RRGGBBAA` when not opaque); deserialized from a hex string or a
/// `[r, g, b]` / `[r, g, b, a]` byte array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(0xFF, 0xFF, 0xFF);

    /// Build a color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional, case-insensitive).
    pub fn from_hex(s: &str) -> ColorWalkResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> ColorWalkResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| ColorWalkError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if !s.is_ascii() {
            return Err(ColorWalkError::validation("hex color must be ASCII"));
        }
        match s.len() {
            6 => Ok(Self::opaque(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self::new(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
                hex_byte(&s[6..8])?,
            )),
            _ => Err(ColorWalkError::validation(
                "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
            )),
        }
    }

    /// Format as `#RRGGBB`, or `#RRGGBBAA` when alpha is not 255.
    pub fn to_hex(self) -> String {
        if self.a == 0xFF {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Channels as a straight-alpha byte array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Channels premultiplied by alpha, as stored in the raster canvas.
    pub fn to_premul_array(self) -> [u8; 4] {
        premul_rgba8(self.to_array())
    }
}

impl Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Self::from_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::opaque(*r, *g, *b)),
                [r, g, b, a] => Ok(Self::new(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
