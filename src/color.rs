use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use palette::{FromColor, IntoColor, Lab, Srgb};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 24-bit RGB color, written as lowercase `#rrggbb` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800`, `#FF8800` or `ff8800`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!("invalid hex color: expected 6 hex digits, got {:?}", hex);
        }
        let r = u8::from_str_radix(&hex[0..2], 16)?;
        let g = u8::from_str_radix(&hex[2..4], 16)?;
        let b = u8::from_str_radix(&hex[4..6], 16)?;
        Ok(Self { r, g, b })
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        self.to_string()
    }

    /// Uniformly random color.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let [r, g, b] = rng.gen::<[u8; 3]>();
        Self { r, g, b }
    }

    /// Convert to CIELAB (the space colors are clustered in).
    pub fn to_lab(self) -> Lab {
        let srgb: Srgb<f32> = Srgb::new(self.r, self.g, self.b).into_format();
        srgb.into_color()
    }

    /// Create from CIELAB, clamping out-of-gamut values.
    pub fn from_lab(lab: Lab) -> Self {
        let srgb: Srgb<f32> = Srgb::from_color(lab);
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            r: channel(srgb.red),
            g: channel(srgb.green),
            b: channel(srgb.blue),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// An ordered run of colors. Image-derived palettes are ordered by
/// descending pixel count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(pub Vec<Color>);

impl Palette {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }
}
