//! 24-bit RGB colors as submitted by the settings page.
//!
//! The page sends colors either as hex strings (`"ff0000"`, `"#FF0000"`,
//! `"0xff0000"`) or as plain integers. Both normalize to [`Rgb`].
//!
//! The device renders from a 64-color palette (two bits per channel), which
//! is what [`nearest_non_gray`] searches when gray has to be avoided.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 24-bit RGB color, `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Rgb(u32);

/// Integer wider than 24 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0:#x} does not fit in 24 bits")]
pub struct OutOfRange(pub u32);

impl Rgb {
    /// Largest valid color value.
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Wrap a raw integer, rejecting anything wider than 24 bits.
    pub fn new(value: u32) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    /// Build a color from its channels.
    pub fn from_channels(r: u8, g: u8, b: u8) -> Self {
        Self((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    /// Split into `(r, g, b)`.
    pub fn channels(self) -> (u8, u8, u8) {
        let [_, r, g, b] = self.0.to_be_bytes();
        (r, g, b)
    }

    /// The packed `0xRRGGBB` value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// All three channels are equal.
    pub fn is_gray(self) -> bool {
        let (r, g, b) = self.channels();
        r == g && g == b
    }

    /// Parse a hex color string.
    ///
    /// Accepts an optional `#`, `0x` or `0X` prefix and either case. The
    /// remainder must be exactly six hex digits.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        let mut bytes = [0u8; 3];
        hex::decode_to_slice(digits, &mut bytes).ok()?;
        let [r, g, b] = bytes;
        Some(Self::from_channels(r, g, b))
    }
}

impl TryFrom<u32> for Rgb {
    type Error = OutOfRange;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(OutOfRange(value))
    }
}

impl From<Rgb> for u32 {
    fn from(color: Rgb) -> Self {
        color.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Channel levels of the device palette.
const PALETTE_LEVELS: [u8; 4] = [0x00, 0x55, 0xAA, 0xFF];

/// The 64 palette colors in channel-major order (red, then green, then blue).
pub fn palette() -> impl Iterator<Item = Rgb> {
    PALETTE_LEVELS.into_iter().flat_map(|r| {
        PALETTE_LEVELS.into_iter().flat_map(move |g| {
            PALETTE_LEVELS
                .into_iter()
                .map(move |b| Rgb::from_channels(r, g, b))
        })
    })
}

fn distance(a: Rgb, b: Rgb) -> u32 {
    let (ar, ag, ab) = a.channels();
    let (br, bg, bb) = b.channels();
    [(ar, br), (ag, bg), (ab, bb)]
        .into_iter()
        .map(|(x, y)| u32::from(x.abs_diff(y)).pow(2))
        .sum()
}

/// Closest non-gray palette color.
///
/// Ties resolve to the earliest color in [`palette`] order.
pub fn nearest_non_gray(color: Rgb) -> Rgb {
    palette()
        .filter(|candidate| !candidate.is_gray())
        .min_by_key(|candidate| distance(color, *candidate))
        .unwrap_or(color)
}
