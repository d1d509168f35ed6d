//! 8-bit RGB colors and the per-channel operations palettes are built from.
//!
//! Every operation works on byte channels and rounds to the nearest byte, so
//! results are reproducible across platforms.

use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// An opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A gray with all three channels set to `level`.
    pub const fn gray(level: u8) -> Self {
        Self::new(level, level, level)
    }

    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub const fn from_channels([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }

    /// Parse `RRGGBB` or `#RRGGBB` (case-insensitive).
    pub fn from_hex(raw: &str) -> Result<Self> {
        let digits = raw.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ModelError::InvalidHex(raw.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ModelError::InvalidHex(raw.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Six uppercase hex digits without a leading `#`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Relative luminance in `0.0..=1.0` using Rec.709 weights on the
    /// gamma-encoded channels.
    pub fn luminance(self) -> f64 {
        (0.2126 * f64::from(self.r)
            + 0.7152 * f64::from(self.g)
            + 0.0722 * f64::from(self.b))
            / 255.0
    }

    /// HSL lightness expressed as a gray level, `(max + min) / 2`.
    pub fn lightness(self) -> f64 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        (f64::from(max) + f64::from(min)) / 2.0
    }

    /// `max - min` over the three channels.
    pub fn chroma(self) -> u8 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        max - min
    }

    /// Chroma relative to the brightest channel (HSV saturation).
    pub fn saturation(self) -> f64 {
        let max = self.r.max(self.g).max(self.b);
        if max == 0 {
            return 0.0;
        }
        f64::from(self.chroma()) / f64::from(max)
    }

    /// Hue angle in degrees, `0.0..360.0`. Grays report `0.0`.
    pub fn hue(self) -> f64 {
        let (r, g, b) =
            (f64::from(self.r), f64::from(self.g), f64::from(self.b));
        let max = r.max(g).max(b);
        let d = max - r.min(g).min(b);
        if d <= 0.0 {
            return 0.0;
        }
        let sector = if max == r {
            ((g - b) / d).rem_euclid(6.0)
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        sector * 60.0
    }

    /// Euclidean distance over the three byte channels.
    pub fn distance(self, other: Rgb) -> f64 {
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(
            to_byte(f(f64::from(self.r))),
            to_byte(f(f64::from(self.g))),
            to_byte(f(f64::from(self.b))),
        )
    }

    fn zip(self, other: Rgb, f: impl Fn(f64, f64) -> f64) -> Self {
        Self::new(
            to_byte(f(f64::from(self.r), f64::from(other.r))),
            to_byte(f(f64::from(self.g), f64::from(other.g))),
            to_byte(f(f64::from(self.b), f64::from(other.b))),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rgb {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        Rgb::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

#[inline]
fn to_byte(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// `c * (1 - f)` per channel.
pub fn darken(color: Rgb, factor: f64) -> Rgb {
    color.map(|c| c * (1.0 - factor))
}

/// `c + (255 - c) * f` per channel.
pub fn lighten(color: Rgb, factor: f64) -> Rgb {
    color.map(|c| c + (255.0 - c) * factor)
}

/// `a * (1 - t) + b * t` per channel.
pub fn mix(a: Rgb, b: Rgb, t: f64) -> Rgb {
    a.zip(b, |x, y| x * (1.0 - t) + y * t)
}

/// Linear interpolation with `t` clamped to `0.0..=1.0`.
pub fn lerp(from: Rgb, to: Rgb, t: f64) -> Rgb {
    mix(from, to, t.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_accepts_hash_prefix_and_lowercase() {
        assert_eq!(Rgb::from_hex("#c83c3c").unwrap(), Rgb::new(200, 60, 60));
        assert_eq!(Rgb::from_hex("C83C3C").unwrap(), Rgb::new(200, 60, 60));
        assert_eq!(Rgb::new(200, 60, 60).to_hex(), "C83C3C");
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn hex_rejects_malformed_input() {
        assert!(Rgb::from_hex("").is_err());
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("GGGGGG").is_err());
        assert!(Rgb::from_hex("#1234567").is_err());
    }

    #[test]
    fn darken_lighten_mix_round_to_nearest() {
        let c = Rgb::new(200, 60, 60);
        assert_eq!(darken(c, 0.45), Rgb::new(110, 33, 33));
        assert_eq!(lighten(c, 0.5), Rgb::new(228, 158, 158));
        assert_eq!(mix(Rgb::BLACK, Rgb::WHITE, 0.5), Rgb::gray(128));
        assert_eq!(darken(c, 0.0), c);
        assert_eq!(lighten(c, 1.0), Rgb::WHITE);
    }

    #[test]
    fn hue_and_saturation() {
        assert_eq!(Rgb::new(255, 0, 0).hue(), 0.0);
        assert!((Rgb::new(0, 255, 0).hue() - 120.0).abs() < 1e-9);
        assert!((Rgb::new(0, 0, 255).hue() - 240.0).abs() < 1e-9);
        assert_eq!(Rgb::gray(90).saturation(), 0.0);
        assert_eq!(Rgb::BLACK.saturation(), 0.0);
        assert!((Rgb::new(200, 100, 100).saturation() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(Rgb::BLACK.distance(Rgb::new(3, 4, 0)), 5.0);
        assert_eq!(Rgb::WHITE.distance(Rgb::WHITE), 0.0);
    }

    #[test]
    fn lerp_clamps_progress() {
        let a = Rgb::new(0, 100, 200);
        let b = Rgb::new(100, 0, 255);
        assert_eq!(lerp(a, b, -1.0), a);
        assert_eq!(lerp(a, b, 2.0), b);
    }
}
