//! RGB colors and the value → color scale used to shade active days.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::HeatmapError;

/// An sRGB color with unrounded channels in `0.0..=255.0`.
///
/// Channels stay fractional so that nearby values on a wide scale remain
/// distinguishable; they are rounded only when formatted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise linear interpolation, `t` in `0.0..=1.0`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Scales every channel by `0.7^k`.
    pub fn darker(self, k: f64) -> Rgb {
        let f = 0.7f64.powf(k);
        Rgb {
            r: self.r * f,
            g: self.g * f,
            b: self.b * f,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// `#rrggbb`, channels rounded and clamped.
    pub fn to_hex(&self) -> String {
        let c = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = HeatmapError;

    /// Parses `#rrggbb` or `#rgb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HeatmapError::Config(format!("invalid color '{s}'"));
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |digits: &str| -> Result<f64, HeatmapError> {
            let v = u8::from_str_radix(digits, 16).map_err(|_| invalid())?;
            Ok(v as f64)
        };

        match hex.len() {
            6 => Ok(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => Ok(Rgb::new(
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Maps `[min, max]` linearly onto the segment between two colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: u64,
    max: u64,
    low: Rgb,
    high: Rgb,
}

impl ColorScale {
    pub fn new(min: u64, max: u64, low: Rgb, high: Rgb) -> Self {
        Self { min, max, low, high }
    }

    /// Builds a scale whose domain is the value range of `values`.
    /// `None` when `values` is empty.
    pub fn from_values(
        values: impl IntoIterator<Item = u64>,
        low: Rgb,
        high: Rgb,
    ) -> Option<Self> {
        let (min, max) = values.into_iter().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((v.min(lo), v.max(hi))),
        })?;
        Some(Self::new(min, max, low, high))
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    /// Position of `value` in the domain. A single-value domain maps
    /// everything to the midpoint.
    pub fn position(&self, value: u64) -> f64 {
        if self.min == self.max {
            return 0.5;
        }
        (value as f64 - self.min as f64) / (self.max as f64 - self.min as f64)
    }

    pub fn color(&self, value: u64) -> Rgb {
        self.low.lerp(self.high, self.position(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: Rgb = Rgb::new(232.0, 243.0, 236.0);
    const HIGH: Rgb = Rgb::new(52.0, 199.0, 89.0);

    #[test]
    fn test_hex_parse_and_format() {
        assert_eq!("#e8f3ec".parse::<Rgb>().unwrap(), LOW);
        assert_eq!("#34C759".parse::<Rgb>().unwrap().to_hex(), "#34c759");
        assert_eq!("#fff".parse::<Rgb>().unwrap().to_hex(), "#ffffff");
        assert!("34c759".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gggggg".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_scale_endpoints_match_configured_colors() {
        let scale = ColorScale::new(10, 90, LOW, HIGH);
        assert_eq!(scale.color(10), LOW);
        assert_eq!(scale.color(90), HIGH);
    }

    #[test]
    fn test_scale_is_strictly_monotonic_inside_domain() {
        let scale = ColorScale::new(0, 1000, LOW, HIGH);
        let mut prev = scale.color(1);
        for v in 2..1000 {
            let next = scale.color(v);
            assert_ne!(prev, next);
            assert!(next.r < prev.r);
            prev = next;
        }
    }

    #[test]
    fn test_degenerate_scale_is_midpoint() {
        let scale = ColorScale::new(7, 7, LOW, HIGH);
        let mid = scale.color(7);
        assert!(mid.is_finite());
        assert_eq!(mid, Rgb::new(142.0, 221.0, 162.5));
    }

    #[test]
    fn test_from_values() {
        let scale = ColorScale::from_values([31, 13, 88, 15], LOW, HIGH).unwrap();
        assert_eq!((scale.min(), scale.max()), (13, 88));
        assert!(ColorScale::from_values(Vec::<u64>::new(), LOW, HIGH).is_none());
    }

    #[test]
    fn test_darker_scales_channels() {
        let dark = Rgb::new(100.0, 200.0, 50.0).darker(2.0);
        assert!((dark.r - 49.0).abs() < 1e-9);
        assert!((dark.g - 98.0).abs() < 1e-9);
        assert!((dark.b - 24.5).abs() < 1e-9);
    }
}
