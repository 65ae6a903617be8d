//! sRGB color values used by the theme shading.
//!
//! Components are `f64` in [0, 1] while shading; [`Srgb::to_rgba8`] quantizes
//! for pixel output. Serializes as a `"#rrggbb"` hex string.

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components nominally in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Srgb {
    pub const BLACK: Srgb = Srgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parses a hex color string like "#ff00aa" or "ff00aa" (case insensitive).
    ///
    /// Returns `EngineError::InvalidColor` if the input is not a 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Srgb, EngineError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits, got {:?}",
                hex
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Srgb {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    /// Formats as `"#rrggbb"`, clamping and rounding to 8 bits.
    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Multiplies every component by `factor` (no clamping).
    pub fn scale(self, factor: f64) -> Srgb {
        Srgb::new(self.r * factor, self.g * factor, self.b * factor)
    }

    /// Clamps every component to [0, 1]; NaN becomes 0.
    pub fn clamped(self) -> Srgb {
        let c = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Srgb::new(c(self.r), c(self.g), c(self.b))
    }

    /// Quantizes to opaque RGBA8.
    pub fn to_rgba8(self) -> [u8; 4] {
        let c = self.clamped();
        let q = |v: f64| (v * 255.0).round() as u8;
        [q(c.r), q(c.g), q(c.b), 255]
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn from_hex_parses_with_and_without_hash() {
        let a = Srgb::from_hex("#ff8019").unwrap();
        let b = Srgb::from_hex("FF8019").unwrap();
        assert_eq!(a, b);
        assert!(approx_eq(a.r, 1.0));
        assert!(approx_eq(a.g, 128.0 / 255.0));
        assert!(approx_eq(a.b, 25.0 / 255.0));
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(Srgb::from_hex("#12345").is_err());
        assert!(Srgb::from_hex("zzzzzz").is_err());
        assert!(Srgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn to_hex_round_trips_quantized_values() {
        for hex in ["#000000", "#ffffff", "#3380ff", "#ff8019"] {
            assert_eq!(Srgb::from_hex(hex).unwrap().to_hex(), hex);
        }
    }

    #[test]
    fn to_rgba8_clamps_and_is_opaque() {
        assert_eq!(Srgb::new(1.7, -0.2, f64::NAN).to_rgba8(), [255, 0, 0, 255]);
    }

    #[test]
    fn scale_multiplies_components() {
        let c = Srgb::new(0.2, 0.5, 1.0).scale(0.5);
        assert!(approx_eq(c.r, 0.1) && approx_eq(c.g, 0.25) && approx_eq(c.b, 0.5));
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&Srgb::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Srgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_hex(), "#ff0000");
        assert!(serde_json::from_str::<Srgb>("\"nothex\"").is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn clamped_is_always_in_unit_range(
                r in -10.0_f64..10.0,
                g in -10.0_f64..10.0,
                b in -10.0_f64..10.0,
            ) {
                let c = Srgb::new(r, g, b).clamped();
                for v in [c.r, c.g, c.b] {
                    prop_assert!((0.0..=1.0).contains(&v));
                }
            }
        }
    }
}
