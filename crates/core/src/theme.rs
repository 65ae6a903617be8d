//! Closed set of color themes and the force-to-color shading they drive.
//!
//! Each [`Theme`] owns a constant [`ThemeColors`]. Shading maps a cell's
//! `force` to a brightness on top of an ambient floor, tinted by the theme:
//!
//! ```text
//! intensity = max(force * bloom_reduction, 0) ^ gamma
//! rgb       = tint * (ambient + intensity)
//! ```

use crate::color::Srgb;
use crate::error::EngineError;
use crate::params::param_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// All theme names, in declaration order.
const THEME_NAMES: &[&str] = &["orange", "blue"];

/// Color-mapping constants of one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    /// Multiplier applied to the final brightness.
    pub tint: Srgb,
    /// Brightness of the surface at rest.
    pub ambient: f64,
    /// Scale applied to `force` before the gamma curve.
    pub bloom_reduction: f64,
    /// Exponent of the brightness curve.
    pub gamma: f64,
}

impl ThemeColors {
    /// Color of a cell with the given `force`.
    pub fn shade(&self, force: f64) -> Srgb {
        let scaled = force * self.bloom_reduction;
        let intensity = if scaled > 0.0 {
            scaled.powf(self.gamma)
        } else {
            0.0
        };
        self.tint.scale(self.ambient + intensity).clamped()
    }

    /// Color of the surface at rest.
    pub fn rest(&self) -> Srgb {
        self.shade(0.0)
    }
}

const ORANGE: ThemeColors = ThemeColors {
    tint: Srgb::new(1.0, 0.5, 0.1),
    ambient: 0.3,
    bloom_reduction: 0.7,
    gamma: 0.8,
};

const BLUE: ThemeColors = ThemeColors {
    tint: Srgb::new(0.2, 0.5, 1.0),
    ambient: 0.3,
    bloom_reduction: 0.7,
    gamma: 0.8,
};

/// A color theme for the ripple surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Warm orange tones.
    Orange,
    /// Cool blue tones.
    #[default]
    Blue,
}

impl Theme {
    /// Looks a theme up by its lowercase name.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "orange" => Ok(Theme::Orange),
            "blue" => Ok(Theme::Blue),
            _ => Err(EngineError::UnknownTheme(name.to_string())),
        }
    }

    /// Reads `params["theme"]`, falling back to `fallback` when absent.
    pub fn from_json(params: &Value, fallback: Theme) -> Result<Self, EngineError> {
        Self::from_name(&param_string(params, "theme", fallback.name()))
    }

    /// Lowercase name of this theme.
    pub fn name(self) -> &'static str {
        match self {
            Theme::Orange => "orange",
            Theme::Blue => "blue",
        }
    }

    /// Color-mapping constants of this theme.
    pub fn colors(self) -> &'static ThemeColors {
        match self {
            Theme::Orange => &ORANGE,
            Theme::Blue => &BLUE,
        }
    }

    /// Shades a `force` value with this theme.
    pub fn shade(self, force: f64) -> Srgb {
        self.colors().shade(force)
    }

    /// Every theme name.
    pub fn list_names() -> &'static [&'static str] {
        THEME_NAMES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EPS: f64 = 1e-9;

    #[test]
    fn rest_color_is_ambient_tint() {
        let c = Theme::Orange.colors().rest();
        assert!((c.r - 0.3).abs() < EPS);
        assert!((c.g - 0.15).abs() < EPS);
        assert!((c.b - 0.03).abs() < EPS);
        let b = Theme::Blue.colors().rest();
        assert!((b.b - 0.3).abs() < EPS);
    }

    #[test]
    fn negative_force_shades_as_rest() {
        for theme in [Theme::Orange, Theme::Blue] {
            assert_eq!(theme.shade(-2.0), theme.colors().rest());
        }
    }

    #[test]
    fn positive_force_brightens() {
        let rest = Theme::Blue.shade(0.0);
        let lit = Theme::Blue.shade(0.5);
        assert!(lit.b > rest.b);
        assert!(lit.g > rest.g);
    }

    #[test]
    fn shading_follows_gamma_curve() {
        let expected = (0.5_f64 * 0.7).powf(0.8);
        let c = Theme::Orange.shade(0.5);
        assert!((c.r - (0.3 + expected)).abs() < EPS);
    }

    #[test]
    fn large_force_saturates_without_overflow() {
        let c = Theme::Orange.shade(1e6);
        assert_eq!(c.r, 1.0);
        assert!(c.b <= 1.0);
        assert!(Theme::Orange.shade(f64::NAN).r.is_finite());
    }

    #[test]
    fn from_name_accepts_known_names_case_insensitively() {
        assert_eq!(Theme::from_name("orange").unwrap(), Theme::Orange);
        assert_eq!(Theme::from_name(" Blue ").unwrap(), Theme::Blue);
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert!(matches!(
            Theme::from_name("purple"),
            Err(EngineError::UnknownTheme(name)) if name == "purple"
        ));
    }

    #[test]
    fn from_json_reads_theme_key() {
        assert_eq!(
            Theme::from_json(&json!({"theme": "orange"}), Theme::Blue).unwrap(),
            Theme::Orange
        );
        assert_eq!(Theme::from_json(&json!({}), Theme::Blue).unwrap(), Theme::Blue);
    }

    #[test]
    fn names_round_trip() {
        for name in Theme::list_names() {
            assert_eq!(Theme::from_name(name).unwrap().name(), *name);
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Theme::Orange).unwrap(), "\"orange\"");
        let t: Theme = serde_json::from_str("\"blue\"").unwrap();
        assert_eq!(t, Theme::Blue);
    }
}
