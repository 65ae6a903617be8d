//! Resolves the effective `RippleConfig` and `Theme` from CLI inputs.
//!
//! Layering: defaults, then the `--config` file, then `--params` (params
//! win key by key). A `"theme"` key may appear in either; `--theme` beats it.

use crate::error::CliError;
use ripple_core::{RippleConfig, Theme};
use serde_json::{Map, Value};
use std::path::Path;

/// Config and theme after every layer has been applied and validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub config: RippleConfig,
    pub theme: Theme,
}

fn parse_object(text: &str, origin: &str) -> Result<Map<String, Value>, CliError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CliError::Input(format!(
            "{origin} must be a JSON object, got {other}"
        ))),
        Err(e) => Err(CliError::Input(format!("invalid {origin} JSON: {e}"))),
    }
}

/// Merges the config file (if any) and the params string into one object.
pub fn merge_layers(config_text: Option<&str>, params: &str) -> Result<Value, CliError> {
    let mut merged = match config_text {
        Some(text) => parse_object(text, "--config")?,
        None => Map::new(),
    };
    merged.extend(parse_object(params, "--params")?);
    Ok(Value::Object(merged))
}

/// Builds settings from a merged params object and an optional theme flag.
pub fn resolve(mut merged: Value, theme_flag: Option<&str>) -> Result<Settings, CliError> {
    let theme = match theme_flag {
        Some(name) => Theme::from_name(name)?,
        None => Theme::from_json(&merged, Theme::default())?,
    };
    if let Some(map) = merged.as_object_mut() {
        map.remove("theme");
    }
    RippleConfig::check_json(&merged)?;
    let config = RippleConfig::from_json(&merged);
    config.validate()?;
    Ok(Settings { config, theme })
}

/// Reads `--config`, merges `--params` and resolves the theme.
pub fn load(
    config_path: Option<&Path>,
    params: &str,
    theme_flag: Option<&str>,
) -> Result<Settings, CliError> {
    let text = config_path
        .map(|path| {
            std::fs::read_to_string(path)
                .map_err(|e| CliError::Io(format!("reading {}: {e}", path.display())))
        })
        .transpose()?;
    resolve(merge_layers(text.as_deref(), params)?, theme_flag)
}

/// Parses an FPS trace: numbers separated by commas and/or whitespace.
pub fn parse_fps_trace(text: &str) -> Result<Vec<f64>, CliError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|_| CliError::Input(format!("invalid FPS sample: {tok:?}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_when_nothing_given() {
        let settings = resolve(merge_layers(None, "{}").unwrap(), None).unwrap();
        assert_eq!(settings.config, RippleConfig::default());
        assert_eq!(settings.theme, Theme::Blue);
    }

    #[test]
    fn params_override_config_file() {
        let merged = merge_layers(
            Some(r#"{"ring_radius": 20.0, "ring_width": 5.0}"#),
            r#"{"ring_radius": 9.0}"#,
        )
        .unwrap();
        assert_eq!(merged, json!({"ring_radius": 9.0, "ring_width": 5.0}));
        let settings = resolve(merged, None).unwrap();
        assert_eq!(settings.config.ring_radius, 9.0);
        assert_eq!(settings.config.ring_width, 5.0);
    }

    #[test]
    fn theme_key_and_flag() {
        let merged = merge_layers(None, r#"{"theme": "orange"}"#).unwrap();
        assert_eq!(resolve(merged.clone(), None).unwrap().theme, Theme::Orange);
        assert_eq!(resolve(merged, Some("blue")).unwrap().theme, Theme::Blue);
    }

    #[test]
    fn unknown_theme_is_input_error() {
        let err = resolve(json!({}), Some("teal")).unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn unknown_key_is_input_error() {
        let err = resolve(json!({"ring_colour": 1}), None).unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn invalid_value_is_engine_error() {
        let err = resolve(json!({"decay_factor": 1.5}), None).unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn non_object_params_rejected() {
        assert!(matches!(merge_layers(None, "[1, 2]"), Err(CliError::Input(_))));
        assert!(matches!(merge_layers(None, "{oops"), Err(CliError::Input(_))));
    }

    #[test]
    fn load_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ripple.json");
        std::fs::write(&path, r#"{"theme": "orange", "sample_stride": 2}"#).unwrap();
        let settings = load(Some(&path), "{}", None).unwrap();
        assert_eq!(settings.theme, Theme::Orange);
        assert_eq!(settings.config.sample_stride, 2);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("nope.json")), "{}", None).unwrap_err();
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn fps_trace_accepts_commas_and_whitespace() {
        assert_eq!(
            parse_fps_trace("28,46, 28\n46\t60").unwrap(),
            vec![28.0, 46.0, 28.0, 46.0, 60.0]
        );
        assert!(parse_fps_trace("").unwrap().is_empty());
        assert!(matches!(parse_fps_trace("28,fast"), Err(CliError::Input(_))));
    }
}
