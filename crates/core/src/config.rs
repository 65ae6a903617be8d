//! Tunable constants of the ripple simulation and its quality governor.
//!
//! [`RippleConfig::default`] holds the tuned constants of the
//! browser effect. Overrides arrive as JSON, either as a whole document
//! (serde, missing keys fall back to defaults) or as a partial params object
//! layered over an existing config with [`RippleConfig::apply_json`].

use crate::error::EngineError;
use crate::params::{json_type_name, param_bool, param_f64, param_usize};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_LOW_FPS_THRESHOLD: f64 = 30.0;
const DEFAULT_HIGH_FPS_THRESHOLD: f64 = 45.0;
const DEFAULT_MIN_RESOLUTION_SCALE: f64 = 0.5;
const DEFAULT_RESOLUTION_STEP: f64 = 0.05;
const DEFAULT_ROLLING_WINDOW_SIZE: usize = 10;
const DEFAULT_HYSTERESIS_FRAMES: usize = 3;
const DEFAULT_RING_RADIUS: f64 = 15.0;
const DEFAULT_RING_WIDTH: f64 = 4.0;
const DEFAULT_RING_STRENGTH: f64 = 0.7;
const DEFAULT_DECAY_FACTOR: f64 = 0.98;
const DEFAULT_STEP_DELTA: f64 = 1.21;
const DEFAULT_RESTORING_FACTOR: f64 = 0.004;
/// `1 - restoring * delta`: the velocity damping factor.
const DEFAULT_DAMPING_FACTOR: f64 = 1.0 - DEFAULT_RESTORING_FACTOR * DEFAULT_STEP_DELTA;
const DEFAULT_SAMPLE_STRIDE: usize = 5;
const DEFAULT_AUDIO_THRESHOLD: f64 = 0.6;
const DEFAULT_PROBE_CLEAR_COUNT: usize = 50;
const DEFAULT_PROBE_MAX_MS_PER_CLEAR: f64 = 2.0;

/// Every tunable of the simulation, excitation, governor and probe.
///
/// Lengths (`ring_radius`, `ring_width`) are in viewport pixels; the
/// controller converts them to cells with the current resolution scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    /// Below this FPS the governor steps resolution down; a full window
    /// averaging below it disables the simulation.
    pub low_fps_threshold: f64,
    /// Above this FPS the governor steps resolution back up.
    pub high_fps_threshold: f64,
    /// Floor of the resolution scale.
    pub min_resolution_scale: f64,
    /// Amount the resolution scale moves per adjustment.
    pub resolution_step: f64,
    /// Capacity of the rolling FPS window.
    pub rolling_window_size: usize,
    /// Consecutive breaching frames required before the scale moves.
    pub hysteresis_frames: usize,
    /// Outer radius of a pointer ring.
    pub ring_radius: f64,
    /// Width of a pointer ring (outer minus inner radius).
    pub ring_width: f64,
    /// Force injected at full ring weight.
    pub ring_strength: f64,
    /// Per-step multiplicative decay of `force`.
    pub decay_factor: f64,
    /// Per-step multiplicative damping of `velocity`.
    pub damping_factor: f64,
    /// Coupling that pulls `velocity` back towards rest, scaled by `step_delta`.
    pub restoring_factor: f64,
    /// Integration step size.
    pub step_delta: f64,
    /// Neighbour sampling stride in cells.
    pub sample_stride: usize,
    /// Whether audio levels may inject rings.
    pub audio_reactive: bool,
    /// Bass intensity in [0, 1] above which an audio ring fires.
    pub audio_threshold: f64,
    /// Number of clears timed by the capability probe.
    pub probe_clear_count: usize,
    /// Maximum average milliseconds per probe clear.
    pub probe_max_ms_per_clear: f64,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            low_fps_threshold: DEFAULT_LOW_FPS_THRESHOLD,
            high_fps_threshold: DEFAULT_HIGH_FPS_THRESHOLD,
            min_resolution_scale: DEFAULT_MIN_RESOLUTION_SCALE,
            resolution_step: DEFAULT_RESOLUTION_STEP,
            rolling_window_size: DEFAULT_ROLLING_WINDOW_SIZE,
            hysteresis_frames: DEFAULT_HYSTERESIS_FRAMES,
            ring_radius: DEFAULT_RING_RADIUS,
            ring_width: DEFAULT_RING_WIDTH,
            ring_strength: DEFAULT_RING_STRENGTH,
            decay_factor: DEFAULT_DECAY_FACTOR,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            restoring_factor: DEFAULT_RESTORING_FACTOR,
            step_delta: DEFAULT_STEP_DELTA,
            sample_stride: DEFAULT_SAMPLE_STRIDE,
            audio_reactive: true,
            audio_threshold: DEFAULT_AUDIO_THRESHOLD,
            probe_clear_count: DEFAULT_PROBE_CLEAR_COUNT,
            probe_max_ms_per_clear: DEFAULT_PROBE_MAX_MS_PER_CLEAR,
        }
    }
}

/// Keys holding floating-point values.
const F64_KEYS: &[&str] = &[
    "low_fps_threshold",
    "high_fps_threshold",
    "min_resolution_scale",
    "resolution_step",
    "ring_radius",
    "ring_width",
    "ring_strength",
    "decay_factor",
    "damping_factor",
    "restoring_factor",
    "step_delta",
    "audio_threshold",
    "probe_max_ms_per_clear",
];

/// Keys holding non-negative integers.
const USIZE_KEYS: &[&str] = &[
    "rolling_window_size",
    "hysteresis_frames",
    "sample_stride",
    "probe_clear_count",
];

/// Keys holding booleans.
const BOOL_KEYS: &[&str] = &["audio_reactive"];

impl RippleConfig {
    /// Default config with the overrides found in `params` applied.
    pub fn from_json(params: &Value) -> Self {
        let mut config = Self::default();
        config.apply_json(params);
        config
    }

    /// Layers a partial params object over this config. Missing or
    /// mistyped keys keep their current value.
    pub fn apply_json(&mut self, params: &Value) {
        self.low_fps_threshold = param_f64(params, "low_fps_threshold", self.low_fps_threshold);
        self.high_fps_threshold = param_f64(params, "high_fps_threshold", self.high_fps_threshold);
        self.min_resolution_scale =
            param_f64(params, "min_resolution_scale", self.min_resolution_scale);
        self.resolution_step = param_f64(params, "resolution_step", self.resolution_step);
        self.rolling_window_size =
            param_usize(params, "rolling_window_size", self.rolling_window_size);
        self.hysteresis_frames = param_usize(params, "hysteresis_frames", self.hysteresis_frames);
        self.ring_radius = param_f64(params, "ring_radius", self.ring_radius);
        self.ring_width = param_f64(params, "ring_width", self.ring_width);
        self.ring_strength = param_f64(params, "ring_strength", self.ring_strength);
        self.decay_factor = param_f64(params, "decay_factor", self.decay_factor);
        self.damping_factor = param_f64(params, "damping_factor", self.damping_factor);
        self.restoring_factor = param_f64(params, "restoring_factor", self.restoring_factor);
        self.step_delta = param_f64(params, "step_delta", self.step_delta);
        self.sample_stride = param_usize(params, "sample_stride", self.sample_stride);
        self.audio_reactive = param_bool(params, "audio_reactive", self.audio_reactive);
        self.audio_threshold = param_f64(params, "audio_threshold", self.audio_threshold);
        self.probe_clear_count = param_usize(params, "probe_clear_count", self.probe_clear_count);
        self.probe_max_ms_per_clear =
            param_f64(params, "probe_max_ms_per_clear", self.probe_max_ms_per_clear);
    }

    /// Strict check of a params object: every key must be known and
    /// carry the expected JSON type.
    pub fn check_json(params: &Value) -> Result<(), EngineError> {
        let Some(map) = params.as_object() else {
            return Err(EngineError::ParamTypeMismatch {
                name: "params".into(),
                expected: "object".into(),
                got: json_type_name(params).into(),
            });
        };
        for (name, value) in map {
            let expected = if F64_KEYS.contains(&name.as_str()) {
                value.is_number().then_some(()).ok_or("number")
            } else if USIZE_KEYS.contains(&name.as_str()) {
                value.is_u64().then_some(()).ok_or("non-negative integer")
            } else if BOOL_KEYS.contains(&name.as_str()) {
                value.is_boolean().then_some(()).ok_or("boolean")
            } else {
                return Err(EngineError::ParamNotFound(name.clone()));
            };
            if let Err(expected) = expected {
                return Err(EngineError::ParamTypeMismatch {
                    name: name.clone(),
                    expected: expected.into(),
                    got: json_type_name(value).into(),
                });
            }
        }
        Ok(())
    }

    /// Rejects values that would make the simulation diverge or the governor
    /// misbehave.
    pub fn validate(&self) -> Result<(), EngineError> {
        let fail = |msg: &str| -> Result<(), EngineError> {
            Err(EngineError::InvalidConfig(msg.to_string()))
        };
        if !(self.low_fps_threshold > 0.0) {
            return fail("low_fps_threshold must be positive");
        }
        if !(self.high_fps_threshold >= self.low_fps_threshold) {
            return fail("high_fps_threshold must be >= low_fps_threshold");
        }
        if !(self.min_resolution_scale > 0.0 && self.min_resolution_scale <= 1.0) {
            return fail("min_resolution_scale must be in (0, 1]");
        }
        if !(self.resolution_step > 0.0 && self.resolution_step <= 1.0) {
            return fail("resolution_step must be in (0, 1]");
        }
        if self.rolling_window_size == 0 {
            return fail("rolling_window_size must be at least 1");
        }
        if self.hysteresis_frames == 0 {
            return fail("hysteresis_frames must be at least 1");
        }
        if !(self.decay_factor > 0.0 && self.decay_factor < 1.0) {
            return fail("decay_factor must be in (0, 1)");
        }
        if !(self.damping_factor > 0.0 && self.damping_factor < 1.0) {
            return fail("damping_factor must be in (0, 1)");
        }
        if !(self.restoring_factor >= 0.0) {
            return fail("restoring_factor must be non-negative");
        }
        if !(self.step_delta > 0.0 && self.step_delta.is_finite()) {
            return fail("step_delta must be positive");
        }
        if self.sample_stride == 0 {
            return fail("sample_stride must be at least 1");
        }
        if !(self.ring_width >= 0.0) || !self.ring_radius.is_finite() {
            return fail("ring_width must be non-negative and ring_radius finite");
        }
        if !self.ring_strength.is_finite() {
            return fail("ring_strength must be finite");
        }
        if !(0.0..=1.0).contains(&self.audio_threshold) {
            return fail("audio_threshold must be in [0, 1]");
        }
        if self.probe_clear_count == 0 {
            return fail("probe_clear_count must be at least 1");
        }
        if !(self.probe_max_ms_per_clear > 0.0) {
            return fail("probe_max_ms_per_clear must be positive");
        }
        Ok(())
    }

    /// Current values as a JSON object.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Type, default, range and description of every parameter.
    pub fn schema() -> Value {
        json!({
            "low_fps_threshold": {
                "type": "number", "default": DEFAULT_LOW_FPS_THRESHOLD, "min": 1.0, "max": 240.0,
                "description": "FPS below which resolution drops; a full window below it disables the effect"
            },
            "high_fps_threshold": {
                "type": "number", "default": DEFAULT_HIGH_FPS_THRESHOLD, "min": 1.0, "max": 240.0,
                "description": "FPS above which resolution recovers"
            },
            "min_resolution_scale": {
                "type": "number", "default": DEFAULT_MIN_RESOLUTION_SCALE, "min": 0.05, "max": 1.0,
                "description": "Lowest resolution scale the governor may choose"
            },
            "resolution_step": {
                "type": "number", "default": DEFAULT_RESOLUTION_STEP, "min": 0.01, "max": 0.5,
                "description": "Resolution scale change per adjustment"
            },
            "rolling_window_size": {
                "type": "integer", "default": DEFAULT_ROLLING_WINDOW_SIZE, "min": 1, "max": 240,
                "description": "Number of frames averaged before the governor may disable the effect"
            },
            "hysteresis_frames": {
                "type": "integer", "default": DEFAULT_HYSTERESIS_FRAMES, "min": 1, "max": 60,
                "description": "Consecutive breaching frames before the resolution scale moves"
            },
            "ring_radius": {
                "type": "number", "default": DEFAULT_RING_RADIUS, "min": 0.0, "max": 200.0,
                "description": "Outer radius of a pointer ring in viewport pixels"
            },
            "ring_width": {
                "type": "number", "default": DEFAULT_RING_WIDTH, "min": 0.0, "max": 100.0,
                "description": "Width of a pointer ring in viewport pixels"
            },
            "ring_strength": {
                "type": "number", "default": DEFAULT_RING_STRENGTH, "min": 0.0, "max": 5.0,
                "description": "Force injected at full ring weight"
            },
            "decay_factor": {
                "type": "number", "default": DEFAULT_DECAY_FACTOR, "min": 0.5, "max": 0.9999,
                "description": "Per-step multiplicative decay of force"
            },
            "damping_factor": {
                "type": "number", "default": DEFAULT_DAMPING_FACTOR, "min": 0.5, "max": 0.9999,
                "description": "Per-step multiplicative damping of velocity"
            },
            "restoring_factor": {
                "type": "number", "default": DEFAULT_RESTORING_FACTOR, "min": 0.0, "max": 0.1,
                "description": "Pull of velocity towards rest, scaled by step_delta"
            },
            "step_delta": {
                "type": "number", "default": DEFAULT_STEP_DELTA, "min": 0.1, "max": 1.4,
                "description": "Integration step size"
            },
            "sample_stride": {
                "type": "integer", "default": DEFAULT_SAMPLE_STRIDE, "min": 1, "max": 16,
                "description": "Neighbour sampling stride in cells"
            },
            "audio_reactive": {
                "type": "boolean", "default": true,
                "description": "Whether audio levels may inject rings"
            },
            "audio_threshold": {
                "type": "number", "default": DEFAULT_AUDIO_THRESHOLD, "min": 0.0, "max": 1.0,
                "description": "Bass intensity above which an audio ring fires"
            },
            "probe_clear_count": {
                "type": "integer", "default": DEFAULT_PROBE_CLEAR_COUNT, "min": 1, "max": 1000,
                "description": "Clears timed by the startup capability probe"
            },
            "probe_max_ms_per_clear": {
                "type": "number", "default": DEFAULT_PROBE_MAX_MS_PER_CLEAR, "min": 0.01, "max": 100.0,
                "description": "Average clear latency above which the effect starts disabled"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_constants() {
        let c = RippleConfig::default();
        assert_eq!(c.low_fps_threshold, 30.0);
        assert_eq!(c.high_fps_threshold, 45.0);
        assert_eq!(c.min_resolution_scale, 0.5);
        assert_eq!(c.rolling_window_size, 10);
        assert_eq!(c.ring_width, 4.0);
        assert_eq!(c.ring_strength, 0.7);
        assert_eq!(c.decay_factor, 0.98);
        assert!((c.step_delta - 1.21).abs() < f64::EPSILON);
        assert!((c.damping_factor - 0.99516).abs() < 1e-12);
        assert_eq!(c.sample_stride, 5);
    }

    #[test]
    fn default_config_validates() {
        assert!(RippleConfig::default().validate().is_ok());
    }

    #[test]
    fn from_json_uses_defaults_for_empty_object() {
        assert_eq!(RippleConfig::from_json(&json!({})), RippleConfig::default());
    }

    #[test]
    fn apply_json_overrides_only_given_keys() {
        let mut c = RippleConfig::default();
        c.apply_json(&json!({"ring_width": 6, "sample_stride": 1, "audio_reactive": false}));
        assert_eq!(c.ring_width, 6.0);
        assert_eq!(c.sample_stride, 1);
        assert!(!c.audio_reactive);
        assert_eq!(c.ring_strength, 0.7);
    }

    #[test]
    fn serde_fills_missing_fields_with_defaults() {
        let c: RippleConfig = serde_json::from_str(r#"{"decay_factor": 0.9}"#).unwrap();
        assert_eq!(c.decay_factor, 0.9);
        assert_eq!(c.rolling_window_size, 10);
    }

    #[test]
    fn to_json_round_trips_through_serde() {
        let c = RippleConfig {
            ring_radius: 22.0,
            ..RippleConfig::default()
        };
        let back: RippleConfig = serde_json::from_value(c.to_json()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn check_json_rejects_unknown_key() {
        let err = RippleConfig::check_json(&json!({"ring_colour": 1})).unwrap_err();
        assert!(matches!(err, EngineError::ParamNotFound(name) if name == "ring_colour"));
    }

    #[test]
    fn check_json_rejects_wrong_type() {
        let err = RippleConfig::check_json(&json!({"sample_stride": 2.5})).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ParamTypeMismatch { ref name, ref got, .. }
                if name == "sample_stride" && got == "number"
        ));
        assert!(RippleConfig::check_json(&json!("nope")).is_err());
    }

    #[test]
    fn check_json_accepts_known_keys() {
        let params = json!({"decay_factor": 0.95, "hysteresis_frames": 2, "audio_reactive": true});
        assert!(RippleConfig::check_json(&params).is_ok());
    }

    #[test]
    fn validate_rejects_decay_of_one() {
        let c = RippleConfig {
            decay_factor: 1.0,
            ..RippleConfig::default()
        };
        assert!(matches!(c.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn validate_rejects_inverted_thresholds() {
        let c = RippleConfig {
            low_fps_threshold: 50.0,
            high_fps_threshold: 40.0,
            ..RippleConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_window_and_stride() {
        let c = RippleConfig {
            rolling_window_size: 0,
            ..RippleConfig::default()
        };
        assert!(c.validate().is_err());
        let c = RippleConfig {
            sample_stride: 0,
            ..RippleConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_nan_threshold() {
        let c = RippleConfig {
            low_fps_threshold: f64::NAN,
            ..RippleConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn schema_covers_every_serialized_field() {
        let schema = RippleConfig::schema();
        let values = RippleConfig::default().to_json();
        for key in values.as_object().unwrap().keys() {
            let entry = schema.get(key);
            assert!(entry.is_some(), "schema missing parameter: {key}");
            assert!(entry.unwrap().get("description").is_some(), "{key} missing description");
        }
    }

    #[test]
    fn schema_keys_are_all_checkable() {
        let schema = RippleConfig::schema();
        let defaults = RippleConfig::default().to_json();
        for key in schema.as_object().unwrap().keys() {
            let mut sample = serde_json::Map::new();
            sample.insert(key.clone(), defaults[key].clone());
            let sample = Value::Object(sample);
            assert!(RippleConfig::check_json(&sample).is_ok(), "{key} failed check");
        }
    }
}
