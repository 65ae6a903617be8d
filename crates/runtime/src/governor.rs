//! Adaptive quality governor.
//!
//! Watches per-frame FPS and trades resolution for frame time. Two states:
//!
//! - **Active**: each frame's FPS enters a rolling window. Once the window is
//!   full and its mean drops below `low_fps_threshold`, the governor disables
//!   the simulation. Otherwise the resolution scale moves by
//!   `resolution_step` after `hysteresis_frames` consecutive frames below
//!   `low_fps_threshold` (down) or above `high_fps_threshold` (up), clamped to
//!   `[min_resolution_scale, 1.0]`.
//! - **Disabled**: terminal; every later frame is a [`GovernorDecision::Hold`].
//!
//! The streak requirement keeps a trace that alternates across the band from
//! moving the scale at all.

use crate::probe::ProbeOutcome;
use ripple_core::config::RippleConfig;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Scale changes smaller than this are treated as no change.
const SCALE_EPSILON: f64 = 1e-9;

/// Fixed-capacity FIFO of FPS samples.
#[derive(Debug, Clone)]
pub struct PerformanceWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl PerformanceWindow {
    /// Creates an empty window. A zero capacity is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, returning the evicted oldest one when full.
    pub fn push(&mut self, fps: f64) -> Option<f64> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(fps);
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Mean of the held samples, `None` when empty.
    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Lifecycle state of the governor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernorState {
    Active,
    Disabled,
}

/// Why the simulation was disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableReason {
    /// No graphics context could be acquired.
    CapabilityUnavailable,
    /// The startup clear benchmark was over budget.
    ProbeTooSlow,
    /// The rolling FPS average fell below the low threshold.
    SustainedLowFps,
    /// The engine failed to step or reallocate.
    EngineFault,
}

impl DisableReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DisableReason::CapabilityUnavailable => "capability-unavailable",
            DisableReason::ProbeTooSlow => "probe-too-slow",
            DisableReason::SustainedLowFps => "sustained-low-fps",
            DisableReason::EngineFault => "engine-fault",
        }
    }
}

/// Outcome of one observed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GovernorDecision {
    /// Nothing changes.
    Hold,
    /// The resolution scale moved to the given value; reallocate the field.
    Rescale(f64),
    /// The governor just became Disabled.
    Disable,
}

/// Resolution and lifecycle governor driven by frame timings.
#[derive(Debug, Clone)]
pub struct QualityGovernor {
    low_fps: f64,
    high_fps: f64,
    min_scale: f64,
    step: f64,
    hysteresis: usize,
    state: GovernorState,
    reason: Option<DisableReason>,
    scale: f64,
    window: PerformanceWindow,
    low_streak: usize,
    high_streak: usize,
    frames: u64,
}

impl QualityGovernor {
    /// An Active governor at full resolution.
    pub fn new(config: &RippleConfig) -> Self {
        Self {
            low_fps: config.low_fps_threshold,
            high_fps: config.high_fps_threshold,
            min_scale: config.min_resolution_scale.clamp(f64::MIN_POSITIVE, 1.0),
            step: config.resolution_step,
            hysteresis: config.hysteresis_frames.max(1),
            state: GovernorState::Active,
            reason: None,
            scale: 1.0,
            window: PerformanceWindow::new(config.rolling_window_size),
            low_streak: 0,
            high_streak: 0,
            frames: 0,
        }
    }

    /// A governor that starts Disabled.
    pub fn disabled(config: &RippleConfig, reason: DisableReason) -> Self {
        let mut governor = Self::new(config);
        governor.disable(reason);
        governor
    }

    /// Active when the probe passed, Disabled with the matching reason otherwise.
    pub fn from_probe(config: &RippleConfig, outcome: ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Capable { .. } => Self::new(config),
            ProbeOutcome::Unavailable => Self::disabled(config, DisableReason::CapabilityUnavailable),
            ProbeOutcome::TooSlow { .. } => Self::disabled(config, DisableReason::ProbeTooSlow),
        }
    }

    pub fn state(&self) -> GovernorState {
        self.state
    }

    pub fn is_disabled(&self) -> bool {
        self.state == GovernorState::Disabled
    }

    pub fn disable_reason(&self) -> Option<DisableReason> {
        self.reason
    }

    /// Current resolution scale in `[min_resolution_scale, 1.0]`.
    pub fn resolution_scale(&self) -> f64 {
        self.scale
    }

    pub fn window(&self) -> &PerformanceWindow {
        &self.window
    }

    /// Frames observed while Active.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Forces the Disabled state. Has no effect once disabled.
    pub fn disable(&mut self, reason: DisableReason) {
        if self.is_disabled() {
            return;
        }
        self.state = GovernorState::Disabled;
        self.reason = Some(reason);
        warn!(reason = reason.as_str(), frames = self.frames, "quality governor: disabled");
    }

    /// Observes a frame that took `delta_ms` milliseconds.
    ///
    /// Non-positive and non-finite deltas carry no timing and are ignored.
    pub fn observe_frame(&mut self, delta_ms: f64) -> GovernorDecision {
        if !(delta_ms.is_finite() && delta_ms > 0.0) {
            trace!(delta_ms, "quality governor: ignoring frame delta");
            return GovernorDecision::Hold;
        }
        self.observe_fps(1000.0 / delta_ms)
    }

    /// Observes one instantaneous FPS sample.
    pub fn observe_fps(&mut self, fps: f64) -> GovernorDecision {
        if self.is_disabled() || !(fps.is_finite() && fps > 0.0) {
            return GovernorDecision::Hold;
        }
        self.frames += 1;
        self.window.push(fps);

        if self.window.is_full() {
            if let Some(avg) = self.window.average() {
                if avg < self.low_fps {
                    self.disable(DisableReason::SustainedLowFps);
                    return GovernorDecision::Disable;
                }
            }
        }

        if fps < self.low_fps {
            self.low_streak += 1;
            self.high_streak = 0;
        } else if fps > self.high_fps {
            self.high_streak += 1;
            self.low_streak = 0;
        } else {
            self.low_streak = 0;
            self.high_streak = 0;
        }

        if self.low_streak >= self.hysteresis {
            self.low_streak = 0;
            let target = (self.scale - self.step).max(self.min_scale);
            if self.scale - target > SCALE_EPSILON {
                self.scale = target;
                warn!(
                    scale = self.scale,
                    fps,
                    "quality governor: lowering resolution"
                );
                return GovernorDecision::Rescale(self.scale);
            }
        } else if self.high_streak >= self.hysteresis {
            self.high_streak = 0;
            let target = (self.scale + self.step).min(1.0);
            if target - self.scale > SCALE_EPSILON {
                self.scale = target;
                debug!(
                    scale = self.scale,
                    fps,
                    "quality governor: raising resolution"
                );
                return GovernorDecision::Rescale(self.scale);
            }
        }
        GovernorDecision::Hold
    }
}
