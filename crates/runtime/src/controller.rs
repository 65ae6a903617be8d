//! Frame-driven lifecycle around one [`Engine`].
//!
//! The host calls [`RippleController::init`] once with an engine and a
//! governor built from the capability probe, then [`RippleController::tick`]
//! from its frame driver until the controller stops running. Input handlers
//! only record state; each tick turns it into that step's excitations.

use crate::governor::{DisableReason, GovernorDecision, QualityGovernor};
use crate::input::InputState;
use glam::DVec2;
use ripple_core::config::RippleConfig;
use ripple_core::error::EngineError;
use ripple_core::excitation::Excitation;
use ripple_core::theme::Theme;
use ripple_core::Engine;
use tracing::{debug, trace, warn};

/// Grid dimensions for a viewport at `scale`, never below 1×1.
pub fn grid_dims(viewport: (usize, usize), scale: f64) -> (usize, usize) {
    let dim = |v: usize| ((v as f64 * scale).round() as usize).max(1);
    (dim(viewport.0), dim(viewport.1))
}

/// What a single [`RippleController::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The engine advanced one step. `rescaled` carries a new resolution scale
    /// when the grid was reallocated first.
    Stepped { rescaled: Option<f64> },
    /// The governor disabled the simulation this tick; show the fallback.
    Disabled,
    /// Not running (never initialised, already disabled, or disposed).
    Stopped,
}

/// Everything owned between `init` and `dispose`.
#[derive(Debug)]
pub struct SimulationState<E> {
    engine: Option<E>,
    governor: QualityGovernor,
    input: InputState,
    viewport: (usize, usize),
    frames: u64,
}

impl<E: Engine> SimulationState<E> {
    fn release_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.release();
            debug!(frames = self.frames, "ripple controller: engine released");
        }
    }
}

/// Owns the simulation state and drives it one tick at a time.
#[derive(Debug)]
pub struct RippleController<E> {
    state: Option<SimulationState<E>>,
    config: RippleConfig,
    theme: Theme,
    running: bool,
}

impl<E: Engine> RippleController<E> {
    /// Creates an idle controller. Fails if `config` does not validate.
    pub fn new(config: RippleConfig, theme: Theme) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            state: None,
            config,
            theme,
            running: false,
        })
    }

    /// Takes ownership of `engine` and sizes it for the viewport.
    ///
    /// A governor that is already Disabled (failed probe) releases the engine
    /// straight away and leaves the controller stopped. So does a failed
    /// initial resize, which disables with [`DisableReason::EngineFault`].
    pub fn init(
        &mut self,
        engine: E,
        viewport_width: usize,
        viewport_height: usize,
        governor: QualityGovernor,
    ) {
        self.dispose();
        let viewport = (viewport_width.max(1), viewport_height.max(1));
        let mut state = SimulationState {
            engine: Some(engine),
            governor,
            input: InputState::new(),
            viewport,
            frames: 0,
        };

        if state.governor.is_disabled() {
            state.release_engine();
            self.state = Some(state);
            return;
        }

        let (w, h) = grid_dims(viewport, state.governor.resolution_scale());
        let resized = state.engine.as_mut().map_or(Ok(()), |e| e.resize(w, h));
        self.running = true;
        if let Err(err) = resized {
            fault(&mut state, &mut self.running, &err);
        } else {
            debug!(width = w, height = h, "ripple controller: initialised");
        }
        self.state = Some(state);
    }

    /// Enters the stopped state without an engine, e.g. when the backend
    /// could not be built. The governor is disabled with
    /// [`DisableReason::CapabilityUnavailable`] unless it already carries a
    /// reason.
    pub fn start_disabled(
        &mut self,
        viewport_width: usize,
        viewport_height: usize,
        mut governor: QualityGovernor,
    ) {
        self.dispose();
        governor.disable(DisableReason::CapabilityUnavailable);
        self.state = Some(SimulationState {
            engine: None,
            governor,
            input: InputState::new(),
            viewport: (viewport_width.max(1), viewport_height.max(1)),
            frames: 0,
        });
    }

    /// Advances one frame that took `delta_ms` milliseconds.
    ///
    /// Engine failures never escape: they disable the governor and release
    /// the engine, and the host shows the fallback from then on.
    pub fn tick(&mut self, delta_ms: f64) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }
        let Some(state) = self.state.as_mut() else {
            self.running = false;
            return TickOutcome::Stopped;
        };

        let mut rescaled = None;
        match state.governor.observe_frame(delta_ms) {
            GovernorDecision::Hold => {}
            GovernorDecision::Disable => {
                state.release_engine();
                self.running = false;
                return TickOutcome::Disabled;
            }
            GovernorDecision::Rescale(scale) => {
                let (w, h) = grid_dims(state.viewport, scale);
                if let Some(engine) = state.engine.as_mut() {
                    if let Err(err) = engine.resize(w, h) {
                        return fault(state, &mut self.running, &err);
                    }
                }
                rescaled = Some(scale);
            }
        }

        let excitations = excitations(&self.config, state);
        let Some(engine) = state.engine.as_mut() else {
            self.running = false;
            return TickOutcome::Stopped;
        };
        if let Err(err) = engine.step(&excitations) {
            return fault(state, &mut self.running, &err);
        }
        state.frames += 1;
        trace!(
            frames = state.frames,
            rings = excitations.len(),
            "ripple controller: stepped"
        );
        TickOutcome::Stepped { rescaled }
    }

    /// Records a new viewport size and reallocates the grid to match.
    ///
    /// A failed reallocation is an engine fault: the governor disables and
    /// the engine is released.
    pub fn resize(&mut self, viewport_width: usize, viewport_height: usize) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.viewport = (viewport_width.max(1), viewport_height.max(1));
        let (w, h) = grid_dims(state.viewport, state.governor.resolution_scale());
        if let Some(engine) = state.engine.as_mut() {
            if let Err(err) = engine.resize(w, h) {
                fault(state, &mut self.running, &err);
            }
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let Some(state) = self.state.as_mut() {
            state.input.pointer_move(x, y);
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if let Some(state) = self.state.as_mut() {
            state.input.pointer_down(x, y);
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.input.pointer_up();
        }
    }

    /// Records the bass level of an analyser spectrum.
    pub fn audio_spectrum(&mut self, spectrum: &[u8]) {
        if let Some(state) = self.state.as_mut() {
            state.input.set_audio_spectrum(spectrum);
        }
    }

    /// Forgets audio input, e.g. after capture permission is denied.
    pub fn clear_audio(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.input.clear_audio();
        }
    }

    /// Stops ticking and releases the engine. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(mut state) = self.state.take() {
            state.release_engine();
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True once the governor has disabled the simulation.
    pub fn is_disabled(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.governor.is_disabled())
    }

    pub fn governor(&self) -> Option<&QualityGovernor> {
        self.state.as_ref().map(|s| &s.governor)
    }

    /// The live engine; `None` before `init`, after `dispose`, or once disabled.
    pub fn engine(&self) -> Option<&E> {
        self.state.as_ref().and_then(|s| s.engine.as_ref())
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.state.as_mut().and_then(|s| s.engine.as_mut())
    }

    /// Frames stepped since `init`.
    pub fn frames(&self) -> u64 {
        self.state.as_ref().map_or(0, |s| s.frames)
    }

    pub fn config(&self) -> &RippleConfig {
        &self.config
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Changes the theme here and on the live engine.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Some(engine) = self.engine_mut() {
            engine.set_theme(theme);
        }
    }
}

fn fault<E: Engine>(
    state: &mut SimulationState<E>,
    running: &mut bool,
    err: &EngineError,
) -> TickOutcome {
    warn!(error = %err, "ripple controller: engine fault");
    state.governor.disable(DisableReason::EngineFault);
    state.release_engine();
    *running = false;
    TickOutcome::Disabled
}

/// Rings for this step: the armed pointer, then audio when above threshold.
fn excitations<E>(config: &RippleConfig, state: &SimulationState<E>) -> Vec<Excitation> {
    let scale = state.governor.resolution_scale();
    let mut rings = Vec::with_capacity(2);
    if state.input.is_armed() {
        if let Some(p) = state.input.pointer() {
            rings.push(Excitation::ring(
                p * scale,
                config.ring_radius * scale,
                config.ring_width * scale,
                config.ring_strength,
            ));
        }
    }
    if config.audio_reactive {
        if let Some(level) = state.input.audio_level() {
            if level > config.audio_threshold {
                let (w, h) = grid_dims(state.viewport, scale);
                rings.push(Excitation::ring(
                    DVec2::new(w as f64, h as f64) * 0.5,
                    config.ring_radius * scale,
                    config.ring_width * scale,
                    config.ring_strength * level,
                ));
            }
        }
    }
    rings
}
