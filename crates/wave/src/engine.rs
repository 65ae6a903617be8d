//! CPU implementation of the ripple [`Engine`].

use crate::stepper::{WaveParams, WaveStepper};
use ripple_core::config::RippleConfig;
use ripple_core::error::EngineError;
use ripple_core::excitation::Excitation;
use ripple_core::field::FieldGrid;
use ripple_core::Engine;
use serde_json::Value;

/// Wave simulation over a CPU [`FieldGrid`].
///
/// Each `step` runs the [`WaveStepper`] from `current` into `next` and then
/// swaps, so the new state is always `current` between steps.
#[derive(Debug, Clone)]
pub struct WaveEngine {
    grid: FieldGrid,
    stepper: WaveStepper,
    config: RippleConfig,
    steps: u64,
}

impl WaveEngine {
    /// Creates an engine at rest. Zero dimensions are clamped to 1.
    ///
    /// Returns `EngineError::InvalidConfig` if `config` does not validate.
    pub fn new(width: usize, height: usize, config: RippleConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            grid: FieldGrid::new(width, height)?,
            stepper: WaveStepper::new(WaveParams::from_config(&config)),
            config,
            steps: 0,
        })
    }

    /// Creates an engine from a JSON params object layered over the defaults.
    pub fn from_json(width: usize, height: usize, params: &Value) -> Result<Self, EngineError> {
        Self::new(width, height, RippleConfig::from_json(params))
    }

    pub fn grid(&self) -> &FieldGrid {
        &self.grid
    }

    /// Mutable grid access for seeding initial conditions.
    pub fn grid_mut(&mut self) -> &mut FieldGrid {
        &mut self.grid
    }

    pub fn config(&self) -> &RippleConfig {
        &self.config
    }

    /// Steps taken since creation or the last resize.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Engine for WaveEngine {
    fn step(&mut self, excitations: &[Excitation]) -> Result<(), EngineError> {
        self.stepper.step(&mut self.grid, excitations)?;
        self.grid.swap();
        self.steps += 1;
        Ok(())
    }

    fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        self.grid.resize(width, height)?;
        self.steps = 0;
        Ok(())
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.grid.width(), self.grid.height())
    }

    fn params(&self) -> Value {
        self.config.to_json()
    }

    fn param_schema(&self) -> Value {
        RippleConfig::schema()
    }

    fn field(&self) -> Option<&FieldGrid> {
        Some(&self.grid)
    }

    fn release(&mut self) {
        // Drop both buffers down to a single resting cell.
        if self.grid.resize(1, 1).is_ok() {
            self.steps = 0;
        }
    }
}
