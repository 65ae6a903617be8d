//! The `Engine` trait shared by the CPU and GPU ripple backends.
//!
//! An engine owns a double-buffered wave field and advances it one step at a
//! time. Presentation is not part of the trait: CPU hosts read the grid via
//! [`Engine::field`] and shade it themselves, GPU backends draw their own
//! targets. The trait is object-safe.

use crate::error::EngineError;
use crate::excitation::Excitation;
use crate::field::FieldGrid;
use crate::theme::Theme;
use serde_json::Value;

/// A steppable wave-field simulation.
pub trait Engine {
    /// Advances the field one step, injecting every excitation in `excitations`.
    ///
    /// The step reads the current buffer, writes the next buffer and then
    /// swaps them, so after `Ok(())` the new state is current.
    fn step(&mut self, excitations: &[Excitation]) -> Result<(), EngineError>;

    /// Reallocates the field at `width × height` cells and resets it to rest.
    ///
    /// Zero dimensions are clamped to 1.
    fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError>;

    /// Current field dimensions in cells.
    fn dimensions(&self) -> (usize, usize);

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing every parameter: type, range and default.
    fn param_schema(&self) -> Value;

    /// The CPU-side field, for backends that keep one.
    ///
    /// Returns `None` by default; GPU backends keep their state in textures.
    fn field(&self) -> Option<&FieldGrid> {
        None
    }

    /// Switches the theme used by backends that shade their own output.
    /// CPU backends are shaded by the host and ignore it.
    fn set_theme(&mut self, _theme: Theme) {}

    /// Releases backend resources. Called once on teardown; the engine must
    /// not be stepped afterwards.
    fn release(&mut self) {}
}
