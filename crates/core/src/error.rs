//! Error types for the ripple core.

use thiserror::Error;

/// Errors produced by engine, grid and configuration operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero where a non-empty grid is required,
    /// or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A requested parameter name was not found in the params object.
    #[error("parameter not found: {0}")]
    ParamNotFound(String),

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// An (x, y) coordinate was outside the grid bounds.
    #[error("index ({x}, {y}) out of bounds for grid of size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Two buffers had incompatible dimensions.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A theme name did not match any known theme.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// A configuration value was outside its accepted range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The graphics context (or a required extension) is unavailable.
    #[error("capability unavailable: {0}")]
    Capability(String),

    /// A GPU resource could not be created or used.
    #[error("render error: {0}")]
    Render(String),

    /// Writing an output file failed.
    #[error("io error: {0}")]
    Io(String),
}
