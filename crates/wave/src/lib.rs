#![deny(unsafe_code)]
//! CPU wave simulation for the ripple surface.
//!
//! [`WaveStepper`] holds the per-cell update rule: a damped, discretized 2D
//! wave equation over `force` and `velocity` with ring-shaped excitations and
//! reflective edges. [`WaveEngine`] wraps it with a double-buffered
//! [`FieldGrid`](ripple_core::FieldGrid) and implements the core `Engine` trait.

pub mod engine;
pub mod stepper;

pub use engine::WaveEngine;
pub use stepper::{WaveParams, WaveStepper};
