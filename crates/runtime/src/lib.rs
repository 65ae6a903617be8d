#![deny(unsafe_code)]
//! Host-side runtime for the ripple surface.
//!
//! This crate sits between `ripple-core` (the `Engine` trait and shared
//! types) and the hosts (CLI, WASM). It owns everything that is not the
//! per-cell rule: the [`QualityGovernor`] and its capability probe, pointer
//! and audio [`InputState`], the frame-driven [`RippleController`], and CPU
//! presentation (pixel conversion, static fallback, PNG snapshots).

pub mod controller;
pub mod fallback;
pub mod governor;
pub mod input;
pub mod pixel;
pub mod probe;

#[cfg(feature = "png")]
pub mod snapshot;

pub use controller::{grid_dims, RippleController, SimulationState, TickOutcome};
pub use fallback::{BackdropParams, StaticBackdrop};
pub use governor::{
    DisableReason, GovernorDecision, GovernorState, PerformanceWindow, QualityGovernor,
};
pub use input::{bass_intensity, InputState, AUDIO_BASS_BINS};
pub use pixel::{field_frame, field_to_rgba, Frame};
pub use probe::{run_probe, CapabilityProbe, ProbeOutcome, SimulatedProbe};
