#![deny(unsafe_code)]
//! Core types and traits for the ripple wave simulation.
//!
//! Provides the `Engine` trait, the double-buffered `FieldGrid` of wave
//! `Cell`s, ring `Excitation`s, `RippleConfig`, the closed `Theme` set with
//! its shading, `Srgb`, the `Xorshift64` PRNG and parameter helpers. The
//! `render` feature adds the WebGL2 backend.

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod excitation;
pub mod field;
pub mod params;
pub mod ping_pong;
pub mod prng;
pub mod theme;

#[cfg(feature = "render")]
pub mod render;

pub use color::Srgb;
pub use config::RippleConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use excitation::{smoothstep, Excitation};
pub use field::{Cell, FieldGrid};
pub use ping_pong::PingPong;
pub use prng::Xorshift64;
pub use theme::{Theme, ThemeColors};
