//! WebGL2 ripple backend (`render` feature).
//!
//! - [`gl`] -- program compilation and RGBA16F render targets.
//! - [`shaders`] -- fullscreen vertex, simulation and display GLSL.
//! - [`context`] -- context wrapper, extension check and the probe's clear.
//! - [`ripple`] -- [`GpuRipple`], the GPU `Engine` implementation.

pub mod context;
pub mod gl;
pub mod ripple;
pub mod shaders;

pub use context::GpuContext;
pub use gl::{compile_program, format_shader_error, RenderTarget, ShaderError};
pub use ripple::{pack_rings, GpuRipple};
pub use shaders::MAX_RINGS;
