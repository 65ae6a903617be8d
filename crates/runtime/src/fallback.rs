//! Static backdrop shown while the simulation is Disabled.
//!
//! A frozen ripple pattern: concentric bands around the image centre whose
//! phase is warped by multi-octave Perlin turbulence, shaded through the same
//! theme as the live field. Generated once; identical for identical seeds.

use crate::pixel::{forces_to_rgba, Frame};
use noise::{NoiseFn, Perlin};
use ripple_core::error::EngineError;
use ripple_core::theme::Theme;
use std::f64::consts::TAU;

/// Parameters of the backdrop pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropParams {
    /// Noise coordinates per pixel at the first octave.
    pub scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Ripple bands per half-diagonal.
    pub bands: f64,
    /// How far (in bands) turbulence may shift a band.
    pub warp: f64,
    /// Peak force of a band before shading.
    pub amplitude: f64,
}

impl Default for BackdropParams {
    fn default() -> Self {
        Self {
            scale: 0.01,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            bands: 6.0,
            warp: 0.6,
            amplitude: 0.8,
        }
    }
}

/// Deterministic noise-warped ripple backdrop.
#[derive(Debug, Clone)]
pub struct StaticBackdrop {
    noise: Perlin,
    seed: u32,
    params: BackdropParams,
}

impl StaticBackdrop {
    pub fn new(seed: u32) -> Self {
        Self::with_params(seed, BackdropParams::default())
    }

    pub fn with_params(seed: u32, params: BackdropParams) -> Self {
        Self {
            noise: Perlin::new(seed),
            seed,
            params,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn params(&self) -> &BackdropParams {
        &self.params
    }

    fn turbulence(&self, x: f64, y: f64) -> f64 {
        let p = &self.params;
        let (total, _, _) = (0..p.octaves).fold((0.0, 1.0, 1.0), |(sum, amp, freq), _| {
            let sx = x * p.scale * freq;
            let sy = y * p.scale * freq;
            (
                sum + self.noise.get([sx, sy]) * amp,
                amp * p.persistence,
                freq * p.lacunarity,
            )
        });
        total
    }

    /// Backdrop force at pixel `(x, y)` of a `width × height` image.
    pub fn force_at(&self, x: usize, y: usize, width: usize, height: usize) -> f64 {
        let p = &self.params;
        let cx = width as f64 * 0.5;
        let cy = height as f64 * 0.5;
        let px = x as f64 + 0.5;
        let py = y as f64 + 0.5;
        let half_diag = cx.hypot(cy).max(1.0);
        let dist = (px - cx).hypot(py - cy) / half_diag;
        let phase = dist * p.bands + self.turbulence(px, py) * p.warp;
        let force = (phase * TAU).sin() * p.amplitude;
        if force.is_finite() {
            force
        } else {
            0.0
        }
    }

    /// Renders the backdrop at `width × height`, shaded with `theme`.
    pub fn render(&self, width: usize, height: usize, theme: Theme) -> Result<Frame, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let forces = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| self.force_at(x, y, width, height));
        Frame::new(width, height, forces_to_rgba(forces, theme))
    }
}
