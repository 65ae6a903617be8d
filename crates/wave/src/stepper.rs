//! The per-cell wave update rule.
//!
//! Each step, for every cell with `force = f` and `velocity = v`, and the
//! `force` of the four axis neighbours `l, r, u, d` sampled `stride` cells away:
//!
//! ```text
//! v += delta * (-2f + r + l) / 4 + delta * (-2f + u + d) / 4
//! f += delta * v
//! v -= restoring * delta * f
//! v *= damping
//! f *= decay
//! gradient = ((r - l) / 2, (u - d) / 2)
//! f += Σ ring_weight(dist) * strength      (one term per excitation)
//! ```
//!
//! A neighbour past the grid edge takes the value of the opposite neighbour.
//! When both are outside (the grid is narrower than the stride) both take the
//! cell's own `force`, so that axis contributes no diffusion. `u` is the
//! neighbour towards row 0.

use glam::DVec2;
use ripple_core::config::RippleConfig;
use ripple_core::error::EngineError;
use ripple_core::excitation::Excitation;
use ripple_core::field::{Cell, FieldGrid};
use serde_json::{json, Value};

/// Constants of the update rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    pub step_delta: f64,
    pub restoring_factor: f64,
    pub damping_factor: f64,
    pub decay_factor: f64,
    pub sample_stride: usize,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self::from_config(&RippleConfig::default())
    }
}

impl WaveParams {
    /// The stepper-relevant subset of a config.
    pub fn from_config(config: &RippleConfig) -> Self {
        Self {
            step_delta: config.step_delta,
            restoring_factor: config.restoring_factor,
            damping_factor: config.damping_factor,
            decay_factor: config.decay_factor,
            sample_stride: config.sample_stride,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "step_delta": self.step_delta,
            "restoring_factor": self.restoring_factor,
            "damping_factor": self.damping_factor,
            "decay_factor": self.decay_factor,
            "sample_stride": self.sample_stride,
        })
    }
}

/// Applies the wave rule from one buffer into another.
///
/// The stepper never swaps: after [`WaveStepper::step`] the new state sits
/// in the grid's `next` buffer and the caller decides when to expose it.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveStepper {
    params: WaveParams,
}

impl WaveStepper {
    pub fn new(params: WaveParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    pub fn set_params(&mut self, params: WaveParams) {
        self.params = params;
    }

    /// Reads `grid.current()`, writes `grid.next()`. Does not swap.
    pub fn step(&self, grid: &mut FieldGrid, excitations: &[Excitation]) -> Result<(), EngineError> {
        let (width, height) = (grid.width(), grid.height());
        let (current, next) = grid.split_mut();
        self.step_buffers(current, next, width, height, excitations)
    }

    /// Steps raw row-major buffers of `width × height` cells.
    ///
    /// Returns `EngineError::DimensionMismatch` when either buffer has the
    /// wrong length.
    pub fn step_buffers(
        &self,
        current: &[Cell],
        next: &mut [Cell],
        width: usize,
        height: usize,
        excitations: &[Excitation],
    ) -> Result<(), EngineError> {
        let len = width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        for buffer_len in [current.len(), next.len()] {
            if buffer_len != len {
                return Err(EngineError::DimensionMismatch {
                    lhs_w: width,
                    lhs_h: height,
                    rhs_w: buffer_len,
                    rhs_h: 1,
                });
            }
        }

        let p = &self.params;
        let stride = p.sample_stride.max(1);
        let force = |x: usize, y: usize| current[y * width + x].force;
        let rings: Vec<(Excitation, (usize, usize, usize, usize))> = excitations
            .iter()
            .filter_map(|e| e.bounds(width, height).map(|b| (*e, b)))
            .collect();

        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                let here = current[idx];
                let f0 = here.force;
                let (l, r) = neighbour_pair(x, width, stride, f0, |nx| force(nx, y));
                let (u, d) = neighbour_pair(y, height, stride, f0, |ny| force(x, ny));

                let mut v = here.velocity;
                v += p.step_delta * (-2.0 * f0 + r + l) / 4.0
                    + p.step_delta * (-2.0 * f0 + u + d) / 4.0;
                let mut f = f0 + p.step_delta * v;
                v -= p.restoring_factor * p.step_delta * f;
                v *= p.damping_factor;
                f *= p.decay_factor;

                let centre = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                for (ring, (x0, y0, x1, y1)) in &rings {
                    if (*x0..*x1).contains(&x) && (*y0..*y1).contains(&y) {
                        f += ring.contribution(centre);
                    }
                }

                next[idx] = Cell {
                    force: finite_or_zero(f),
                    velocity: finite_or_zero(v),
                    gradient_x: finite_or_zero((r - l) / 2.0),
                    gradient_y: finite_or_zero((u - d) / 2.0),
                };
            }
        }
        Ok(())
    }
}

/// `(negative, positive)` neighbours along one axis with opposite-neighbour
/// substitution at the edges.
fn neighbour_pair(
    coord: usize,
    limit: usize,
    stride: usize,
    own: f64,
    sample: impl Fn(usize) -> f64,
) -> (f64, f64) {
    let neg = coord.checked_sub(stride).map(&sample);
    let pos = coord
        .checked_add(stride)
        .filter(|&p| p < limit)
        .map(&sample);
    match (neg, pos) {
        (Some(n), Some(p)) => (n, p),
        (None, Some(p)) => (p, p),
        (Some(n), None) => (n, n),
        (None, None) => (own, own),
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
