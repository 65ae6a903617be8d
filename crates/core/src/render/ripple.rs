//! GPU ripple backend: the wave rule as a fragment shader over two
//! ping-ponged float render targets.

use super::context::GpuContext;
use super::gl::{compile_program, RenderTarget};
use super::shaders::{
    DISPLAY_FRAGMENT_SHADER, FULLSCREEN_VERTEX_SHADER, MAX_RINGS, SIMULATION_FRAGMENT_SHADER,
};
use crate::config::RippleConfig;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::excitation::Excitation;
use crate::ping_pong::PingPong;
use crate::theme::Theme;
use serde_json::{json, Value};

/// Ring uniforms for one step: `(x, y, inner, outer)` quadruples, strengths,
/// and the ring count.
///
/// Positions are flipped to GL's bottom-left origin. Excitations past
/// [`MAX_RINGS`] are dropped.
pub fn pack_rings(
    excitations: &[Excitation],
    height: usize,
) -> ([f32; MAX_RINGS * 4], [f32; MAX_RINGS], usize) {
    let mut rings = [0.0_f32; MAX_RINGS * 4];
    let mut strengths = [0.0_f32; MAX_RINGS];
    let count = excitations.len().min(MAX_RINGS);
    for (i, e) in excitations.iter().take(count).enumerate() {
        rings[i * 4] = e.position.x as f32;
        rings[i * 4 + 1] = (height as f64 - e.position.y) as f32;
        rings[i * 4 + 2] = e.inner_radius as f32;
        rings[i * 4 + 3] = e.outer_radius as f32;
        strengths[i] = e.strength as f32;
    }
    (rings, strengths, count)
}

fn to_u32(v: usize) -> Result<u32, EngineError> {
    u32::try_from(v).map_err(|_| EngineError::InvalidDimensions)
}

/// Two targets at rest; the first is released if the second fails.
fn allocate_targets(
    gl: &glow::Context,
    width: usize,
    height: usize,
) -> Result<[RenderTarget; 2], EngineError> {
    let (w, h) = (to_u32(width)?, to_u32(height)?);
    let a = RenderTarget::new(gl, w, h)?;
    match RenderTarget::new(gl, w, h) {
        Ok(b) => Ok([a, b]),
        Err(e) => {
            a.destroy(gl);
            Err(e)
        }
    }
}

/// GPU-resident ripple simulation.
pub struct GpuRipple {
    ctx: GpuContext,
    simulation: glow::Program,
    display: glow::Program,
    vao: glow::VertexArray,
    targets: [RenderTarget; 2],
    roles: PingPong,
    width: usize,
    height: usize,
    config: RippleConfig,
    theme: Theme,
    released: bool,
}

impl GpuRipple {
    /// Compiles both programs and allocates two targets at `width × height`
    /// cells (zero clamped to 1).
    #[allow(unsafe_code)]
    pub fn new(
        ctx: GpuContext,
        width: usize,
        height: usize,
        config: RippleConfig,
        theme: Theme,
    ) -> Result<Self, EngineError> {
        use glow::HasContext;

        config.validate()?;
        let (width, height) = (width.max(1), height.max(1));
        let gl = ctx.gl();
        let simulation = compile_program(gl, FULLSCREEN_VERTEX_SHADER, SIMULATION_FRAGMENT_SHADER)?;
        let display = match compile_program(gl, FULLSCREEN_VERTEX_SHADER, DISPLAY_FRAGMENT_SHADER) {
            Ok(p) => p,
            Err(e) => {
                // SAFETY: `simulation` was linked above and is not used elsewhere.
                unsafe { gl.delete_program(simulation) };
                return Err(e.into());
            }
        };
        // SAFETY: creating an empty VAO for attribute-less draws.
        let vao = match unsafe { gl.create_vertex_array() } {
            Ok(vao) => vao,
            Err(e) => {
                // SAFETY: both programs are live and owned here.
                unsafe {
                    gl.delete_program(simulation);
                    gl.delete_program(display);
                }
                return Err(EngineError::Render(e));
            }
        };
        let targets = match allocate_targets(gl, width, height) {
            Ok(targets) => targets,
            Err(e) => {
                // SAFETY: programs and VAO are live and owned here.
                unsafe {
                    gl.delete_program(simulation);
                    gl.delete_program(display);
                    gl.delete_vertex_array(vao);
                }
                return Err(e);
            }
        };
        Ok(Self {
            ctx,
            simulation,
            display,
            vao,
            targets,
            roles: PingPong::new(),
            width,
            height,
            config,
            theme,
            released: false,
        })
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Shades the current state onto the default framebuffer.
    #[allow(unsafe_code)]
    pub fn present(&self, viewport_width: u32, viewport_height: u32) {
        use glow::HasContext;

        if self.released {
            return;
        }
        let gl = self.ctx.gl();
        let colors = self.theme.colors();
        let src = &self.targets[self.roles.src_index()];
        // SAFETY: every handle is live until `release`, checked above.
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.viewport(0, 0, viewport_width as i32, viewport_height as i32);
            gl.use_program(Some(self.display));
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(src.texture()));
            let loc = |name: &str| gl.get_uniform_location(self.display, name);
            gl.uniform_1_i32(loc("u_state").as_ref(), 0);
            gl.uniform_3_f32(
                loc("u_tint").as_ref(),
                colors.tint.r as f32,
                colors.tint.g as f32,
                colors.tint.b as f32,
            );
            gl.uniform_1_f32(loc("u_ambient").as_ref(), colors.ambient as f32);
            gl.uniform_1_f32(loc("u_bloom_reduction").as_ref(), colors.bloom_reduction as f32);
            gl.uniform_1_f32(loc("u_gamma").as_ref(), colors.gamma as f32);
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_arrays(glow::TRIANGLES, 0, 3);
            gl.bind_vertex_array(None);
        }
    }

    fn destroy_targets(&self) {
        let gl = self.ctx.gl();
        for target in &self.targets {
            target.destroy(gl);
        }
    }
}

impl Engine for GpuRipple {
    #[allow(unsafe_code)]
    fn step(&mut self, excitations: &[Excitation]) -> Result<(), EngineError> {
        use glow::HasContext;

        if self.released {
            return Err(EngineError::Render("stepped after release".into()));
        }
        let gl = self.ctx.gl();
        let cfg = &self.config;
        let (rings, strengths, count) = pack_rings(excitations, self.height);
        let src = &self.targets[self.roles.src_index()];
        let dst = &self.targets[self.roles.dst_index()];
        dst.bind(gl);
        // SAFETY: every handle is live until `release`, checked above.
        unsafe {
            gl.use_program(Some(self.simulation));
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(src.texture()));
            let loc = |name: &str| gl.get_uniform_location(self.simulation, name);
            gl.uniform_1_i32(loc("u_state").as_ref(), 0);
            gl.uniform_1_i32(loc("u_stride").as_ref(), cfg.sample_stride as i32);
            gl.uniform_1_f32(loc("u_delta").as_ref(), cfg.step_delta as f32);
            gl.uniform_1_f32(loc("u_restoring").as_ref(), cfg.restoring_factor as f32);
            gl.uniform_1_f32(loc("u_damping").as_ref(), cfg.damping_factor as f32);
            gl.uniform_1_f32(loc("u_decay").as_ref(), cfg.decay_factor as f32);
            gl.uniform_1_i32(loc("u_ring_count").as_ref(), count as i32);
            gl.uniform_4_f32_slice(loc("u_rings").as_ref(), &rings);
            gl.uniform_1_f32_slice(loc("u_ring_strength").as_ref(), &strengths);
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_arrays(glow::TRIANGLES, 0, 3);
            gl.bind_vertex_array(None);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
        self.roles.swap();
        Ok(())
    }

    fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        if self.released {
            return Err(EngineError::Render("resized after release".into()));
        }
        let (width, height) = (width.max(1), height.max(1));
        let targets = allocate_targets(self.ctx.gl(), width, height)?;
        self.destroy_targets();
        self.targets = targets;
        self.roles.reset();
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn params(&self) -> Value {
        let mut params = self.config.to_json();
        if let Some(map) = params.as_object_mut() {
            map.insert("theme".into(), json!(self.theme.name()));
            map.insert("backend".into(), json!("gpu"));
        }
        params
    }

    fn param_schema(&self) -> Value {
        RippleConfig::schema()
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    #[allow(unsafe_code)]
    fn release(&mut self) {
        use glow::HasContext;

        if self.released {
            return;
        }
        self.released = true;
        self.destroy_targets();
        let gl = self.ctx.gl();
        // SAFETY: handles are deleted exactly once, guarded by `released`.
        unsafe {
            gl.delete_program(self.simulation);
            gl.delete_program(self.display);
            gl.delete_vertex_array(self.vao);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn pack_rings_flips_y_to_gl_origin() {
        let ring = Excitation::ring(DVec2::new(2.5, 1.5), 3.0, 2.0, 0.7);
        let (rings, strengths, count) = pack_rings(&[ring], 8);
        assert_eq!(count, 1);
        assert_eq!(rings[0], 2.5);
        assert_eq!(rings[1], 6.5);
        assert_eq!(rings[2], 1.0);
        assert_eq!(rings[3], 3.0);
        assert!((strengths[0] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn pack_rings_caps_at_capacity() {
        let ring = Excitation::ring(DVec2::ZERO, 3.0, 1.0, 1.0);
        let many = vec![ring; MAX_RINGS + 3];
        let (_, strengths, count) = pack_rings(&many, 4);
        assert_eq!(count, MAX_RINGS);
        assert!(strengths.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn pack_rings_empty_leaves_zeroes() {
        let (rings, strengths, count) = pack_rings(&[], 4);
        assert_eq!(count, 0);
        assert!(rings.iter().all(|&v| v == 0.0));
        assert!(strengths.iter().all(|&v| v == 0.0));
    }

    #[test]
    #[ignore = "requires GL context"]
    fn gpu_step_matches_cpu_rule() {
        // Would test: one step with a single ring, read back from the target,
        // matches `WaveStepper::step` on the same grid within f16 precision.
    }
}
