//! Thin glow helpers: program compilation and float render targets.
//!
//! Shader compile logs are formatted with numbered source lines so driver
//! messages like `0:17: undeclared identifier` can be matched to the GLSL.

use crate::error::EngineError;
use thiserror::Error;

/// Shader compilation or program link failure.
#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    #[error("shader compile error ({stage}):\n{log}")]
    CompileError { stage: String, log: String },
    #[error("shader link error:\n{0}")]
    LinkError(String),
}

impl From<ShaderError> for EngineError {
    fn from(err: ShaderError) -> Self {
        EngineError::Render(err.to_string())
    }
}

/// Numbers each line of `source` (right-aligned) and appends the driver `log`.
pub fn format_shader_error(source: &str, log: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let width = lines.len().max(1).to_string().len();
    let mut out = lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    if !log.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(log);
    }
    out
}

fn stage_name(shader_type: u32) -> &'static str {
    match shader_type {
        glow::VERTEX_SHADER => "vertex",
        glow::FRAGMENT_SHADER => "fragment",
        _ => "unknown",
    }
}

#[allow(unsafe_code)]
fn compile_stage(
    gl: &glow::Context,
    shader_type: u32,
    source: &str,
) -> Result<glow::Shader, ShaderError> {
    use glow::HasContext;

    let stage = stage_name(shader_type);
    // SAFETY: valid stage enum and source string; the shader is deleted on failure.
    unsafe {
        let shader = gl
            .create_shader(shader_type)
            .map_err(|log| ShaderError::CompileError {
                stage: stage.to_string(),
                log,
            })?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if gl.get_shader_compile_status(shader) {
            return Ok(shader);
        }
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        Err(ShaderError::CompileError {
            stage: stage.to_string(),
            log: format_shader_error(source, &log),
        })
    }
}

/// Compiles both stages and links them. Stage objects are always deleted.
#[allow(unsafe_code)]
pub fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<glow::Program, ShaderError> {
    use glow::HasContext;

    let vertex = compile_stage(gl, glow::VERTEX_SHADER, vertex_src)?;
    let fragment = match compile_stage(gl, glow::FRAGMENT_SHADER, fragment_src) {
        Ok(f) => f,
        Err(e) => {
            // SAFETY: `vertex` came from a successful compile.
            unsafe { gl.delete_shader(vertex) };
            return Err(e);
        }
    };

    // SAFETY: both handles are live; the program keeps its own copies after linking.
    unsafe {
        let linked = gl.create_program().map_err(ShaderError::LinkError).map(|program| {
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);
            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);
            program
        });
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);
        let program = linked?;
        if gl.get_program_link_status(program) {
            Ok(program)
        } else {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            Err(ShaderError::LinkError(log))
        }
    }
}

/// Allocates an uninitialized RGBA16F texture with NEAREST filtering and
/// clamped edges. Cell state is read with `texelFetch`, never interpolated.
#[allow(unsafe_code)]
fn create_state_texture(
    gl: &glow::Context,
    width: u32,
    height: u32,
) -> Result<glow::Texture, EngineError> {
    use glow::HasContext;

    // SAFETY: standard texture allocation with constant enums.
    unsafe {
        let texture = gl.create_texture().map_err(EngineError::Render)?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        for (param, value) in [
            (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE),
            (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE),
            (glow::TEXTURE_MIN_FILTER, glow::NEAREST),
            (glow::TEXTURE_MAG_FILTER, glow::NEAREST),
        ] {
            gl.tex_parameter_i32(glow::TEXTURE_2D, param, value as i32);
        }
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA16F as i32,
            width as i32,
            height as i32,
            0,
            glow::RGBA,
            glow::HALF_FLOAT,
            glow::PixelUnpackData::Slice(None),
        );
        gl.bind_texture(glow::TEXTURE_2D, None);
        Ok(texture)
    }
}

/// A framebuffer with one RGBA16F color attachment holding a cell buffer.
///
/// Channels are `(force, velocity, gradient_x, gradient_y)`.
pub struct RenderTarget {
    fbo: glow::Framebuffer,
    texture: glow::Texture,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Creates a target cleared to rest.
    #[allow(unsafe_code)]
    pub fn new(gl: &glow::Context, width: u32, height: u32) -> Result<Self, EngineError> {
        use glow::HasContext;

        let texture = create_state_texture(gl, width, height)?;
        // SAFETY: the texture handle is live; everything is deleted on failure.
        unsafe {
            let fbo = match gl.create_framebuffer() {
                Ok(fbo) => fbo,
                Err(e) => {
                    gl.delete_texture(texture);
                    return Err(EngineError::Render(e));
                }
            };
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(texture),
                0,
            );
            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                gl.delete_framebuffer(fbo);
                gl.delete_texture(texture);
                return Err(EngineError::Render(format!(
                    "framebuffer incomplete: status 0x{status:04X}"
                )));
            }
            gl.viewport(0, 0, width as i32, height as i32);
            gl.clear_color(0.0, 0.0, 0.0, 0.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            Ok(Self {
                fbo,
                texture,
                width,
                height,
            })
        }
    }

    /// Binds the framebuffer for drawing and matches the viewport to it.
    #[allow(unsafe_code)]
    pub fn bind(&self, gl: &glow::Context) {
        use glow::HasContext;

        // SAFETY: `fbo` is live until `destroy`.
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            gl.viewport(0, 0, self.width as i32, self.height as i32);
        }
    }

    pub fn texture(&self) -> glow::Texture {
        self.texture
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Deletes the framebuffer and its texture.
    #[allow(unsafe_code)]
    pub fn destroy(&self, gl: &glow::Context) {
        use glow::HasContext;

        // SAFETY: both handles were created in `new` and are deleted once.
        unsafe {
            gl.delete_framebuffer(self.fbo);
            gl.delete_texture(self.texture);
        }
    }
}
