//! GPU context wrapper with capability detection.
//!
//! The ripple backend renders cell state into RGBA16F attachments, which
//! WebGL2 only allows with `EXT_color_buffer_float`.

use crate::error::EngineError;

/// Extension required for float color attachments.
pub const COLOR_BUFFER_FLOAT: &str = "EXT_color_buffer_float";

/// Wraps a `glow::Context` whose float render target support was verified.
pub struct GpuContext {
    gl: glow::Context,
}

impl GpuContext {
    /// Wraps `gl`, failing with `EngineError::Capability` when float color
    /// buffers are unsupported.
    pub fn new(gl: glow::Context) -> Result<Self, EngineError> {
        use glow::HasContext;

        if !gl.supported_extensions().contains(COLOR_BUFFER_FLOAT) {
            return Err(EngineError::Capability(format!(
                "required extension {COLOR_BUFFER_FLOAT} is not supported"
            )));
        }
        Ok(Self { gl })
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Clears the default framebuffer once and waits for completion.
    #[allow(unsafe_code)]
    pub fn clear_once(&self) {
        use glow::HasContext;

        // SAFETY: clears the default framebuffer; no handles involved.
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            self.gl.clear_color(0.0, 0.0, 0.0, 0.0);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
            self.gl.finish();
        }
    }
}
