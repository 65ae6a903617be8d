#![deny(unsafe_code)]
//! Browser bindings for the ripple surface.
//!
//! [`RippleSurface`] owns a WebGL2 canvas: it probes the context once, runs
//! the GPU engine under the runtime's controller, and reports through
//! `tick` whether the live effect is still running. When it is not, the page
//! shows [`fallback_pixels`] instead.

use ripple_core::Theme;
use ripple_runtime::StaticBackdrop;

/// Theme by name, falling back to the default theme for unknown names.
pub fn theme_or_default(name: &str) -> Theme {
    Theme::from_name(name).unwrap_or_default()
}

/// RGBA8 pixels of the static backdrop, for an `ImageData` of the same size.
/// Empty when either dimension is zero.
pub fn fallback_pixels(width: usize, height: usize, theme: Theme, seed: u32) -> Vec<u8> {
    StaticBackdrop::new(seed)
        .render(width, height, theme)
        .map(|frame| frame.rgba)
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{fallback_pixels, theme_or_default};
    use ripple_core::render::{GpuContext, GpuRipple};
    use ripple_core::RippleConfig;
    use ripple_runtime::{
        run_probe, CapabilityProbe, QualityGovernor, RippleController, TickOutcome,
    };
    use tracing::warn;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::{HtmlCanvasElement, Performance, WebGl2RenderingContext};

    /// Capability probe over a canvas' WebGL2 context.
    struct WebGlProbe {
        canvas: HtmlCanvasElement,
        performance: Option<Performance>,
        ctx: Option<GpuContext>,
    }

    impl CapabilityProbe for WebGlProbe {
        fn acquire(&mut self) -> bool {
            let gl = match self.canvas.get_context("webgl2") {
                Ok(Some(obj)) => match obj.dyn_into::<WebGl2RenderingContext>() {
                    Ok(gl) => gl,
                    Err(_) => return false,
                },
                _ => return false,
            };
            self.ctx = GpuContext::new(glow::Context::from_webgl2_context(gl)).ok();
            self.ctx.is_some()
        }

        fn clear(&mut self) {
            if let Some(ctx) = &self.ctx {
                ctx.clear_once();
            }
        }

        fn now_ms(&mut self) -> f64 {
            self.performance.as_ref().map_or(0.0, |p| p.now())
        }
    }

    /// A live ripple effect bound to one canvas.
    #[wasm_bindgen]
    pub struct RippleSurface {
        controller: RippleController<GpuRipple>,
        canvas: HtmlCanvasElement,
    }

    #[wasm_bindgen]
    impl RippleSurface {
        /// Probes WebGL2 on `canvas` and starts the effect, or starts
        /// disabled when the probe fails or the GPU engine cannot be built.
        #[wasm_bindgen(constructor)]
        pub fn new(canvas: HtmlCanvasElement, theme: &str) -> Result<RippleSurface, JsValue> {
            let config = RippleConfig::default();
            let theme = theme_or_default(theme);
            let mut controller = RippleController::new(config, theme)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;

            let mut probe = WebGlProbe {
                canvas: canvas.clone(),
                performance: web_sys::window().and_then(|w| w.performance()),
                ctx: None,
            };
            let outcome = run_probe(&mut probe, &config);
            let governor = QualityGovernor::from_probe(&config, outcome);
            let (w, h) = (canvas.width() as usize, canvas.height() as usize);

            let engine = probe
                .ctx
                .take()
                .filter(|_| outcome.is_capable())
                .and_then(|ctx| match GpuRipple::new(ctx, 1, 1, config, theme) {
                    Ok(engine) => Some(engine),
                    Err(err) => {
                        warn!(error = %err, "ripple surface: GPU engine unavailable");
                        None
                    }
                });
            match engine {
                Some(engine) => controller.init(engine, w, h, governor),
                None => controller.start_disabled(w, h, governor),
            }
            Ok(RippleSurface { controller, canvas })
        }

        pub fn pointer_move(&mut self, x: f64, y: f64) {
            self.controller.pointer_move(x, y);
        }

        pub fn pointer_down(&mut self, x: f64, y: f64) {
            self.controller.pointer_down(x, y);
        }

        pub fn pointer_up(&mut self) {
            self.controller.pointer_up();
        }

        /// Feeds an analyser's byte frequency data.
        pub fn audio_spectrum(&mut self, spectrum: &[u8]) {
            self.controller.audio_spectrum(spectrum);
        }

        /// Call when microphone permission is denied or revoked.
        pub fn audio_unavailable(&mut self) {
            self.controller.clear_audio();
        }

        /// Resizes the canvas backing store and the simulation grid. A failed
        /// reallocation disables the effect; `tick` then returns `false`.
        pub fn resize(&mut self, width: u32, height: u32) {
            let (width, height) = (width.max(1), height.max(1));
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.controller.resize(width as usize, height as usize);
        }

        /// Steps and presents one frame. `false` once the effect has stopped.
        pub fn tick(&mut self, delta_ms: f64) -> bool {
            match self.controller.tick(delta_ms) {
                TickOutcome::Stepped { .. } => {
                    if let Some(engine) = self.controller.engine() {
                        engine.present(self.canvas.width(), self.canvas.height());
                    }
                    true
                }
                TickOutcome::Disabled | TickOutcome::Stopped => false,
            }
        }

        /// Switches the theme for live frames and the fallback.
        pub fn set_theme(&mut self, theme: &str) {
            self.controller.set_theme(theme_or_default(theme));
        }

        pub fn is_disabled(&self) -> bool {
            !self.controller.is_running()
        }

        /// Static backdrop pixels at the canvas size.
        pub fn fallback_rgba(&self, seed: u32) -> Vec<u8> {
            fallback_pixels(
                self.canvas.width() as usize,
                self.canvas.height() as usize,
                self.controller.theme(),
                seed,
            )
        }

        /// Stops the effect and frees every GPU resource.
        pub fn dispose(&mut self) {
            self.controller.dispose();
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::RippleSurface;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_names_fall_back() {
        assert_eq!(theme_or_default("orange"), Theme::Orange);
        assert_eq!(theme_or_default(" BLUE "), Theme::Blue);
        assert_eq!(theme_or_default("teal"), Theme::default());
    }

    #[test]
    fn fallback_pixels_match_size() {
        assert_eq!(fallback_pixels(6, 4, Theme::Blue, 1).len(), 6 * 4 * 4);
        assert!(fallback_pixels(0, 4, Theme::Blue, 1).is_empty());
    }
}
