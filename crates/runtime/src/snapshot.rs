//! PNG output of rendered frames.
//!
//! Feature-gated behind `png` (default on) so the WASM surface can depend on
//! this crate without pulling in `image`. Pixel conversion lives in
//! [`crate::pixel`] and is always available.

use ripple_core::error::EngineError;
use ripple_core::field::FieldGrid;
use ripple_core::theme::Theme;
use std::path::Path;

use crate::pixel::{field_frame, Frame};

/// Writes an RGBA frame as a PNG image.
///
/// Returns `EngineError::InvalidDimensions` if the frame dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(frame: &Frame, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(frame.width).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(frame.height).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, frame.rgba.clone())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}

/// Shades the current buffer of `grid` with `theme` and writes it as a PNG.
pub fn write_field_png(grid: &FieldGrid, theme: Theme, path: &Path) -> Result<(), EngineError> {
    write_png(&field_frame(grid, theme), path)
}
