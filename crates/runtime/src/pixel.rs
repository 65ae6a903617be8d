//! RGBA8 conversion of a wave field through a [`Theme`].
//!
//! Always available (no feature gate) so the PNG snapshot path and a
//! browser `ImageData` path share the same conversion.

use ripple_core::error::EngineError;
use ripple_core::field::FieldGrid;
use ripple_core::theme::Theme;

/// An RGBA8 image, row-major, four bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl Frame {
    /// Wraps a pixel buffer, checking its length against the dimensions.
    pub fn new(width: usize, height: usize, rgba: Vec<u8>) -> Result<Self, EngineError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        if rgba.len() != expected {
            return Err(EngineError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: rgba.len() / 4,
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// RGBA bytes of pixel `(x, y)`, `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        let px = self.rgba.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Shades every cell's `force` of the current buffer with `theme`.
pub fn field_to_rgba(grid: &FieldGrid, theme: Theme) -> Vec<u8> {
    forces_to_rgba(grid.current().iter().map(|c| c.force), theme)
}

/// Shades a sequence of `force` values.
pub fn forces_to_rgba(forces: impl Iterator<Item = f64>, theme: Theme) -> Vec<u8> {
    let colors = theme.colors();
    forces.flat_map(|f| colors.shade(f).to_rgba8()).collect()
}

/// The current buffer of `grid` as a [`Frame`].
pub fn field_frame(grid: &FieldGrid, theme: Theme) -> Frame {
    Frame {
        width: grid.width(),
        height: grid.height(),
        rgba: field_to_rgba(grid, theme),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_to_rgba_correct_length() {
        let grid = FieldGrid::new(8, 4).unwrap();
        assert_eq!(field_to_rgba(&grid, Theme::Blue).len(), 8 * 4 * 4);
    }

    #[test]
    fn alpha_always_opaque() {
        let mut grid = FieldGrid::new(4, 4).unwrap();
        grid.set_force(1, 1, 3.0).unwrap();
        grid.set_force(2, 2, -3.0).unwrap();
        let buf = field_to_rgba(&grid, Theme::Orange);
        assert!(buf.chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn rest_field_is_ambient_tint() {
        let grid = FieldGrid::new(2, 2).unwrap();
        let frame = field_frame(&grid, Theme::Orange);
        // 0.3 * (1.0, 0.5, 0.1) quantized.
        assert_eq!(frame.pixel(0, 0), Some([77, 38, 8, 255]));
    }

    #[test]
    fn positive_force_is_brighter() {
        let mut grid = FieldGrid::new(2, 1).unwrap();
        grid.set_force(1, 0, 0.8).unwrap();
        let frame = field_frame(&grid, Theme::Blue);
        let rest = frame.pixel(0, 0).unwrap();
        let lit = frame.pixel(1, 0).unwrap();
        assert!(lit[2] > rest[2]);
    }

    #[test]
    fn frame_new_checks_length() {
        assert!(Frame::new(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            Frame::new(2, 2, vec![0; 12]),
            Err(EngineError::DimensionMismatch { .. })
        ));
        assert!(Frame::new(usize::MAX, 2, vec![]).is_err());
    }

    #[test]
    fn pixel_outside_is_none() {
        let frame = Frame::new(1, 1, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(frame.pixel(0, 0), Some([1, 2, 3, 4]));
        assert_eq!(frame.pixel(1, 0), None);
    }
}
