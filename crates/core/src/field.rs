//! Double-buffered 2D field of wave cells.
//!
//! A [`FieldGrid`] owns two row-major buffers of [`Cell`]s of identical size.
//! Steppers read the `current` buffer and write the `next` buffer; [`FieldGrid::swap`]
//! then exchanges their roles by flipping a [`PingPong`] index. Unlike a
//! toroidal field, coordinates here are bounded: out-of-range access is an
//! error, and boundary handling is the stepper's job.

use crate::error::EngineError;
use crate::ping_pong::PingPong;

/// One grid cell of the wave surface.
///
/// `force` is the surface displacement and `velocity` its rate of change.
/// The gradients are derived from neighbouring `force` values on every step
/// and are only kept for shading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cell {
    pub force: f64,
    pub velocity: f64,
    pub gradient_x: f64,
    pub gradient_y: f64,
}

impl Cell {
    /// A cell at rest.
    pub const REST: Cell = Cell {
        force: 0.0,
        velocity: 0.0,
        gradient_x: 0.0,
        gradient_y: 0.0,
    };

    /// Whether both integrated channels are finite.
    pub fn is_finite(&self) -> bool {
        self.force.is_finite() && self.velocity.is_finite()
    }
}

/// Two equally sized cell buffers with O(1) role swapping.
#[derive(Debug, Clone)]
pub struct FieldGrid {
    width: usize,
    height: usize,
    buffers: [Vec<Cell>; 2],
    roles: PingPong,
}

impl FieldGrid {
    /// Creates a grid at rest.
    ///
    /// Zero dimensions are clamped to 1 so a collapsed viewport still yields
    /// a valid 1×1 grid. Returns `EngineError::InvalidDimensions` only if
    /// `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        let (width, height, len) = checked_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            buffers: [vec![Cell::REST; len], vec![Cell::REST; len]],
            roles: PingPong::new(),
        })
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells in one buffer.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always false: a grid holds at least one cell.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The buffer holding the latest completed step.
    pub fn current(&self) -> &[Cell] {
        &self.buffers[self.roles.src_index()]
    }

    /// The buffer the next step writes into (stale data until then).
    pub fn next(&self) -> &[Cell] {
        &self.buffers[self.roles.dst_index()]
    }

    /// Mutable access to the current buffer, for seeding initial conditions.
    pub fn current_mut(&mut self) -> &mut [Cell] {
        let src = self.roles.src_index();
        &mut self.buffers[src]
    }

    /// Splits the grid into the read-only current buffer and the writable
    /// next buffer, so a step can never alias its input.
    pub fn split_mut(&mut self) -> (&[Cell], &mut [Cell]) {
        let [first, second] = &mut self.buffers;
        if self.roles.src_index() == 0 {
            (first.as_slice(), second.as_mut_slice())
        } else {
            (second.as_slice(), first.as_mut_slice())
        }
    }

    /// Exchanges the roles of `current` and `next`. No cell data is copied.
    pub fn swap(&mut self) {
        self.roles.swap();
    }

    /// Reallocates both buffers at the new size and resets them to rest.
    ///
    /// Zero dimensions are clamped to 1.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        let (width, height, len) = checked_dimensions(width, height)?;
        self.width = width;
        self.height = height;
        self.buffers = [vec![Cell::REST; len], vec![Cell::REST; len]];
        self.roles.reset();
        Ok(())
    }

    /// Returns every cell of both buffers to rest without reallocating.
    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(Cell::REST);
        }
        self.roles.reset();
    }

    /// Reads a cell of the current buffer.
    pub fn cell(&self, x: usize, y: usize) -> Result<&Cell, EngineError> {
        let idx = self.index(x, y)?;
        Ok(&self.current()[idx])
    }

    /// Overwrites the `force` of a cell in the current buffer.
    pub fn set_force(&mut self, x: usize, y: usize, force: f64) -> Result<(), EngineError> {
        let idx = self.index(x, y)?;
        self.current_mut()[idx].force = force;
        Ok(())
    }

    /// Sum of `|force|` over the current buffer.
    pub fn total_abs_force(&self) -> f64 {
        self.current().iter().map(|c| c.force.abs()).sum()
    }

    /// Iterates over the current buffer yielding `(x, y, cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        let w = self.width;
        self.current()
            .iter()
            .enumerate()
            .map(move |(i, c)| (i % w, i / w, c))
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, EngineError> {
        if x >= self.width || y >= self.height {
            return Err(EngineError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }
}

/// Clamps both dimensions to at least 1 and checks the cell count.
fn checked_dimensions(width: usize, height: usize) -> Result<(usize, usize, usize), EngineError> {
    let width = width.max(1);
    let height = height.max(1);
    let len = width
        .checked_mul(height)
        .ok_or(EngineError::InvalidDimensions)?;
    Ok((width, height, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Construction --

    #[test]
    fn new_creates_grid_at_rest() {
        let grid = FieldGrid::new(4, 3).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.len(), 12);
        assert!(grid.current().iter().all(|c| *c == Cell::REST));
        assert!(grid.next().iter().all(|c| *c == Cell::REST));
    }

    #[test]
    fn zero_dimensions_clamp_to_one() {
        let grid = FieldGrid::new(0, 0).unwrap();
        assert_eq!((grid.width(), grid.height()), (1, 1));
        assert!(!grid.is_empty());
    }

    #[test]
    fn overflowing_dimensions_return_error() {
        assert!(matches!(
            FieldGrid::new(usize::MAX, 2),
            Err(EngineError::InvalidDimensions)
        ));
    }

    // -- Swap --

    #[test]
    fn swap_exposes_written_buffer_as_current() {
        let mut grid = FieldGrid::new(2, 2).unwrap();
        {
            let (_, next) = grid.split_mut();
            next[3].force = 0.5;
        }
        assert_eq!(grid.current()[3].force, 0.0);
        grid.swap();
        assert_eq!(grid.current()[3].force, 0.5);
        assert_eq!(grid.next()[3].force, 0.0);
    }

    #[test]
    fn swap_does_not_move_buffers() {
        let mut grid = FieldGrid::new(8, 8).unwrap();
        let before = grid.current().as_ptr();
        let next_before = grid.next().as_ptr();
        grid.swap();
        assert_eq!(grid.next().as_ptr(), before);
        assert_eq!(grid.current().as_ptr(), next_before);
    }

    #[test]
    fn split_mut_reads_current_and_writes_next() {
        let mut grid = FieldGrid::new(3, 1).unwrap();
        grid.set_force(1, 0, 2.0).unwrap();
        grid.swap();
        grid.set_force(1, 0, 7.0).unwrap();
        let (current, next) = grid.split_mut();
        assert_eq!(current[1].force, 7.0);
        assert_eq!(next[1].force, 2.0);
    }

    // -- Resize / reset --

    #[test]
    fn resize_reallocates_and_resets() {
        let mut grid = FieldGrid::new(4, 4).unwrap();
        grid.set_force(1, 1, 1.0).unwrap();
        grid.swap();
        grid.resize(6, 2).unwrap();
        assert_eq!((grid.width(), grid.height()), (6, 2));
        assert_eq!(grid.current().len(), 12);
        assert_eq!(grid.next().len(), 12);
        assert_eq!(grid.total_abs_force(), 0.0);
    }

    #[test]
    fn resize_to_zero_clamps_to_one() {
        let mut grid = FieldGrid::new(4, 4).unwrap();
        grid.resize(0, 5).unwrap();
        assert_eq!((grid.width(), grid.height()), (1, 5));
    }

    #[test]
    fn reset_zeroes_both_buffers() {
        let mut grid = FieldGrid::new(2, 2).unwrap();
        grid.set_force(0, 0, 1.0).unwrap();
        grid.swap();
        grid.set_force(1, 1, -1.0).unwrap();
        grid.reset();
        assert!(grid.current().iter().all(|c| *c == Cell::REST));
        assert!(grid.next().iter().all(|c| *c == Cell::REST));
    }

    // -- Access --

    #[test]
    fn cell_out_of_bounds_returns_error() {
        let mut grid = FieldGrid::new(4, 4).unwrap();
        assert!(matches!(
            grid.cell(4, 0),
            Err(EngineError::OutOfBounds { x: 4, y: 0, .. })
        ));
        assert!(grid.set_force(0, 9, 1.0).is_err());
    }

    #[test]
    fn total_abs_force_sums_magnitudes() {
        let mut grid = FieldGrid::new(2, 1).unwrap();
        grid.set_force(0, 0, -1.5).unwrap();
        grid.set_force(1, 0, 0.5).unwrap();
        assert!((grid.total_abs_force() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn iter_yields_row_major_coordinates() {
        let mut grid = FieldGrid::new(3, 2).unwrap();
        grid.set_force(2, 1, 4.0).unwrap();
        let coords: Vec<(usize, usize)> = grid.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords[0], (0, 0));
        assert_eq!(coords[2], (2, 0));
        assert_eq!(coords[3], (0, 1));
        let (_, _, last) = grid.iter().last().unwrap();
        assert_eq!(last.force, 4.0);
    }

    #[test]
    fn cell_is_finite_rejects_nan() {
        let cell = Cell {
            force: f64::NAN,
            ..Cell::REST
        };
        assert!(!cell.is_finite());
        assert!(Cell::REST.is_finite());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn even_swap_count_restores_orientation(
                w in 1_usize..=16,
                h in 1_usize..=16,
                swaps in 0_usize..20,
            ) {
                let mut grid = FieldGrid::new(w, h).unwrap();
                grid.set_force(0, 0, 1.0).unwrap();
                for _ in 0..swaps * 2 {
                    grid.swap();
                }
                prop_assert_eq!(grid.cell(0, 0).unwrap().force, 1.0);
            }

            #[test]
            fn resize_always_yields_matching_buffers(
                w in 0_usize..=32,
                h in 0_usize..=32,
            ) {
                let mut grid = FieldGrid::new(4, 4).unwrap();
                grid.resize(w, h).unwrap();
                prop_assert_eq!(grid.current().len(), w.max(1) * h.max(1));
                prop_assert_eq!(grid.next().len(), grid.current().len());
            }
        }
    }
}
