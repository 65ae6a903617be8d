//! Read/write index tracking for double-buffered state.
//!
//! `PingPong` records which of two buffers is the current (read) side and
//! which is the next (write) side. Both the CPU [`FieldGrid`](crate::field::FieldGrid)
//! and the GPU render-target pair use it, so a swap is an index flip and
//! never a data copy.

/// Tracks the read/write indices for a pair of buffers.
///
/// The invariant `src_index() + dst_index() == 1` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PingPong {
    current: usize,
}

impl PingPong {
    /// Source at index 0, destination at index 1.
    pub fn new() -> Self {
        Self { current: 0 }
    }

    /// Index of the buffer holding the current field.
    pub fn src_index(&self) -> usize {
        self.current
    }

    /// Index of the buffer the next step writes into.
    pub fn dst_index(&self) -> usize {
        1 - self.current
    }

    /// Flips source and destination.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Returns to the initial orientation (source 0).
    pub fn reset(&mut self) {
        self.current = 0;
    }
}
