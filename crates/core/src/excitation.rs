//! Transient ring-shaped disturbances injected into the field.
//!
//! An [`Excitation`] adds energy to `force` in an annulus around a point,
//! feathered by one cell on each edge. It only exists for the step that
//! consumes it.

use glam::DVec2;

/// A ring-shaped energy injection, in grid-cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Excitation {
    /// Ring centre (cell units; cell `(x, y)` has its centre at `(x + 0.5, y + 0.5)`).
    pub position: DVec2,
    /// Cells closer than this receive nothing (feathered over one cell).
    pub inner_radius: f64,
    /// Cells farther than this receive nothing (feathered over one cell).
    pub outer_radius: f64,
    /// Peak `force` added inside the ring.
    pub strength: f64,
}

impl Excitation {
    /// Creates a ring from its outer radius and width.
    ///
    /// The inner radius is `outer_radius - width`, floored at 0 (a filled disk).
    pub fn ring(position: DVec2, outer_radius: f64, width: f64, strength: f64) -> Self {
        Self {
            position,
            inner_radius: (outer_radius - width).max(0.0),
            outer_radius,
            strength,
        }
    }

    /// Ring weight in [0, 1] at distance `dist` from the centre.
    ///
    /// A non-positive (or non-finite) outer radius yields 0 everywhere.
    pub fn weight(&self, dist: f64) -> f64 {
        if self.outer_radius.is_nan() || self.outer_radius <= 0.0 || !dist.is_finite() {
            return 0.0;
        }
        let inner = self.inner_radius;
        let outer = self.outer_radius;
        smoothstep(inner - 1.0, inner, dist) * smoothstep(outer + 1.0, outer, dist)
    }

    /// Force added to the cell whose centre is at `cell_centre`.
    pub fn contribution(&self, cell_centre: DVec2) -> f64 {
        self.weight(cell_centre.distance(self.position)) * self.strength
    }

    /// Cell-space bounding box `(x0, y0, x1, y1)` (half-open) of the cells the
    /// ring can touch, clipped to a `width × height` grid. `None` when the ring
    /// misses the grid entirely or is degenerate.
    pub fn bounds(&self, width: usize, height: usize) -> Option<(usize, usize, usize, usize)> {
        if self.outer_radius.is_nan() || self.outer_radius <= 0.0 || !self.position.is_finite() {
            return None;
        }
        let reach = self.outer_radius + 1.0;
        let x0 = (self.position.x - reach).floor().max(0.0);
        let y0 = (self.position.y - reach).floor().max(0.0);
        let x1 = (self.position.x + reach).ceil().min(width as f64);
        let y1 = (self.position.y + reach).ceil().min(height as f64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}

/// Hermite smoothstep between `edge0` and `edge1`.
///
/// Works for descending edges (`edge0 > edge1`). Coincident edges degenerate
/// to a step at the edge instead of dividing by zero.
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let span = edge1 - edge0;
    if span == 0.0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_at(x: f64, y: f64, inner: f64, outer: f64) -> Excitation {
        Excitation {
            position: DVec2::new(x, y),
            inner_radius: inner,
            outer_radius: outer,
            strength: 1.0,
        }
    }

    #[test]
    fn smoothstep_hits_endpoints() {
        assert_eq!(smoothstep(0.0, 1.0, -0.5), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 0.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 1.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn smoothstep_descending_edges_invert() {
        assert_eq!(smoothstep(4.0, 3.0, 3.0), 1.0);
        assert_eq!(smoothstep(4.0, 3.0, 4.0), 0.0);
    }

    #[test]
    fn smoothstep_coincident_edges_is_a_step() {
        assert_eq!(smoothstep(2.0, 2.0, 1.9), 0.0);
        assert_eq!(smoothstep(2.0, 2.0, 2.0), 1.0);
        assert!(smoothstep(2.0, 2.0, 5.0).is_finite());
    }

    #[test]
    fn weight_is_full_inside_the_ring() {
        let ring = ring_at(0.0, 0.0, 1.0, 3.0);
        for d in [1.0, 1.5, 2.0, 2.5, 3.0] {
            assert_eq!(ring.weight(d), 1.0, "weight at {d}");
        }
    }

    #[test]
    fn weight_is_zero_outside_the_feather() {
        let ring = ring_at(0.0, 0.0, 2.0, 5.0);
        assert_eq!(ring.weight(0.0), 0.0);
        assert_eq!(ring.weight(0.99), 0.0);
        assert_eq!(ring.weight(6.01), 0.0);
        assert_eq!(ring.weight(100.0), 0.0);
    }

    #[test]
    fn degenerate_radius_contributes_nothing() {
        let ring = ring_at(0.0, 0.0, 0.0, 0.0);
        assert_eq!(ring.weight(0.0), 0.0);
        let negative = ring_at(0.0, 0.0, -3.0, -1.0);
        assert_eq!(negative.weight(0.5), 0.0);
        assert!(negative.bounds(8, 8).is_none());
    }

    #[test]
    fn ring_constructor_floors_inner_radius() {
        let ring = Excitation::ring(DVec2::ZERO, 3.0, 10.0, 0.7);
        assert_eq!(ring.inner_radius, 0.0);
        assert_eq!(ring.outer_radius, 3.0);
        let normal = Excitation::ring(DVec2::ZERO, 15.0, 4.0, 0.7);
        assert_eq!(normal.inner_radius, 11.0);
    }

    #[test]
    fn contribution_scales_with_strength() {
        let mut ring = ring_at(0.0, 0.0, 1.0, 3.0);
        ring.strength = 0.7;
        assert!((ring.contribution(DVec2::new(2.0, 0.0)) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn bounds_clip_to_grid() {
        let ring = ring_at(1.0, 1.0, 1.0, 3.0);
        assert_eq!(ring.bounds(8, 8), Some((0, 0, 5, 5)));
    }

    #[test]
    fn bounds_none_when_far_outside() {
        let ring = ring_at(-50.0, 4.0, 1.0, 3.0);
        assert!(ring.bounds(8, 8).is_none());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn weight_always_in_unit_interval(
                inner in -5.0_f64..20.0,
                outer in -5.0_f64..25.0,
                dist in 0.0_f64..50.0,
            ) {
                let w = ring_at(0.0, 0.0, inner, outer).weight(dist);
                prop_assert!((0.0..=1.0).contains(&w), "weight {w} out of range");
            }

            #[test]
            fn smoothstep_is_monotone_for_ascending_edges(
                a in -10.0_f64..10.0,
                span in 0.01_f64..10.0,
                x in -20.0_f64..20.0,
                dx in 0.0_f64..5.0,
            ) {
                let b = a + span;
                prop_assert!(smoothstep(a, b, x) <= smoothstep(a, b, x + dx) + 1e-12);
            }
        }
    }
}
