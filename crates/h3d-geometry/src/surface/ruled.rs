//! Ruled surfaces swept by a line along a directrix curve.

use h3d_math::vector;

use super::SurfaceEvaluator;
use crate::curve::CurveEvaluator;

/// `evaluate(u, v) = directrix(u) + v * director(u)`, with `v` in `[0, 1]`.
pub struct RuledSurface<D, E> {
    directrix: D,
    director: E,
}

impl<D: CurveEvaluator, E: CurveEvaluator> RuledSurface<D, E> {
    pub fn new(directrix: D, director: E) -> Self {
        Self {
            directrix,
            director,
        }
    }
}

impl<D: CurveEvaluator, E: CurveEvaluator> SurfaceEvaluator for RuledSurface<D, E> {
    fn evaluate(&self, u: f64, v: f64) -> Vec<f64> {
        let base = self.directrix.evaluate(u);
        let dir = self.director.evaluate(u);
        let mut out = vector::resized(&base, base.len().max(dir.len()));
        vector::add_scaled_in_place(&mut out, &dir, v);
        out
    }

    fn end_points(&self) -> [f64; 4] {
        let (u1, u2) = self.directrix.end_points();
        [u1, u2, 0.0, 1.0]
    }
}

/// Convenience constructor mirroring [`RuledSurface::new`].
pub fn ruled_surface<D: CurveEvaluator, E: CurveEvaluator>(
    directrix: D,
    director: E,
) -> RuledSurface<D, E> {
    RuledSurface::new(directrix, director)
}
