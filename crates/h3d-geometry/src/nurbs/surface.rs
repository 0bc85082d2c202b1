use h3d_core::{H3dError, Result};
use h3d_math::vector;
use serde::{Deserialize, Serialize};

use super::knot::KnotVector;
use crate::points::grid_dimension;
use crate::surface::SurfaceEvaluator;

/// A tensor-product B-spline surface over a grid `control_points[v][u]`.
/// Degrees follow from the knot counts as for [`BSplineCurve`](super::BSplineCurve).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BSplineSurface {
    control_points: Vec<Vec<Vec<f64>>>,
    knots_u: KnotVector,
    knots_v: KnotVector,
    degree_u: usize,
    degree_v: usize,
    dimension: usize,
}

impl BSplineSurface {
    pub fn new(
        control_points: Vec<Vec<Vec<f64>>>,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
    ) -> Result<Self> {
        let (rows, cols, dimension) = grid_dimension(&control_points)?;
        let knots_u = KnotVector::new(knots_u)?;
        let knots_v = KnotVector::new(knots_v)?;
        if knots_u.len() <= cols || knots_v.len() <= rows {
            return Err(H3dError::Geometry(format!(
                "knot counts ({}, {}) are too few for a {}x{} grid",
                knots_u.len(),
                knots_v.len(),
                cols,
                rows
            )));
        }
        Ok(Self {
            degree_u: knots_u.len() - cols - 1,
            degree_v: knots_v.len() - rows - 1,
            control_points,
            knots_u,
            knots_v,
            dimension,
        })
    }

    pub fn clamped(
        control_points: Vec<Vec<Vec<f64>>>,
        degree_u: usize,
        degree_v: usize,
    ) -> Result<Self> {
        let (rows, cols, _) = grid_dimension(&control_points)?;
        let ku = KnotVector::clamped(cols, degree_u)?;
        let kv = KnotVector::clamped(rows, degree_v)?;
        Self::new(control_points, ku.as_slice().to_vec(), kv.as_slice().to_vec())
    }

    pub fn degrees(&self) -> (usize, usize) {
        (self.degree_u, self.degree_v)
    }
}

impl SurfaceEvaluator for BSplineSurface {
    fn evaluate(&self, u: f64, v: f64) -> Vec<f64> {
        let (pu, pv) = (self.degree_u, self.degree_v);
        let span_u = self.knots_u.find_span(pu, self.control_points[0].len() - 1, u);
        let span_v = self.knots_v.find_span(pv, self.control_points.len() - 1, v);
        let bu = self.knots_u.basis(pu, span_u, u);
        let bv = self.knots_v.basis(pv, span_v, v);

        let mut out = vec![0.0; self.dimension];
        for (j, wv) in bv.iter().enumerate() {
            let row = &self.control_points[span_v - pv + j];
            for (i, wu) in bu.iter().enumerate() {
                vector::add_scaled_in_place(&mut out, &row[span_u - pu + i], wu * wv);
            }
        }
        out
    }

    fn end_points(&self) -> [f64; 4] {
        let (u1, u2) = self.knots_u.domain(self.degree_u);
        let (v1, v2) = self.knots_v.domain(self.degree_v);
        [u1, u2, v1, v2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bilinear_patch() {
        let surf = BSplineSurface::clamped(
            vec![
                vec![vec![0.0, 0.0, 0.0], vec![1.0, 0.0, 0.0]],
                vec![vec![0.0, 1.0, 0.0], vec![1.0, 1.0, 0.0]],
            ],
            1,
            1,
        )
        .unwrap();
        assert_eq!(surf.degrees(), (1, 1));
        assert_eq!(surf.end_points(), [0.0, 1.0, 0.0, 1.0]);
        let p = surf.evaluate(0.25, 0.75);
        assert_abs_diff_eq!(p[0], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 0.75, epsilon = 1e-12);
        let corner = surf.evaluate(1.0, 1.0);
        assert_abs_diff_eq!(corner[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(corner[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_too_few_knots() {
        let grid = vec![vec![vec![0.0], vec![1.0]], vec![vec![2.0], vec![3.0]]];
        assert!(BSplineSurface::new(grid, vec![0.0, 1.0], vec![0.0, 0.0, 1.0, 1.0]).is_err());
    }
}
