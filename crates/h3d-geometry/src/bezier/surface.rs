use h3d_core::Result;
use h3d_math::vector;
use serde::{Deserialize, Serialize};

use super::bernstein::bernstein_basis;
use crate::points::{check_domain, grid_dimension};
use crate::surface::SurfaceEvaluator;

/// A tensor-product Bezier surface.
///
/// `control_points[j][i]` is the point in row `j` (V direction) and column `i`
/// (U direction), so the U degree is `columns - 1` and the V degree is
/// `rows - 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BezierSurface {
    control_points: Vec<Vec<Vec<f64>>>,
    dimension: usize,
    domain: [f64; 4],
}

impl BezierSurface {
    pub fn new(control_points: Vec<Vec<Vec<f64>>>) -> Result<Self> {
        Self::with_domain(control_points, 0.0, 1.0, 0.0, 1.0)
    }

    /// # Errors
    /// Fails on an empty, ragged, or non-uniform grid, or a degenerate domain.
    pub fn with_domain(
        control_points: Vec<Vec<Vec<f64>>>,
        u1: f64,
        u2: f64,
        v1: f64,
        v2: f64,
    ) -> Result<Self> {
        let (_, _, dimension) = grid_dimension(&control_points)?;
        check_domain(u1, u2, "u")?;
        check_domain(v1, v2, "v")?;
        Ok(Self {
            control_points,
            dimension,
            domain: [u1, u2, v1, v2],
        })
    }

    pub fn degree_u(&self) -> usize {
        self.control_points[0].len() - 1
    }

    pub fn degree_v(&self) -> usize {
        self.control_points.len() - 1
    }

    fn local(&self, u: f64, v: f64) -> (f64, f64) {
        let [u1, u2, v1, v2] = self.domain;
        ((u - u1) / (u2 - u1), (v - v1) / (v2 - v1))
    }

    /// Weighted sum over the grid: `sum_j bv[j] * sum_i bu[i] * point(j, i)`.
    fn blend<F>(&self, bu: &[f64], bv: &[f64], point: F) -> Vec<f64>
    where
        F: Fn(usize, usize) -> Vec<f64>,
    {
        let mut out = vec![0.0; self.dimension];
        for (j, &wv) in bv.iter().enumerate() {
            if wv == 0.0 {
                continue;
            }
            for (i, &wu) in bu.iter().enumerate() {
                vector::add_scaled_in_place(&mut out, &point(j, i), wu * wv);
            }
        }
        out
    }

    /// Partial derivatives `(dP/du, dP/dv)` at `(u, v)`.
    pub fn partials(&self, u: f64, v: f64) -> (Vec<f64>, Vec<f64>) {
        let (tu, tv) = self.local(u, v);
        let (nu, nv) = (self.degree_u(), self.degree_v());
        let [u1, u2, v1, v2] = self.domain;
        let cp = &self.control_points;

        let du = if nu == 0 {
            vec![0.0; self.dimension]
        } else {
            let mut d = self.blend(
                &bernstein_basis(nu - 1, tu),
                &bernstein_basis(nv, tv),
                |j, i| vector::sub(&cp[j][i + 1], &cp[j][i]),
            );
            vector::scale_in_place(&mut d, nu as f64 / (u2 - u1));
            d
        };
        let dv = if nv == 0 {
            vec![0.0; self.dimension]
        } else {
            let mut d = self.blend(
                &bernstein_basis(nu, tu),
                &bernstein_basis(nv - 1, tv),
                |j, i| vector::sub(&cp[j + 1][i], &cp[j][i]),
            );
            vector::scale_in_place(&mut d, nv as f64 / (v2 - v1));
            d
        };
        (du, dv)
    }
}

impl SurfaceEvaluator for BezierSurface {
    fn evaluate(&self, u: f64, v: f64) -> Vec<f64> {
        let (tu, tv) = self.local(u, v);
        self.blend(
            &bernstein_basis(self.degree_u(), tu),
            &bernstein_basis(self.degree_v(), tv),
            |j, i| self.control_points[j][i].clone(),
        )
    }

    fn end_points(&self) -> [f64; 4] {
        self.domain
    }

    fn gradient(&self, u: f64, v: f64) -> Option<Vec<f64>> {
        let (du, dv) = self.partials(u, v);
        let n = vector::to_dvec3(&du).cross(vector::to_dvec3(&dv));
        Some(n.to_array().to_vec())
    }
}
