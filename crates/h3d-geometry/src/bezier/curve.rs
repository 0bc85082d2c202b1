use h3d_core::Result;
use h3d_math::vector;
use serde::{Deserialize, Serialize};

use super::bernstein::bernstein_basis;
use crate::curve::CurveEvaluator;
use crate::points::{check_domain, point_dimension};

/// A Bezier curve of any degree.
///
/// The control points share one length `k`, which is also the length of
/// every evaluated point. The public parameter range `[u1, u2]` maps onto the
/// Bernstein parameter `t = (u - u1) / (u2 - u1)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BezierCurve {
    control_points: Vec<Vec<f64>>,
    u1: f64,
    u2: f64,
}

impl BezierCurve {
    pub fn new(control_points: Vec<Vec<f64>>) -> Result<Self> {
        Self::with_domain(control_points, 0.0, 1.0)
    }

    /// # Errors
    /// Fails on an empty or ragged point list, or when `u1 == u2`.
    pub fn with_domain(control_points: Vec<Vec<f64>>, u1: f64, u2: f64) -> Result<Self> {
        point_dimension(&control_points)?;
        check_domain(u1, u2, "u")?;
        Ok(Self {
            control_points,
            u1,
            u2,
        })
    }

    pub fn degree(&self) -> usize {
        self.control_points.len() - 1
    }

    pub fn dimension(&self) -> usize {
        self.control_points[0].len()
    }

    pub fn control_points(&self) -> &[Vec<f64>] {
        &self.control_points
    }

    fn local(&self, u: f64) -> f64 {
        (u - self.u1) / (self.u2 - self.u1)
    }

    /// Sum of `points[i] * basis[i]`.
    fn combine<P: AsRef<[f64]>>(&self, points: impl IntoIterator<Item = P>, basis: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.dimension()];
        for (p, &b) in points.into_iter().zip(basis) {
            vector::add_scaled_in_place(&mut out, p.as_ref(), b);
        }
        out
    }
}

impl CurveEvaluator for BezierCurve {
    fn evaluate(&self, u: f64) -> Vec<f64> {
        let basis = bernstein_basis(self.degree(), self.local(u));
        self.combine(&self.control_points, &basis)
    }

    fn end_points(&self) -> (f64, f64) {
        (self.u1, self.u2)
    }

    /// Derivative via the hodograph, scaled by the domain mapping.
    fn velocity(&self, u: f64) -> Vec<f64> {
        let n = self.degree();
        if n == 0 {
            return vec![0.0; self.dimension()];
        }
        let basis = bernstein_basis(n - 1, self.local(u));
        let diffs = self
            .control_points
            .windows(2)
            .map(|w| vector::sub(&w[1], &w[0]));
        let mut out = self.combine(diffs, &basis);
        vector::scale_in_place(&mut out, n as f64 / (self.u2 - self.u1));
        out
    }

    fn accel(&self, u: f64) -> Vec<f64> {
        let n = self.degree();
        if n < 2 {
            return vec![0.0; self.dimension()];
        }
        let basis = bernstein_basis(n - 2, self.local(u));
        let second = self.control_points.windows(3).map(|w| {
            let mut d = vector::sub(&w[2], &w[1]);
            vector::add_scaled_in_place(&mut d, &vector::sub(&w[1], &w[0]), -1.0);
            d
        });
        let mut out = self.combine(second, &basis);
        let span = self.u2 - self.u1;
        vector::scale_in_place(&mut out, (n * (n - 1)) as f64 / (span * span));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use h3d_core::H3dError;

    fn arch() -> BezierCurve {
        BezierCurve::new(vec![
            vec![0.0, 0.0],
            vec![0.0, 10.0],
            vec![10.0, 10.0],
            vec![10.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_cubic_endpoints() {
        let c = arch();
        assert_eq!(c.evaluate(0.0), vec![0.0, 0.0]);
        assert_eq!(c.evaluate(1.0), vec![10.0, 0.0]);
    }

    #[test]
    fn test_cubic_midpoint() {
        // (P0 + 3P1 + 3P2 + P3) / 8
        let p = arch().evaluate(0.5);
        assert_abs_diff_eq!(p[0], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 7.5, epsilon = 1e-12);
    }

    #[test]
    fn test_single_point_is_constant() {
        let c = BezierCurve::new(vec![vec![3.0, 4.0, 5.0]]).unwrap();
        assert_eq!(c.degree(), 0);
        assert_eq!(c.evaluate(0.7), vec![3.0, 4.0, 5.0]);
        assert_eq!(c.velocity(0.7), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_high_degree_endpoints() {
        let points: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i * i) as f64]).collect();
        let c = BezierCurve::new(points).unwrap();
        let p0 = c.evaluate(0.0);
        let p1 = c.evaluate(1.0);
        assert_abs_diff_eq!(p0[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p1[0], 29.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p1[1], 841.0, epsilon = 1e-6);
    }

    #[test]
    fn test_custom_domain() {
        let c = BezierCurve::with_domain(vec![vec![0.0], vec![4.0]], 2.0, 4.0).unwrap();
        assert_eq!(c.end_points(), (2.0, 4.0));
        assert_abs_diff_eq!(c.evaluate(3.0)[0], 2.0, epsilon = 1e-12);
        // Four units over a parameter range of two.
        assert_abs_diff_eq!(c.velocity(3.0)[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hodograph_matches_numeric() {
        let c = arch();
        let numeric = crate::curve::FnCurve::new(|u| arch().evaluate(u));
        for &u in &[0.1, 0.5, 0.9] {
            let a = c.velocity(u);
            let b = numeric.velocity(u);
            assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-5);
            assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-5);
            let a = c.accel(u);
            let b = numeric.accel(u);
            assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-3);
            assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-3);
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(BezierCurve::new(vec![]), Err(H3dError::Geometry(_))));
        assert!(BezierCurve::new(vec![vec![0.0, 1.0], vec![2.0]]).is_err());
        assert!(BezierCurve::with_domain(vec![vec![0.0]], 1.0, 1.0).is_err());
    }
}
