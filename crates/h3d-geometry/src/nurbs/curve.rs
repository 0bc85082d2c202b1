use h3d_core::{H3dError, Result};
use h3d_math::vector;
use serde::{Deserialize, Serialize};

use super::knot::KnotVector;
use crate::curve::CurveEvaluator;
use crate::points::point_dimension;

/// A B-spline curve whose degree is implied by its knot count:
/// `degree = knots - control_points - 1`.
///
/// With weights the curve is rational (NURBS): each control point is
/// weighted and the blended result divided by the blended weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BSplineCurve {
    control_points: Vec<Vec<f64>>,
    knots: KnotVector,
    degree: usize,
    weights: Option<Vec<f64>>,
}

impl BSplineCurve {
    /// # Errors
    /// Fails on invalid control points, invalid knots, or a knot count that
    /// does not exceed the control point count.
    pub fn new(control_points: Vec<Vec<f64>>, knots: Vec<f64>) -> Result<Self> {
        point_dimension(&control_points)?;
        let knots = KnotVector::new(knots)?;
        if knots.len() <= control_points.len() {
            return Err(H3dError::Geometry(format!(
                "{} knots are too few for {} control points",
                knots.len(),
                control_points.len()
            )));
        }
        let degree = knots.len() - control_points.len() - 1;
        Ok(Self {
            control_points,
            knots,
            degree,
            weights: None,
        })
    }

    /// A curve of `degree` that passes through its first and last points.
    pub fn clamped(control_points: Vec<Vec<f64>>, degree: usize) -> Result<Self> {
        let knots = KnotVector::clamped(control_points.len(), degree)?;
        Self::new(control_points, knots.as_slice().to_vec())
    }

    pub fn uniform(control_points: Vec<Vec<f64>>, degree: usize) -> Result<Self> {
        let knots = KnotVector::uniform(control_points.len(), degree);
        Self::new(control_points, knots.as_slice().to_vec())
    }

    /// # Errors
    /// Fails like [`new`](Self::new), or when the weights do not match the
    /// control points one-to-one or are not all positive.
    pub fn rational(
        control_points: Vec<Vec<f64>>,
        knots: Vec<f64>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        if weights.len() != control_points.len() {
            return Err(H3dError::Geometry(format!(
                "{} weights for {} control points",
                weights.len(),
                control_points.len()
            )));
        }
        if weights.iter().any(|&w| !(w > 0.0)) {
            return Err(H3dError::Geometry("weights must be positive".into()));
        }
        let mut curve = Self::new(control_points, knots)?;
        curve.weights = Some(weights);
        Ok(curve)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }
}

impl CurveEvaluator for BSplineCurve {
    fn evaluate(&self, u: f64) -> Vec<f64> {
        let p = self.degree;
        let last = self.control_points.len() - 1;
        let span = self.knots.find_span(p, last, u);
        let basis = self.knots.basis(p, span, u);

        let mut out = vec![0.0; self.control_points[0].len()];
        let mut weight = 0.0;
        for (i, b) in basis.iter().enumerate() {
            let idx = span - p + i;
            let w = self.weights.as_ref().map_or(1.0, |ws| ws[idx]);
            vector::add_scaled_in_place(&mut out, &self.control_points[idx], b * w);
            weight += b * w;
        }
        if self.weights.is_some() && weight != 0.0 {
            vector::scale_in_place(&mut out, 1.0 / weight);
        }
        out
    }

    fn end_points(&self) -> (f64, f64) {
        self.knots.domain(self.degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_clamped_quadratic_matches_bezier() {
        let points = vec![vec![0.0, 0.0], vec![0.5, 1.0], vec![1.0, 0.0]];
        let curve = BSplineCurve::clamped(points, 2).unwrap();
        assert_eq!(curve.degree(), 2);
        assert_eq!(curve.evaluate(0.0), vec![0.0, 0.0]);
        let end = curve.evaluate(1.0);
        assert_abs_diff_eq!(end[0], 1.0, epsilon = 1e-12);
        let mid = curve.evaluate(0.5);
        assert_abs_diff_eq!(mid[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(mid[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_degree_from_knot_count() {
        let curve = BSplineCurve::new(
            vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
            vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0],
        )
        .unwrap();
        assert_eq!(curve.degree(), 2);
        assert_eq!(curve.end_points(), (0.0, 3.0));
    }

    #[test]
    fn test_rational_quarter_circle() {
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let curve = BSplineCurve::rational(
            vec![vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0]],
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            vec![1.0, w, 1.0],
        )
        .unwrap();
        for i in 0..=10 {
            let p = curve.evaluate(i as f64 / 10.0);
            assert_abs_diff_eq!(p[0].hypot(p[1]), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rejects_short_knots_and_bad_weights() {
        assert!(BSplineCurve::new(vec![vec![0.0], vec![1.0]], vec![0.0, 1.0]).is_err());
        assert!(BSplineCurve::rational(
            vec![vec![0.0], vec![1.0]],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![1.0, 0.0],
        )
        .is_err());
    }
}
