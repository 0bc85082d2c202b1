//! Knot vectors and Cox-de Boor basis evaluation.

use h3d_core::{H3dError, Result};
use serde::{Deserialize, Serialize};

/// A validated, non-decreasing knot vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnotVector(Vec<f64>);

impl KnotVector {
    /// # Errors
    /// Fails when the knots are empty, non-finite, or decreasing.
    pub fn new(knots: Vec<f64>) -> Result<Self> {
        if knots.is_empty() {
            return Err(H3dError::Geometry("knot vector is empty".into()));
        }
        if knots.iter().any(|k| !k.is_finite()) {
            return Err(H3dError::Geometry("knot vector has non-finite values".into()));
        }
        if let Some(i) = knots.windows(2).position(|w| w[1] < w[0]) {
            return Err(H3dError::Geometry(format!(
                "knot {} ({}) is less than the knot before it ({})",
                i + 1,
                knots[i + 1],
                knots[i]
            )));
        }
        Ok(Self(knots))
    }

    /// Knots for `control_count` points that make the curve start and end at
    /// the first and last control points: `degree + 1` repeated knots at each
    /// end with evenly spaced interior knots, over `[0, 1]`.
    pub fn clamped(control_count: usize, degree: usize) -> Result<Self> {
        if control_count <= degree {
            return Err(H3dError::Geometry(format!(
                "degree {degree} needs more than {control_count} control points"
            )));
        }
        let interior = control_count - degree;
        let knots = (0..control_count + degree + 1)
            .map(|i| {
                if i <= degree {
                    0.0
                } else if i >= control_count {
                    1.0
                } else {
                    (i - degree) as f64 / interior as f64
                }
            })
            .collect();
        Ok(Self(knots))
    }

    /// Evenly spaced knots over `[0, 1]` for `control_count` points.
    pub fn uniform(control_count: usize, degree: usize) -> Self {
        let len = control_count + degree + 1;
        let last = (len - 1).max(1) as f64;
        Self((0..len).map(|i| i as f64 / last).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Valid parameter range for a spline of `degree`.
    pub fn domain(&self, degree: usize) -> (f64, f64) {
        (self.0[degree], self.0[self.0.len() - degree - 1])
    }

    /// Span index `i` with `knots[i] <= t < knots[i + 1]`, clamped to the
    /// valid spans `[degree, last]` where `last` is the control point count
    /// minus one.
    pub fn find_span(&self, degree: usize, last: usize, t: f64) -> usize {
        let k = &self.0;
        if t >= k[last + 1] {
            return last;
        }
        if t <= k[degree] {
            return degree;
        }
        let (mut low, mut high) = (degree, last + 1);
        let mut mid = (low + high) / 2;
        while t < k[mid] || t >= k[mid + 1] {
            if t < k[mid] {
                high = mid;
            } else {
                low = mid;
            }
            mid = (low + high) / 2;
        }
        mid
    }

    /// The `degree + 1` non-zero basis values `N_{span-degree..=span}(t)`.
    pub fn basis(&self, degree: usize, span: usize, t: f64) -> Vec<f64> {
        let k = &self.0;
        let mut out = vec![0.0; degree + 1];
        let mut left = vec![0.0; degree + 1];
        let mut right = vec![0.0; degree + 1];
        out[0] = 1.0;
        for j in 1..=degree {
            left[j] = t - k[span + 1 - j];
            right[j] = k[span + j] - t;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = out[r] / (right[r + 1] + left[j - r]);
                out[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            out[j] = saved;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_find_span() {
        let knots = KnotVector::new(vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0]).unwrap();
        assert_eq!(knots.find_span(2, 4, 0.0), 2);
        assert_eq!(knots.find_span(2, 4, 1.5), 3);
        assert_eq!(knots.find_span(2, 4, 2.5), 4);
        assert_eq!(knots.find_span(2, 4, 3.0), 4);
    }

    #[test]
    fn test_partition_of_unity() {
        let knots = KnotVector::clamped(6, 3).unwrap();
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            let span = knots.find_span(3, 5, t);
            let sum: f64 = knots.basis(3, span, t).iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_clamped_layout() {
        let knots = KnotVector::clamped(5, 2).unwrap();
        assert_eq!(knots.as_slice(), &[0.0, 0.0, 0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0, 1.0, 1.0]);
        assert_eq!(knots.domain(2), (0.0, 1.0));
        assert!(KnotVector::clamped(2, 2).is_err());
    }

    #[test]
    fn test_uniform_layout() {
        let knots = KnotVector::uniform(3, 1);
        assert_eq!(knots.as_slice(), &[0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);
    }

    #[test]
    fn test_rejects_decreasing() {
        assert!(KnotVector::new(vec![0.0, 1.0, 0.5]).is_err());
        assert!(KnotVector::new(vec![]).is_err());
    }
}
