//! Planar circle with analytic derivatives.

use std::f64::consts::TAU;

use h3d_math::DVec2;
use serde::{Deserialize, Serialize};

use super::CurveEvaluator;

/// A circle in the XY plane, parameterized by the angle swept from `phase`
/// over `[0, 2*PI]`. Evaluates to `[x, y, 0]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
    /// Angle (radians) of the point at parameter 0.
    pub phase: f64,
    pub clockwise: bool,
}

impl Circle {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self {
            center,
            radius,
            phase: 0.0,
            clockwise: false,
        }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn reversed(mut self) -> Self {
        self.clockwise = !self.clockwise;
        self
    }

    fn sign(&self) -> f64 {
        if self.clockwise {
            -1.0
        } else {
            1.0
        }
    }

    fn angle(&self, t: f64) -> f64 {
        self.phase + self.sign() * t
    }
}

impl CurveEvaluator for Circle {
    fn evaluate(&self, t: f64) -> Vec<f64> {
        let (s, c) = self.angle(t).sin_cos();
        vec![
            self.center.x + self.radius * c,
            self.center.y + self.radius * s,
            0.0,
        ]
    }

    fn end_points(&self) -> (f64, f64) {
        (0.0, TAU)
    }

    fn velocity(&self, t: f64) -> Vec<f64> {
        let (s, c) = self.angle(t).sin_cos();
        let k = self.sign() * self.radius;
        vec![-k * s, k * c, 0.0]
    }

    fn accel(&self, t: f64) -> Vec<f64> {
        let (s, c) = self.angle(t).sin_cos();
        vec![-self.radius * c, -self.radius * s, 0.0]
    }

    fn arc_length(&self, t: f64) -> f64 {
        self.radius.abs() * t
    }

    fn is_closed(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_points_on_circle() {
        let circle = Circle::new(DVec2::new(1.0, -1.0), 2.0);
        for i in 0..8 {
            let p = circle.evaluate(i as f64 * PI / 4.0);
            let d = DVec2::new(p[0], p[1]) - circle.center;
            assert_abs_diff_eq!(d.length(), 2.0, epsilon = 1e-12);
            assert_eq!(p[2], 0.0);
        }
    }

    #[test]
    fn test_clockwise_velocity() {
        let circle = Circle::new(DVec2::ZERO, 1.0).with_phase(PI).reversed();
        // At the leftmost point moving clockwise, the curve heads up.
        let v = circle.velocity(0.0);
        assert_abs_diff_eq!(v[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_analytic_matches_numeric_velocity() {
        let circle = Circle::new(DVec2::ZERO, 3.0).with_phase(0.3);
        let copy = circle.clone();
        let numeric = crate::curve::FnCurve::new(move |t| copy.evaluate(t));
        let a = circle.velocity(1.1);
        let b = numeric.velocity(1.1);
        assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-6);
        assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-6);
    }

    #[test]
    fn test_arc_length() {
        let circle = Circle::new(DVec2::ZERO, 2.0);
        assert_abs_diff_eq!(circle.arc_length(TAU), 4.0 * PI, epsilon = 1e-12);
        assert!(circle.is_closed());
    }
}
