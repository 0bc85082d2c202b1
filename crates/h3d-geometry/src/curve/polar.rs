//! Curves defined by a radius as a function of angle.

use std::f64::consts::TAU;

use super::CurveEvaluator;

/// `evaluate(theta) = r(theta) * (cos(theta + phase), sin(theta + phase), 0)`
/// with `theta` over `[0, 2*PI]` unless changed with
/// [`with_end_points`](PolarCurve::with_end_points).
pub struct PolarCurve<F> {
    radius: F,
    phase: f64,
    ends: (f64, f64),
}

impl<F> PolarCurve<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    pub fn new(radius: F, phase_degrees: f64) -> Self {
        Self {
            radius,
            phase: phase_degrees.to_radians(),
            ends: (0.0, TAU),
        }
    }

    pub fn with_end_points(mut self, start: f64, end: f64) -> Self {
        self.ends = (start, end);
        self
    }
}

impl<F> CurveEvaluator for PolarCurve<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, theta: f64) -> Vec<f64> {
        let r = (self.radius)(theta);
        let (s, c) = (theta + self.phase).sin_cos();
        vec![r * c, r * s, 0.0]
    }

    fn end_points(&self) -> (f64, f64) {
        self.ends
    }
}

pub fn polar_curve<F>(radius: F, phase_degrees: f64) -> PolarCurve<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    PolarCurve::new(radius, phase_degrees)
}

/// Archimedean spiral whose distance from the center grows by `radius` with
/// each full turn.
pub fn spiral_curve(radius: f64, phase_degrees: f64) -> PolarCurve<impl Fn(f64) -> f64 + Send + Sync> {
    PolarCurve::new(move |theta| radius * theta / TAU, phase_degrees)
}
