//! Curve evaluator trait, closure adapter, and concrete curve types.

mod circle;
mod line;
pub mod derived;
pub mod polar;
pub mod roulette;

use std::sync::Arc;

use h3d_math::vector;

use crate::arc_length::{gauss_legendre, ArcLengthParam};

pub use circle::Circle;
pub use line::LineCurve;
pub use polar::{polar_curve, spiral_curve, PolarCurve};
pub use roulette::Roulette;

/// Parameter step for the finite-difference derivative fallbacks.
pub(crate) const DERIV_STEP: f64 = 1e-5;

/// Subintervals used by the default arc-length quadrature.
const ARC_LENGTH_PIECES: usize = 32;

/// A parametric curve `u -> R^k`.
///
/// Only [`evaluate`](CurveEvaluator::evaluate) is required. The derivative
/// and length queries fall back to numerical approximations; implementations
/// that know them analytically should override them.
pub trait CurveEvaluator: Send + Sync {
    /// Point on the curve at parameter `u`.
    fn evaluate(&self, u: f64) -> Vec<f64>;

    /// Parameter domain `(start, end)`.
    fn end_points(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    /// First derivative with respect to `u`.
    fn velocity(&self, u: f64) -> Vec<f64> {
        let a = self.evaluate(u - DERIV_STEP);
        let b = self.evaluate(u + DERIV_STEP);
        vector::scale(&vector::sub(&b, &a), 0.5 / DERIV_STEP)
    }

    /// Second derivative with respect to `u`.
    fn accel(&self, u: f64) -> Vec<f64> {
        let a = self.velocity(u - DERIV_STEP);
        let b = self.velocity(u + DERIV_STEP);
        vector::scale(&vector::sub(&b, &a), 0.5 / DERIV_STEP)
    }

    /// Unit-length velocity. Zero where the velocity vanishes.
    fn tangent(&self, u: f64) -> Vec<f64> {
        vector::normalize(&self.velocity(u))
    }

    /// Length of the curve from the start of its domain to `u`
    /// (negative when `u` precedes the start).
    fn arc_length(&self, u: f64) -> f64 {
        let (start, _) = self.end_points();
        let step = (u - start) / ARC_LENGTH_PIECES as f64;
        (0..ARC_LENGTH_PIECES)
            .map(|i| {
                let t0 = start + step * i as f64;
                gauss_legendre(|t| vector::length(&self.velocity(t)), t0, t0 + step)
            })
            .sum()
    }

    /// Whether `evaluate(start) == evaluate(end)` by construction.
    fn is_closed(&self) -> bool {
        false
    }

    /// Reparameterize this curve by arc length.
    fn to_arc_length_param(self) -> ArcLengthParam<Self>
    where
        Self: Sized,
    {
        ArcLengthParam::new(self)
    }
}

macro_rules! forward_curve_evaluator {
    ($($ty:ty),*) => {$(
        impl<C: CurveEvaluator + ?Sized> CurveEvaluator for $ty {
            fn evaluate(&self, u: f64) -> Vec<f64> {
                (**self).evaluate(u)
            }
            fn end_points(&self) -> (f64, f64) {
                (**self).end_points()
            }
            fn velocity(&self, u: f64) -> Vec<f64> {
                (**self).velocity(u)
            }
            fn accel(&self, u: f64) -> Vec<f64> {
                (**self).accel(u)
            }
            fn tangent(&self, u: f64) -> Vec<f64> {
                (**self).tangent(u)
            }
            fn arc_length(&self, u: f64) -> f64 {
                (**self).arc_length(u)
            }
            fn is_closed(&self) -> bool {
                (**self).is_closed()
            }
        }
    )*};
}

forward_curve_evaluator!(Box<C>, Arc<C>, &C);

/// Adapts a closure `u -> Vec<f64>` into a [`CurveEvaluator`].
#[derive(Clone)]
pub struct FnCurve<F> {
    func: F,
    ends: (f64, f64),
}

impl<F> FnCurve<F>
where
    F: Fn(f64) -> Vec<f64> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            ends: (0.0, 1.0),
        }
    }

    pub fn with_end_points(mut self, start: f64, end: f64) -> Self {
        self.ends = (start, end);
        self
    }
}

impl<F> CurveEvaluator for FnCurve<F>
where
    F: Fn(f64) -> Vec<f64> + Send + Sync,
{
    fn evaluate(&self, u: f64) -> Vec<f64> {
        (self.func)(u)
    }

    fn end_points(&self) -> (f64, f64) {
        self.ends
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn parabola() -> FnCurve<impl Fn(f64) -> Vec<f64> + Send + Sync> {
        FnCurve::new(|u| vec![u, u * u])
    }

    #[test]
    fn test_numeric_velocity_and_accel() {
        let c = parabola();
        let v = c.velocity(0.5);
        assert_abs_diff_eq!(v[0], 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(v[1], 1.0, epsilon = 1e-8);
        let a = c.accel(0.5);
        assert_abs_diff_eq!(a[0], 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(a[1], 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_numeric_arc_length_of_line() {
        let line = FnCurve::new(|u| vec![3.0 * u, 4.0 * u]);
        assert_abs_diff_eq!(line.arc_length(1.0), 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(line.arc_length(0.5), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_numeric_arc_length_of_parabola() {
        // Closed form of the length of y = x^2 over [0, 1].
        let exact = 0.5 * 5f64.sqrt() + 0.25 * (2.0 + 5f64.sqrt()).ln();
        assert_abs_diff_eq!(parabola().arc_length(1.0), exact, epsilon = 1e-8);
    }

    #[test]
    fn test_boxed_evaluator_forwards_end_points() {
        let boxed: Box<dyn CurveEvaluator> =
            Box::new(FnCurve::new(|u| vec![u]).with_end_points(-2.0, 3.0));
        assert_eq!(boxed.end_points(), (-2.0, 3.0));
        assert_eq!(boxed.evaluate(1.5), vec![1.5]);
    }

    #[test]
    fn test_tangent_is_unit() {
        let t = parabola().tangent(1.0);
        assert_abs_diff_eq!(vector::length(&t), 1.0, epsilon = 1e-9);
    }
}
