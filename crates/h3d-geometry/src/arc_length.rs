//! Arc-length reparameterization.

use h3d_core::{Result, TessellationConfig, Validate};
use h3d_math::vector;
use rayon::prelude::*;

use crate::curve::CurveEvaluator;

const GL_NODES: [f64; 5] = [
    0.0,
    -0.538_469_310_105_683_1,
    0.538_469_310_105_683_1,
    -0.906_179_845_938_664,
    0.906_179_845_938_664,
];
const GL_WEIGHTS: [f64; 5] = [
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
    0.236_926_885_056_189_1,
];

/// Five-point Gauss-Legendre quadrature of `f` over `[a, b]`.
pub(crate) fn gauss_legendre<F: Fn(f64) -> f64>(f: F, a: f64, b: f64) -> f64 {
    let half = 0.5 * (b - a);
    let mid = 0.5 * (a + b);
    GL_NODES
        .iter()
        .zip(GL_WEIGHTS)
        .map(|(&x, w)| w * f(mid + half * x))
        .sum::<f64>()
        * half
}

/// A curve re-parameterized so that its parameter is the distance travelled
/// along the original curve.
///
/// Built from a table of cumulative lengths over equal parameter intervals;
/// lookups interpolate linearly inside an interval, which is exact for
/// constant-speed curves (lines, circles).
pub struct ArcLengthParam<C> {
    curve: C,
    params: Vec<f64>,
    lengths: Vec<f64>,
}

impl<C: CurveEvaluator> ArcLengthParam<C> {
    pub fn new(curve: C) -> Self {
        Self::with_samples(curve, TessellationConfig::default().arc_length_samples)
    }

    /// # Errors
    /// `InvalidParameter` if `config` does not validate.
    pub fn with_config(curve: C, config: &TessellationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_samples(curve, config.arc_length_samples))
    }

    pub fn with_samples(curve: C, samples: usize) -> Self {
        let samples = samples.max(1);
        let (start, end) = curve.end_points();
        let step = (end - start) / samples as f64;
        let params: Vec<f64> = (0..=samples).map(|i| start + step * i as f64).collect();

        let pieces: Vec<f64> = params
            .par_windows(2)
            .map(|w| gauss_legendre(|t| vector::length(&curve.velocity(t)), w[0], w[1]))
            .collect();

        let mut lengths = Vec::with_capacity(params.len());
        let mut total = 0.0;
        lengths.push(0.0);
        for piece in pieces {
            total += piece;
            lengths.push(total);
        }

        Self {
            curve,
            params,
            lengths,
        }
    }

    pub fn total_length(&self) -> f64 {
        self.lengths[self.lengths.len() - 1]
    }

    pub fn inner(&self) -> &C {
        &self.curve
    }

    /// Original curve parameter at distance `s` from the start. Distances
    /// outside `[0, total_length]` extrapolate from the nearest interval.
    pub fn param_at(&self, s: f64) -> f64 {
        let last = self.lengths.len() - 2;
        let i = match self
            .lengths
            .binary_search_by(|len| len.total_cmp(&s))
        {
            Ok(i) => i.min(last),
            Err(i) => i.saturating_sub(1).min(last),
        };
        let (l0, l1) = (self.lengths[i], self.lengths[i + 1]);
        let (t0, t1) = (self.params[i], self.params[i + 1]);
        if l1 == l0 {
            return t0;
        }
        t0 + (t1 - t0) * (s - l0) / (l1 - l0)
    }
}

impl<C: CurveEvaluator> CurveEvaluator for ArcLengthParam<C> {
    fn evaluate(&self, s: f64) -> Vec<f64> {
        self.curve.evaluate(self.param_at(s))
    }

    fn end_points(&self) -> (f64, f64) {
        (0.0, self.total_length())
    }

    /// Unit tangent of the original curve.
    fn velocity(&self, s: f64) -> Vec<f64> {
        self.curve.tangent(self.param_at(s))
    }

    fn arc_length(&self, s: f64) -> f64 {
        s
    }

    fn is_closed(&self) -> bool {
        self.curve.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::FnCurve;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quadrature_is_exact_for_low_degree() {
        let v = gauss_legendre(|x| x * x * x + 2.0 * x, 0.0, 2.0);
        assert_abs_diff_eq!(v, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uneven_speed_line() {
        // Moves along x with speed 2u; length at u is u^2.
        let curve = FnCurve::new(|u| vec![u * u, 0.0]);
        let param = ArcLengthParam::with_samples(curve, 64);
        assert_abs_diff_eq!(param.total_length(), 1.0, epsilon = 1e-9);
        // Halfway along the length is at u = sqrt(0.5).
        assert_abs_diff_eq!(param.param_at(0.5), 0.5f64.sqrt(), epsilon = 1e-3);
        let p = param.evaluate(0.25);
        assert_abs_diff_eq!(p[0], 0.25, epsilon = 1e-3);
    }

    #[test]
    fn test_end_points_and_velocity() {
        let curve = FnCurve::new(|u| vec![6.0 * u, 8.0 * u]);
        let param = curve.to_arc_length_param();
        let (a, b) = param.end_points();
        assert_eq!(a, 0.0);
        assert_abs_diff_eq!(b, 10.0, epsilon = 1e-9);
        let v = param.velocity(3.0);
        assert_abs_diff_eq!(v[0], 0.6, epsilon = 1e-9);
        assert_abs_diff_eq!(v[1], 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_with_config_validates() {
        let config = TessellationConfig {
            arc_length_samples: 8,
            ..Default::default()
        };
        let param = ArcLengthParam::with_config(FnCurve::new(|u| vec![3.0 * u, 4.0 * u]), &config).unwrap();
        assert_abs_diff_eq!(param.total_length(), 5.0, epsilon = 1e-9);

        let bad = TessellationConfig {
            arc_length_samples: 0,
            ..Default::default()
        };
        assert!(ArcLengthParam::with_config(FnCurve::new(|u| vec![u]), &bad).is_err());
    }

    #[test]
    fn test_extrapolates_past_end() {
        let curve = FnCurve::new(|u| vec![u, 0.0]);
        let param = ArcLengthParam::with_samples(curve, 4);
        assert_abs_diff_eq!(param.param_at(1.5), 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(param.param_at(-0.5), -0.5, epsilon = 1e-9);
    }
}
