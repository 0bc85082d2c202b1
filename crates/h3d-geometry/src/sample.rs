//! Discretization of evaluators into point lists.

use h3d_core::{H3dError, Result, TessellationConfig};
use h3d_math::vector;
use rayon::prelude::*;

use crate::curve::CurveEvaluator;
use crate::surface::SurfaceEvaluator;

/// Parameter fractions of a span sampled for chord deviation. Sampling more
/// than the midpoint catches S-shaped spans whose midpoint lies on the chord.
const CHECK_FRACTIONS: [f64; 3] = [0.25, 0.5, 0.75];

/// `n + 1` evenly spaced samples over the curve's domain, endpoints
/// included.
pub fn sample_curve<C: CurveEvaluator + ?Sized>(curve: &C, n: usize) -> Result<Vec<Vec<f64>>> {
    if n == 0 {
        return Err(H3dError::InvalidParameter(
            "curve sampling needs at least one segment".into(),
        ));
    }
    let (start, end) = curve.end_points();
    Ok((0..=n)
        .into_par_iter()
        .map(|i| curve.evaluate(start + (end - start) * i as f64 / n as f64))
        .collect())
}

/// `(vn + 1)` rows of `(un + 1)` samples over the surface's domain, row-major
/// with `v` as the row index.
pub fn sample_surface<S: SurfaceEvaluator + ?Sized>(
    surface: &S,
    un: usize,
    vn: usize,
) -> Result<Vec<Vec<Vec<f64>>>> {
    if un == 0 || vn == 0 {
        return Err(H3dError::InvalidParameter(format!(
            "surface sampling needs at least one segment per axis, got {un}x{vn}"
        )));
    }
    let [u0, u1, v0, v1] = surface.end_points();
    Ok((0..=vn)
        .into_par_iter()
        .map(|j| {
            let v = v0 + (v1 - v0) * j as f64 / vn as f64;
            (0..=un)
                .map(|i| surface.evaluate(u0 + (u1 - u0) * i as f64 / un as f64, v))
                .collect()
        })
        .collect())
}

/// Polyline approximating `curve`, subdividing any parameter span whose
/// interior strays more than `tolerance` from its chord. Recursion stops at
/// `max_depth` (capped at [`TessellationConfig::MAX_SUBDIVISION_DEPTH`])
/// regardless of deviation.
///
/// Returns the parameters of the emitted points alongside the points.
pub fn adaptive_polyline<C: CurveEvaluator + ?Sized>(
    curve: &C,
    tolerance: f64,
    max_depth: u32,
) -> (Vec<f64>, Vec<Vec<f64>>) {
    let (t0, t1) = curve.end_points();
    let first = curve.evaluate(t0);
    let last = curve.evaluate(t1);
    let mut params = vec![t0];
    let mut points = vec![first.clone()];
    let depth = max_depth.min(TessellationConfig::MAX_SUBDIVISION_DEPTH);
    subdivide(curve, (t0, &first), (t1, &last), tolerance, depth, &mut params, &mut points);
    (params, points)
}

fn subdivide<C: CurveEvaluator + ?Sized>(
    curve: &C,
    (t0, p0): (f64, &[f64]),
    (t1, p1): (f64, &[f64]),
    tolerance: f64,
    depth: u32,
    params: &mut Vec<f64>,
    points: &mut Vec<Vec<f64>>,
) {
    let checks: Vec<Vec<f64>> = CHECK_FRACTIONS
        .iter()
        .map(|f| curve.evaluate(t0 + (t1 - t0) * f))
        .collect();
    let deviation = CHECK_FRACTIONS
        .iter()
        .zip(&checks)
        .map(|(&f, p)| vector::length(&vector::sub(p, &vector::lerp(p0, p1, f))))
        .fold(0.0, f64::max);

    if depth == 0 || !(deviation > tolerance) {
        params.push(t1);
        points.push(p1.to_vec());
        return;
    }
    let t_mid = 0.5 * (t0 + t1);
    let mid = &checks[1];
    subdivide(curve, (t0, p0), (t_mid, mid), tolerance, depth - 1, params, points);
    subdivide(curve, (t_mid, mid), (t1, p1), tolerance, depth - 1, params, points);
}
