//! Roulettes: the path of a pole point fixed to a curve that rolls without
//! slipping along another curve.
//!
//! Both curves are reparameterized by arc length. At distance `s` the
//! rolling curve touches the fixed curve at `F(s)` with matching tangents,
//! so the pole, expressed in complex numbers, is at
//! `F(s) + (pole - R(s)) * F'(s) / R'(s)`.

use std::f64::consts::{PI, TAU};

use h3d_core::{H3dError, Result};
use h3d_math::DVec2;
use num_complex::Complex64;

use super::{Circle, CurveEvaluator, LineCurve};
use crate::arc_length::ArcLengthParam;

/// Largest denominator tried when deciding how many turns close a curve.
const MAX_CLOSING_TURNS: u64 = 1000;

pub struct Roulette<R, F> {
    rolling: ArcLengthParam<R>,
    fixed: ArcLengthParam<F>,
    pole: Complex64,
    revolutions: f64,
}

fn complex(v: &[f64]) -> Complex64 {
    Complex64::new(
        v.first().copied().unwrap_or(0.0),
        v.get(1).copied().unwrap_or(0.0),
    )
}

/// Position along a curve of `length`, wrapped for closed curves.
fn wrap(s: f64, length: f64, closed: bool) -> f64 {
    if closed && length > 0.0 {
        s.rem_euclid(length)
    } else {
        s
    }
}

/// Denominator `q` of the fraction `p / q` equal to `x` within `1e-9`,
/// searched by continued fractions.
fn rational_denominator(x: f64, max_den: u64) -> Option<u64> {
    if !x.is_finite() || x <= 0.0 {
        return None;
    }
    let (mut h0, mut h1) = (0.0f64, 1.0f64);
    let (mut k0, mut k1) = (1.0f64, 0.0f64);
    let mut rest = x;
    for _ in 0..64 {
        let a = rest.floor();
        let (h2, k2) = (a * h1 + h0, a * k1 + k0);
        if k2 > max_den as f64 {
            return None;
        }
        if (h2 / k2 - x).abs() < 1e-9 * x.max(1.0) {
            return Some(k2 as u64);
        }
        (h0, h1, k0, k1) = (h1, h2, k1, k2);
        let frac = rest - a;
        if frac.abs() < 1e-12 {
            return None;
        }
        rest = 1.0 / frac;
    }
    None
}

/// Turns of the fixed circle after which a circle rolling on it returns to
/// its starting configuration; 1 for irrational-looking ratios.
fn closing_revolutions(fixed_radius: f64, rolling_radius: f64) -> f64 {
    rational_denominator(fixed_radius / rolling_radius, MAX_CLOSING_TURNS).map_or(1.0, |q| q as f64)
}

impl<R: CurveEvaluator, F: CurveEvaluator> Roulette<R, F> {
    /// `revolutions` is the number of passes over the fixed curve's length.
    pub fn new(rolling: R, fixed: F, pole: DVec2, revolutions: f64) -> Self {
        Self {
            rolling: ArcLengthParam::new(rolling),
            fixed: ArcLengthParam::new(fixed),
            pole: Complex64::new(pole.x, pole.y),
            revolutions,
        }
    }

    pub fn revolutions(&self) -> f64 {
        self.revolutions
    }
}

impl<R: CurveEvaluator, F: CurveEvaluator> CurveEvaluator for Roulette<R, F> {
    fn evaluate(&self, s: f64) -> Vec<f64> {
        let sf = wrap(s, self.fixed.total_length(), self.fixed.is_closed());
        let sr = wrap(s, self.rolling.total_length(), self.rolling.is_closed());
        let contact = complex(&self.fixed.evaluate(sf));
        let fixed_dir = complex(&self.fixed.velocity(sf));
        let rolling_pt = complex(&self.rolling.evaluate(sr));
        let rolling_dir = complex(&self.rolling.velocity(sr));
        let p = contact + (self.pole - rolling_pt) * fixed_dir / rolling_dir;
        vec![p.re, p.im, 0.0]
    }

    fn end_points(&self) -> (f64, f64) {
        (0.0, self.fixed.total_length() * self.revolutions)
    }
}

fn check_radius(name: &str, r: f64) -> Result<()> {
    if !(r > 0.0) || !r.is_finite() {
        return Err(H3dError::Geometry(format!("{name} must be positive, got {r}")));
    }
    Ok(())
}

/// A circle of radius `inner_radius` rolling inside a circle of radius
/// `outer_radius`, tracing a pole at `dist_from_inner_center` from the
/// rolling center, initially at `rotation_degrees` from the +X axis.
///
/// Fixed circle: center origin, counterclockwise from angle 0. Rolling
/// circle: center `(R - r, 0)`, counterclockwise from angle 0.
pub fn hypotrochoid(
    outer_radius: f64,
    inner_radius: f64,
    dist_from_inner_center: f64,
    rotation_degrees: f64,
) -> Result<Roulette<Circle, Circle>> {
    check_radius("outer radius", outer_radius)?;
    check_radius("inner radius", inner_radius)?;
    let center = DVec2::new(outer_radius - inner_radius, 0.0);
    let pole = center + DVec2::from_angle(rotation_degrees.to_radians()) * dist_from_inner_center;
    Ok(Roulette::new(
        Circle::new(center, inner_radius),
        Circle::new(DVec2::ZERO, outer_radius),
        pole,
        closing_revolutions(outer_radius, inner_radius),
    ))
}

/// A circle of radius `inner_radius` rolling outside a circle of radius
/// `outer_radius`.
///
/// Rolling circle: center `(R + r, 0)`, clockwise from angle PI, so the
/// unrotated pole sits between the two centers.
pub fn epitrochoid(
    outer_radius: f64,
    inner_radius: f64,
    dist_from_inner_center: f64,
    rotation_degrees: f64,
) -> Result<Roulette<Circle, Circle>> {
    check_radius("outer radius", outer_radius)?;
    check_radius("inner radius", inner_radius)?;
    let center = DVec2::new(outer_radius + inner_radius, 0.0);
    let pole = center + DVec2::from_angle(PI + rotation_degrees.to_radians()) * dist_from_inner_center;
    Ok(Roulette::new(
        Circle::new(center, inner_radius).with_phase(PI).reversed(),
        Circle::new(DVec2::ZERO, outer_radius),
        pole,
        closing_revolutions(outer_radius, inner_radius),
    ))
}

/// A circle of `radius` rolling along the X axis, one full turn of the
/// circle per revolution. With rotation 0 the pole starts straight below
/// the center: `(r*t - d*sin t, r - d*cos t)`.
pub fn trochoid(radius: f64, dist_from_center: f64, rotation_degrees: f64) -> Result<Roulette<Circle, LineCurve>> {
    check_radius("radius", radius)?;
    let center = DVec2::new(0.0, radius);
    let pole = center
        + DVec2::from_angle(rotation_degrees.to_radians() - PI / 2.0) * dist_from_center;
    Ok(Roulette::new(
        Circle::new(center, radius).with_phase(-PI / 2.0),
        LineCurve::new(DVec2::ZERO, DVec2::new(TAU * radius, 0.0)),
        pole,
        1.0,
    ))
}

/// Rose curve `r = 2d * cos(n * theta)` as the hypotrochoid with
/// `R = 2nd / (n + 1)`, `r = (n - 1)d / (n + 1)` and pole distance `d`.
///
/// # Errors
/// Fails unless `n > 1` and `d > 0`.
pub fn rose(n: f64, dist_from_inner_center: f64, rotation_degrees: f64) -> Result<Roulette<Circle, Circle>> {
    if !(n > 1.0) {
        return Err(H3dError::Geometry(format!("rose needs n > 1, got {n}")));
    }
    check_radius("distance", dist_from_inner_center)?;
    let d = dist_from_inner_center;
    hypotrochoid(
        2.0 * n * d / (n + 1.0),
        (n - 1.0) * d / (n + 1.0),
        d,
        rotation_degrees,
    )
}
