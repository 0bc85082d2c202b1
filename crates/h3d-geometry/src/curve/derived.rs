//! Curves derived from another planar curve: involute, evolute, radial,
//! orthotomic, pedal, inverse, and catacaustic.
//!
//! The planar transforms read the first two components of the input curve
//! and its derivatives, and produce `[x, y, 0]`. Near singular points
//! (inflections for the evolute family, vanishing velocity for the pedal
//! family, the inversion center for the inverse) the results are infinite or
//! NaN; callers sweeping a parameter range must filter them.

use h3d_math::{vector, DVec2};

use super::CurveEvaluator;

fn planar(v: &[f64]) -> DVec2 {
    vector::to_dvec2(v)
}

fn out(p: DVec2) -> Vec<f64> {
    vec![p.x, p.y, 0.0]
}

/// Center-of-curvature offset `N * |v|^2 / (vx*ay - ax*vy)` where
/// `N = (-vy, vx)`. Infinite at inflection points.
fn curvature_offset<C: CurveEvaluator + ?Sized>(curve: &C, u: f64) -> DVec2 {
    let v = planar(&curve.velocity(u));
    let a = planar(&curve.accel(u));
    let det = v.x * a.y - a.x * v.y;
    DVec2::new(-v.y, v.x) * (v.length_squared() / det)
}

/// Traced by the end of a taut string unwound from the curve:
/// `P(u) - s(u) * T(u)` with `s` the arc length and `T` the unit tangent.
/// Works in any dimension.
pub struct Involute<C>(C);

impl<C: CurveEvaluator> CurveEvaluator for Involute<C> {
    fn evaluate(&self, u: f64) -> Vec<f64> {
        let mut p = self.0.evaluate(u);
        let tangent = self.0.tangent(u);
        vector::add_scaled_in_place(&mut p, &tangent, -self.0.arc_length(u));
        p
    }

    fn end_points(&self) -> (f64, f64) {
        self.0.end_points()
    }
}

/// Locus of the centers of curvature.
pub struct Evolute<C>(C);

impl<C: CurveEvaluator> CurveEvaluator for Evolute<C> {
    fn evaluate(&self, u: f64) -> Vec<f64> {
        out(planar(&self.0.evaluate(u)) + curvature_offset(&self.0, u))
    }

    fn end_points(&self) -> (f64, f64) {
        self.0.end_points()
    }
}

/// The radius-of-curvature vectors drawn from a fixed point `origin`.
pub struct RadialCurve<C> {
    curve: C,
    origin: DVec2,
}

impl<C: CurveEvaluator> CurveEvaluator for RadialCurve<C> {
    fn evaluate(&self, u: f64) -> Vec<f64> {
        out(self.origin + curvature_offset(&self.curve, u))
    }

    fn end_points(&self) -> (f64, f64) {
        self.curve.end_points()
    }
}

/// Foot of the perpendicular from `origin` to the tangent line at `u`.
fn pedal_point<C: CurveEvaluator + ?Sized>(curve: &C, origin: DVec2, u: f64) -> DVec2 {
    let p = planar(&curve.evaluate(u));
    let v = planar(&curve.velocity(u));
    p + v * ((origin - p).dot(v) / v.length_squared())
}

/// Feet of the perpendiculars from `origin` to the tangent lines.
pub struct PedalCurve<C> {
    curve: C,
    origin: DVec2,
}

impl<C: CurveEvaluator> CurveEvaluator for PedalCurve<C> {
    fn evaluate(&self, u: f64) -> Vec<f64> {
        out(pedal_point(&self.curve, self.origin, u))
    }

    fn end_points(&self) -> (f64, f64) {
        self.curve.end_points()
    }
}

/// Reflections of `origin` in the tangent lines; the pedal curve scaled by
/// two about `origin`.
pub struct Orthotomic<C> {
    curve: C,
    origin: DVec2,
}

impl<C: CurveEvaluator> CurveEvaluator for Orthotomic<C> {
    fn evaluate(&self, u: f64) -> Vec<f64> {
        out(pedal_point(&self.curve, self.origin, u) * 2.0 - self.origin)
    }

    fn end_points(&self) -> (f64, f64) {
        self.curve.end_points()
    }
}

/// Inversion in the circle of `radius` about `origin`:
/// `O + (P - O) * radius^2 / |P - O|^2`.
pub struct InverseCurve<C> {
    curve: C,
    origin: DVec2,
    radius: f64,
}

impl<C: CurveEvaluator> CurveEvaluator for InverseCurve<C> {
    fn evaluate(&self, u: f64) -> Vec<f64> {
        let d = planar(&self.curve.evaluate(u)) - self.origin;
        out(self.origin + d * (self.radius * self.radius / d.length_squared()))
    }

    fn end_points(&self) -> (f64, f64) {
        self.curve.end_points()
    }
}

pub fn involute<C: CurveEvaluator>(curve: C) -> Involute<C> {
    Involute(curve)
}

pub fn evolute<C: CurveEvaluator>(curve: C) -> Evolute<C> {
    Evolute(curve)
}

pub fn radial_curve<C: CurveEvaluator>(curve: C, ox: f64, oy: f64) -> RadialCurve<C> {
    RadialCurve {
        curve,
        origin: DVec2::new(ox, oy),
    }
}

pub fn pedal_curve<C: CurveEvaluator>(curve: C, ox: f64, oy: f64) -> PedalCurve<C> {
    PedalCurve {
        curve,
        origin: DVec2::new(ox, oy),
    }
}

pub fn orthotomic<C: CurveEvaluator>(curve: C, ox: f64, oy: f64) -> Orthotomic<C> {
    Orthotomic {
        curve,
        origin: DVec2::new(ox, oy),
    }
}

pub fn inverse_curve<C: CurveEvaluator>(curve: C, ox: f64, oy: f64, radius: f64) -> InverseCurve<C> {
    InverseCurve {
        curve,
        origin: DVec2::new(ox, oy),
        radius,
    }
}

/// Envelope of rays from a light source at `(ox, oy)` reflected by the
/// curve: the evolute of the orthotomic.
pub fn catacaustic<C: CurveEvaluator>(curve: C, ox: f64, oy: f64) -> Evolute<Orthotomic<C>> {
    evolute(orthotomic(curve, ox, oy))
}
