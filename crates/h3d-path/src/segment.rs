//! Path segments in absolute coordinates.

use std::f64::consts::TAU;

use h3d_core::{H3dError, Result};
use h3d_math::DVec2;
use serde::{Deserialize, Serialize};

/// One piece of a path. Every drawing segment records its own start point,
/// so segments can be evaluated on their own; `Close` returns to the start
/// of the current subpath and carries no coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    Line {
        from: DVec2,
        to: DVec2,
    },
    Quad {
        from: DVec2,
        ctrl: DVec2,
        to: DVec2,
    },
    Cubic {
        from: DVec2,
        ctrl1: DVec2,
        ctrl2: DVec2,
        to: DVec2,
    },
    /// Elliptical arc in SVG endpoint form.
    Arc {
        from: DVec2,
        radii: DVec2,
        /// Rotation of the ellipse's x axis, in degrees.
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: DVec2,
    },
    Close,
}

impl Segment {
    pub fn is_close(&self) -> bool {
        matches!(self, Segment::Close)
    }

    pub fn start(&self) -> Option<DVec2> {
        match *self {
            Segment::Line { from, .. }
            | Segment::Quad { from, .. }
            | Segment::Cubic { from, .. }
            | Segment::Arc { from, .. } => Some(from),
            Segment::Close => None,
        }
    }

    pub fn end(&self) -> Option<DVec2> {
        match *self {
            Segment::Line { to, .. }
            | Segment::Quad { to, .. }
            | Segment::Cubic { to, .. }
            | Segment::Arc { to, .. } => Some(to),
            Segment::Close => None,
        }
    }

    /// Point at `t` in `[0, 1]`.
    pub fn point(&self, t: f64) -> Option<DVec2> {
        let s = 1.0 - t;
        match *self {
            Segment::Line { from, to } => Some(from.lerp(to, t)),
            Segment::Quad { from, ctrl, to } => Some(from * (s * s) + ctrl * (2.0 * s * t) + to * (t * t)),
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => Some(
                from * (s * s * s)
                    + ctrl1 * (3.0 * s * s * t)
                    + ctrl2 * (3.0 * s * t * t)
                    + to * (t * t * t),
            ),
            Segment::Arc { .. } => Some(ArcGeometry::of(self).map_or_else(
                || self.start().unwrap_or_default().lerp(self.end().unwrap_or_default(), t),
                |arc| arc.point(t),
            )),
            Segment::Close => None,
        }
    }

    /// Exact length. Only lines (Euclidean distance) and closes (zero) are
    /// supported.
    ///
    /// # Errors
    /// `NotImplemented` for quadratic, cubic and arc segments.
    pub fn length(&self) -> Result<f64> {
        match *self {
            Segment::Line { from, to } => Ok(from.distance(to)),
            Segment::Close => Ok(0.0),
            Segment::Quad { .. } => Err(H3dError::NotImplemented("quadratic segment length".into())),
            Segment::Cubic { .. } => Err(H3dError::NotImplemented("cubic segment length".into())),
            Segment::Arc { .. } => Err(H3dError::NotImplemented("arc segment length".into())),
        }
    }

    /// Control points (including endpoints). Their hull contains the segment
    /// for everything but arcs.
    pub fn control_points(&self) -> Vec<DVec2> {
        match *self {
            Segment::Line { from, to } | Segment::Arc { from, to, .. } => vec![from, to],
            Segment::Quad { from, ctrl, to } => vec![from, ctrl, to],
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => vec![from, ctrl1, ctrl2, to],
            Segment::Close => Vec::new(),
        }
    }
}

/// Center parameterization of an SVG arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center: DVec2,
    pub radii: DVec2,
    /// Ellipse rotation in radians.
    pub phi: f64,
    pub start_angle: f64,
    /// Signed sweep; positive is counterclockwise.
    pub sweep_angle: f64,
}

fn vector_angle(u: DVec2, v: DVec2) -> f64 {
    u.perp_dot(v).atan2(u.dot(v))
}

impl ArcGeometry {
    /// Endpoint-to-center conversion, with out-of-range radii scaled up.
    /// `None` for non-arcs and for arcs that degenerate to a straight line
    /// (a zero radius) or to nothing (coincident endpoints).
    pub fn of(segment: &Segment) -> Option<Self> {
        let Segment::Arc {
            from,
            radii,
            x_rotation,
            large_arc,
            sweep,
            to,
        } = *segment
        else {
            return None;
        };
        let mut r = radii.abs();
        if from == to || r.x == 0.0 || r.y == 0.0 {
            return None;
        }
        let phi = x_rotation.to_radians();
        let (sin, cos) = phi.sin_cos();
        let half = (from - to) * 0.5;
        let p = DVec2::new(cos * half.x + sin * half.y, -sin * half.x + cos * half.y);

        let lambda = (p.x * p.x) / (r.x * r.x) + (p.y * p.y) / (r.y * r.y);
        if lambda > 1.0 {
            r *= lambda.sqrt();
        }
        let (rx2, ry2) = (r.x * r.x, r.y * r.y);
        let num = rx2 * ry2 - rx2 * p.y * p.y - ry2 * p.x * p.x;
        let den = rx2 * p.y * p.y + ry2 * p.x * p.x;
        let sign = if large_arc == sweep { -1.0 } else { 1.0 };
        let coef = sign * (num / den).max(0.0).sqrt();
        let c = DVec2::new(coef * r.x * p.y / r.y, -coef * r.y * p.x / r.x);

        let mid = (from + to) * 0.5;
        let center = DVec2::new(cos * c.x - sin * c.y, sin * c.x + cos * c.y) + mid;

        let u = DVec2::new((p.x - c.x) / r.x, (p.y - c.y) / r.y);
        let v = DVec2::new((-p.x - c.x) / r.x, (-p.y - c.y) / r.y);
        let start_angle = vector_angle(DVec2::X, u);
        let mut sweep_angle = vector_angle(u, v);
        if !sweep && sweep_angle > 0.0 {
            sweep_angle -= TAU;
        } else if sweep && sweep_angle < 0.0 {
            sweep_angle += TAU;
        }

        Some(Self {
            center,
            radii: r,
            phi,
            start_angle,
            sweep_angle,
        })
    }

    pub fn point(&self, t: f64) -> DVec2 {
        let theta = self.start_angle + self.sweep_angle * t;
        let local = DVec2::new(self.radii.x * theta.cos(), self.radii.y * theta.sin());
        DVec2::from_angle(self.phi).rotate(local) + self.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn arc(large_arc: bool, sweep: bool) -> Segment {
        Segment::Arc {
            from: DVec2::new(1.0, 0.0),
            radii: DVec2::splat(1.0),
            x_rotation: 0.0,
            large_arc,
            sweep,
            to: DVec2::new(0.0, 1.0),
        }
    }

    #[test]
    fn test_line_length_and_point() {
        let seg = Segment::Line {
            from: DVec2::ZERO,
            to: DVec2::new(3.0, 4.0),
        };
        assert_eq!(seg.length().unwrap(), 5.0);
        assert_eq!(seg.point(0.5), Some(DVec2::new(1.5, 2.0)));
        assert_eq!(Segment::Close.length().unwrap(), 0.0);
        assert_eq!(Segment::Close.point(0.5), None);
    }

    #[test]
    fn test_curved_lengths_are_not_implemented() {
        let quad = Segment::Quad {
            from: DVec2::ZERO,
            ctrl: DVec2::ONE,
            to: DVec2::X,
        };
        assert!(matches!(quad.length(), Err(H3dError::NotImplemented(_))));
        assert!(matches!(arc(false, true).length(), Err(H3dError::NotImplemented(_))));
    }

    #[test]
    fn test_bezier_endpoints() {
        let cubic = Segment::Cubic {
            from: DVec2::ZERO,
            ctrl1: DVec2::new(0.0, 10.0),
            ctrl2: DVec2::new(10.0, 10.0),
            to: DVec2::new(10.0, 0.0),
        };
        assert_eq!(cubic.point(0.0), Some(DVec2::ZERO));
        assert_eq!(cubic.point(1.0), Some(DVec2::new(10.0, 0.0)));
        assert_eq!(cubic.point(0.5), Some(DVec2::new(5.0, 7.5)));
    }

    #[test]
    fn test_small_ccw_arc() {
        let geom = ArcGeometry::of(&arc(false, true)).unwrap();
        assert_abs_diff_eq!(geom.center.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(geom.center.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(geom.sweep_angle, PI / 2.0, epsilon = 1e-12);
        let mid = geom.point(0.5);
        assert_abs_diff_eq!(mid.x, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_abs_diff_eq!(mid.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_large_cw_arc() {
        let seg = arc(true, false);
        let geom = ArcGeometry::of(&seg).unwrap();
        assert_abs_diff_eq!(geom.sweep_angle, -1.5 * PI, epsilon = 1e-12);
        let end = seg.point(1.0).unwrap();
        assert_abs_diff_eq!(end.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(end.y, 1.0, epsilon = 1e-12);
        // goes the long way round through (0, -1)
        let p = seg.point(1.0 / 3.0).unwrap();
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_radii_scaled_up() {
        let seg = Segment::Arc {
            from: DVec2::new(-2.0, 0.0),
            radii: DVec2::splat(0.5),
            x_rotation: 30.0,
            large_arc: false,
            sweep: true,
            to: DVec2::new(2.0, 0.0),
        };
        let geom = ArcGeometry::of(&seg).unwrap();
        assert_abs_diff_eq!(geom.center.length(), 0.0, epsilon = 1e-9);
        let end = seg.point(1.0).unwrap();
        assert_abs_diff_eq!(end.x, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_arcs() {
        let flat = Segment::Arc {
            from: DVec2::ZERO,
            radii: DVec2::new(0.0, 1.0),
            x_rotation: 0.0,
            large_arc: false,
            sweep: false,
            to: DVec2::new(2.0, 0.0),
        };
        assert!(ArcGeometry::of(&flat).is_none());
        assert_eq!(flat.point(0.5), Some(DVec2::new(1.0, 0.0)));
    }
}
