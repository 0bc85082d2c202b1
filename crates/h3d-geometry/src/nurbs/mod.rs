//! B-spline curves and surfaces (optionally rational) over arbitrary-length points.

mod curve;
pub mod knot;
mod surface;

pub use curve::BSplineCurve;
pub use knot::KnotVector;
pub use surface::BSplineSurface;
