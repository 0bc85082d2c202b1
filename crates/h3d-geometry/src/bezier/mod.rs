//! Bezier curves and surfaces of any degree, evaluated in the Bernstein basis.

pub mod bernstein;
mod curve;
mod surface;

pub use bernstein::{bernstein, bernstein_basis, binomial};
pub use curve::BezierCurve;
pub use surface::BezierSurface;
