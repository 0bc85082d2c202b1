//! Parametric curve and surface evaluators.
//!
//! Every evaluator maps a parameter (or parameter pair) to a numeric vector
//! whose length is fixed per evaluator. The composition engine in `h3d-mesh`
//! samples these to build meshes.

pub mod arc_length;
pub mod bezier;
pub mod curve;
pub mod nurbs;
pub mod points;
pub mod sample;
pub mod surface;

pub use arc_length::ArcLengthParam;
pub use bezier::{BezierCurve, BezierSurface};
pub use curve::{CurveEvaluator, FnCurve};
pub use nurbs::{BSplineCurve, BSplineSurface, KnotVector};
pub use surface::{FnSurface, SurfaceEvaluator};
