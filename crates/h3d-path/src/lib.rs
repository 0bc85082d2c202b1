//! 2D vector paths.
//!
//! A [`CurvePath`] is built with `move_to`/`line_to`/`quad_to`/`cubic_to`
//! or parsed from SVG path data, then flattened to polylines and
//! triangulated into a [`MeshBuffer`](h3d_mesh::MeshBuffer).

pub mod flatten;
pub mod parser;
pub mod path;
pub mod segment;
pub mod triangulate;

pub use path::CurvePath;
pub use segment::Segment;
