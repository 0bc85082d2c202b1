//! Vertex data model and tessellation.
//!
//! [`BufferAccessor`] describes one attribute inside a flat float buffer.
//! [`MeshBuilder`] collects vertices immediate-mode style and produces
//! [`MeshBuffer`]s; [`CurveEval`] and [`SurfaceEval`] drive a builder from
//! parametric evaluators.

pub mod accessor;
pub mod builder;
pub mod buffer;
pub mod eval;
pub mod index;
pub mod semantic;

pub use accessor::{BufferAccessor, BufferView};
pub use buffer::{AttributeBinding, MeshBuffer};
pub use builder::{BuilderState, MeshBuilder, Primitive, SubMesh};
pub use eval::{CurveEval, SurfaceEval};
pub use index::{make_indices, IndexBuffer};
pub use semantic::{Attribute, PrimitiveType, Semantic};
