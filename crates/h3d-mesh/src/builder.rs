//! Immediate-mode mesh construction.
//!
//! Callers pick a [`Primitive`] mode, set the current normal/color/texture
//! coordinate, and emit vertices. The builder turns each mode's vertex
//! stream into indexed triangles, lines or points, grouped into one
//! [`SubMesh`] per output primitive type.

use serde::{Deserialize, Serialize};

use crate::buffer::{layout, relayout, AttributeBinding, MeshBuffer};
use crate::semantic::{Attribute, PrimitiveType};

/// Vertex grouping for subsequent [`MeshBuilder::vertex3`] calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Triangles,
    TriangleStrip,
    TriangleFan,
    /// Independent quads, split into two triangles each.
    Quads,
    /// Pairs of vertices; each new pair closes a quad with the previous one.
    QuadStrip,
    Lines,
    LineStrip,
    Points,
}

impl Primitive {
    pub fn output(self) -> PrimitiveType {
        match self {
            Primitive::Lines | Primitive::LineStrip => PrimitiveType::Lines,
            Primitive::Points => PrimitiveType::Points,
            _ => PrimitiveType::Triangles,
        }
    }
}

/// Snapshot of the current per-vertex attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BuilderState {
    pub normal: Option<[f32; 3]>,
    pub color: Option<[f32; 3]>,
    pub tex_coord: Option<[f32; 2]>,
    pub tangent: Option<[f32; 3]>,
    pub bitangent: Option<[f32; 3]>,
}

impl BuilderState {
    fn value(&self, attribute: Attribute) -> Option<&[f32]> {
        match attribute {
            Attribute::NORMAL => self.normal.as_ref().map(|v| v.as_slice()),
            Attribute::COLOR => self.color.as_ref().map(|v| v.as_slice()),
            Attribute::TEXCOORD => self.tex_coord.as_ref().map(|v| v.as_slice()),
            Attribute::TANGENT => self.tangent.as_ref().map(|v| v.as_slice()),
            Attribute::BITANGENT => self.bitangent.as_ref().map(|v| v.as_slice()),
            _ => None,
        }
    }

    fn active(&self) -> impl Iterator<Item = Attribute> + '_ {
        [
            Attribute::NORMAL,
            Attribute::COLOR,
            Attribute::TEXCOORD,
            Attribute::TANGENT,
            Attribute::BITANGENT,
        ]
        .into_iter()
        .filter(|&a| self.value(a).is_some())
    }
}

/// Vertices and indices of one output primitive type.
#[derive(Debug, Clone)]
pub struct SubMesh {
    primitive: PrimitiveType,
    bindings: Vec<AttributeBinding>,
    stride: usize,
    vertices: Vec<f32>,
    indices: Vec<u32>,
}

impl SubMesh {
    fn new(primitive: PrimitiveType, attributes: &[Attribute]) -> Self {
        let (bindings, stride) = layout(attributes);
        Self {
            primitive,
            bindings,
            stride,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn primitive(&self) -> PrimitiveType {
        self.primitive
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.stride
    }

    pub fn primitive_count(&self) -> usize {
        self.indices.len() / self.primitive.index_arity()
    }

    pub fn has_attribute(&self, attribute: Attribute) -> bool {
        self.bindings.iter().any(|b| b.attribute == attribute)
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Add an attribute to the layout; existing vertices get zeros.
    fn grow(&mut self, attribute: Attribute) {
        if self.has_attribute(attribute) {
            return;
        }
        let mut attributes: Vec<Attribute> = self.bindings.iter().map(|b| b.attribute).collect();
        attributes.push(attribute);
        let (bindings, stride) = layout(&attributes);
        self.vertices = relayout(
            &self.vertices,
            &self.bindings,
            self.stride,
            &bindings,
            stride,
            self.vertex_count(),
        );
        self.bindings = bindings;
        self.stride = stride;
    }

    fn push_vertex(&mut self, position: [f32; 3], state: &BuilderState) -> u32 {
        let index = self.vertex_count() as u32;
        let start = self.vertices.len();
        self.vertices.resize(start + self.stride, 0.0);
        for b in &self.bindings {
            let value = if b.attribute == Attribute::POSITION {
                Some(position.as_slice())
            } else {
                state.value(b.attribute)
            };
            if let Some(value) = value {
                let at = start + b.offset;
                let n = value.len().min(b.components);
                self.vertices[at..at + n].copy_from_slice(&value[..n]);
            }
        }
        index
    }

    pub fn to_mesh_buffer(&self) -> MeshBuffer {
        MeshBuffer::from_parts(
            self.primitive,
            self.bindings.clone(),
            self.stride,
            self.vertices.clone(),
            &self.indices,
        )
    }
}

/// Immediate-mode builder producing [`MeshBuffer`]s.
///
/// Not thread-safe to share: each tessellation pass writes into one builder.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    submeshes: Vec<SubMesh>,
    mode: Primitive,
    batch_start: u32,
    state: BuilderState,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            submeshes: Vec::new(),
            mode: Primitive::Triangles,
            batch_start: 0,
            state: BuilderState::default(),
        }
    }

    /// Start a new batch of `mode` vertices. Strips and fans restart here
    /// even when the mode is unchanged.
    pub fn mode(&mut self, mode: Primitive) -> &mut Self {
        self.mode = mode;
        self.batch_start = self.current().vertex_count() as u32;
        self
    }

    pub fn current_mode(&self) -> Primitive {
        self.mode
    }

    /// The submesh receiving vertices for the current mode, opened on demand.
    fn current(&mut self) -> &mut SubMesh {
        let output = self.mode.output();
        let reuse = matches!(self.submeshes.last(), Some(last) if last.primitive == output);
        if !reuse {
            let mut attributes = vec![Attribute::POSITION];
            attributes.extend(self.state.active());
            log::debug!(
                "opening submesh {} for {:?} with {} attributes",
                self.submeshes.len(),
                output,
                attributes.len()
            );
            self.submeshes.push(SubMesh::new(output, &attributes));
            self.batch_start = 0;
        }
        let last = self.submeshes.len() - 1;
        &mut self.submeshes[last]
    }

    fn touch(&mut self, attribute: Attribute) {
        if let Some(last) = self.submeshes.last_mut() {
            last.grow(attribute);
        }
    }

    pub fn normal3(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.state.normal = Some([x as f32, y as f32, z as f32]);
        self.touch(Attribute::NORMAL);
        self
    }

    pub fn color3(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.state.color = Some([r as f32, g as f32, b as f32]);
        self.touch(Attribute::COLOR);
        self
    }

    pub fn tex_coord2(&mut self, u: f64, v: f64) -> &mut Self {
        self.state.tex_coord = Some([u as f32, v as f32]);
        self.touch(Attribute::TEXCOORD);
        self
    }

    pub fn tangent3(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.state.tangent = Some([x as f32, y as f32, z as f32]);
        self.touch(Attribute::TANGENT);
        self
    }

    pub fn bitangent3(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.state.bitangent = Some([x as f32, y as f32, z as f32]);
        self.touch(Attribute::BITANGENT);
        self
    }

    pub fn vertex2(&mut self, x: f64, y: f64) -> &mut Self {
        self.vertex3(x, y, 0.0)
    }

    /// Emit a vertex carrying the current attribute values, and whatever
    /// primitive it completes under the current mode.
    pub fn vertex3(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        let state = self.state;
        let mode = self.mode;
        // `current` may open a submesh, which resets the batch.
        let sub = self.current();
        let i = sub.push_vertex([x as f32, y as f32, z as f32], &state);
        let start = self.batch_start;
        let k = i - start;
        let sub = self.current();
        match mode {
            Primitive::Triangles if k % 3 == 2 => sub.indices.extend([i - 2, i - 1, i]),
            Primitive::TriangleStrip if k >= 2 => {
                if k % 2 == 0 {
                    sub.indices.extend([i - 2, i - 1, i]);
                } else {
                    sub.indices.extend([i - 1, i - 2, i]);
                }
            }
            Primitive::TriangleFan if k >= 2 => sub.indices.extend([start, i - 1, i]),
            Primitive::Quads if k % 4 == 3 => {
                let a = i - 3;
                sub.indices.extend([a, a + 1, a + 2, a, a + 2, a + 3]);
            }
            Primitive::QuadStrip if k >= 3 && k % 2 == 1 => {
                sub.indices.extend([i - 3, i - 2, i, i - 3, i, i - 1]);
            }
            Primitive::Lines if k % 2 == 1 => sub.indices.extend([i - 1, i]),
            Primitive::LineStrip if k >= 1 => sub.indices.extend([i - 1, i]),
            Primitive::Points => sub.indices.push(i),
            _ => {}
        }
        self
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Reset the current attribute values. Layouts keep any attributes
    /// already added.
    pub fn restore(&mut self, state: BuilderState) {
        self.state = state;
    }

    pub fn submeshes(&self) -> &[SubMesh] {
        &self.submeshes
    }

    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.submeshes.iter().map(SubMesh::vertex_count).sum()
    }

    pub fn primitive_count(&self) -> usize {
        self.submeshes.iter().map(SubMesh::primitive_count).sum()
    }

    /// One buffer per non-empty submesh.
    pub fn to_mesh_buffers(&self) -> Vec<MeshBuffer> {
        self.submeshes
            .iter()
            .filter(|s| s.vertex_count() > 0)
            .map(SubMesh::to_mesh_buffer)
            .collect()
    }
}
