//! GPU-ready output meshes: interleaved vertex floats plus an index buffer.

use h3d_core::{H3dError, Result};
use h3d_math::{Aabb3, DVec3};
use serde::{Deserialize, Serialize};

use crate::accessor::{BufferAccessor, BufferView};
use crate::index::{make_indices, IndexBuffer};
use crate::semantic::{Attribute, PrimitiveType};

/// Where one attribute lives inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeBinding {
    pub attribute: Attribute,
    /// Float offset from the start of the vertex.
    pub offset: usize,
    pub components: usize,
}

/// Bindings for `attributes` in interleaving order, and the resulting
/// vertex stride.
pub(crate) fn layout(attributes: &[Attribute]) -> (Vec<AttributeBinding>, usize) {
    let mut sorted = attributes.to_vec();
    sorted.sort();
    sorted.dedup();
    let mut offset = 0;
    let bindings = sorted
        .into_iter()
        .map(|attribute| {
            let binding = AttributeBinding {
                attribute,
                offset,
                components: attribute.components(),
            };
            offset += binding.components;
            binding
        })
        .collect();
    (bindings, offset)
}

/// Re-interleave `vertex_count` vertices from one layout into another.
/// Attributes absent from `from` are zero-filled.
pub(crate) fn relayout(
    data: &[f32],
    from: &[AttributeBinding],
    from_stride: usize,
    to: &[AttributeBinding],
    to_stride: usize,
    vertex_count: usize,
) -> Vec<f32> {
    let mut out = vec![0.0; vertex_count * to_stride];
    for src in from {
        let Some(dst) = to.iter().find(|b| b.attribute == src.attribute) else {
            continue;
        };
        let n = src.components.min(dst.components);
        for v in 0..vertex_count {
            let s = v * from_stride + src.offset;
            let d = v * to_stride + dst.offset;
            out[d..d + n].copy_from_slice(&data[s..s + n]);
        }
    }
    out
}

/// One indexed draw: interleaved vertices sharing a single attribute layout.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBuffer {
    primitive: PrimitiveType,
    bindings: Vec<AttributeBinding>,
    stride: usize,
    vertices: Vec<f32>,
    indices: IndexBuffer,
}

impl MeshBuffer {
    /// Build a mesh from interleaved `vertices` laid out as `attributes` in
    /// [`Semantic`](crate::Semantic) order.
    ///
    /// # Errors
    /// Fails without a position attribute, when `vertices` is not a whole
    /// number of vertices, when `indices` is not a whole number of
    /// primitives, or when an index is out of range.
    pub fn new(
        primitive: PrimitiveType,
        attributes: &[Attribute],
        vertices: Vec<f32>,
        indices: &[u32],
    ) -> Result<Self> {
        if !attributes.contains(&Attribute::POSITION) {
            return Err(H3dError::InvalidParameter("mesh layout needs a position".into()));
        }
        let (bindings, stride) = layout(attributes);
        if vertices.len() % stride != 0 {
            return Err(H3dError::InvalidParameter(format!(
                "{} floats is not a multiple of the vertex stride {stride}",
                vertices.len()
            )));
        }
        if indices.len() % primitive.index_arity() != 0 {
            return Err(H3dError::InvalidParameter(format!(
                "{} indices do not form whole {primitive:?}",
                indices.len()
            )));
        }
        let vertex_count = vertices.len() / stride;
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(H3dError::InvalidParameter(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }
        Ok(Self::from_parts(primitive, bindings, stride, vertices, indices))
    }

    pub(crate) fn from_parts(
        primitive: PrimitiveType,
        bindings: Vec<AttributeBinding>,
        stride: usize,
        vertices: Vec<f32>,
        indices: &[u32],
    ) -> Self {
        let vertex_count = if stride == 0 { 0 } else { vertices.len() / stride };
        Self {
            primitive,
            bindings,
            stride,
            indices: IndexBuffer::for_vertex_count(indices, vertex_count),
            vertices,
        }
    }

    /// A mesh with no vertices. Position is always part of the layout.
    pub fn empty(primitive: PrimitiveType, attributes: &[Attribute]) -> Self {
        let mut all = vec![Attribute::POSITION];
        all.extend_from_slice(attributes);
        let (bindings, stride) = layout(&all);
        Self::from_parts(primitive, bindings, stride, Vec::new(), &[])
    }

    pub fn primitive(&self) -> PrimitiveType {
        self.primitive
    }

    pub fn bindings(&self) -> &[AttributeBinding] {
        &self.bindings
    }

    /// Floats per vertex.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> &IndexBuffer {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.stride
    }

    pub fn primitive_count(&self) -> usize {
        self.indices.len() / self.primitive.index_arity()
    }

    pub fn binding(&self, attribute: Attribute) -> Option<&AttributeBinding> {
        self.bindings.iter().find(|b| b.attribute == attribute)
    }

    pub fn has_attribute(&self, attribute: Attribute) -> bool {
        self.binding(attribute).is_some()
    }

    /// Strided view of one attribute, if present.
    pub fn attribute(&self, attribute: Attribute) -> Option<BufferView<'_>> {
        let b = self.binding(attribute)?;
        BufferAccessor::new(self.vertices.as_slice(), b.offset, b.components, self.stride).ok()
    }

    fn attribute_mut(&mut self, attribute: Attribute) -> Option<BufferAccessor<&mut [f32]>> {
        let b = *self.binding(attribute)?;
        BufferAccessor::new(self.vertices.as_mut_slice(), b.offset, b.components, self.stride).ok()
    }

    pub fn positions(&self) -> Vec<DVec3> {
        self.attribute(Attribute::POSITION)
            .map(|view| {
                view.iter()
                    .map(|p| DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Bounds of all positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb3> {
        Aabb3::from_points(self.positions())
    }

    /// Add `attribute` to the layout, zero for every vertex. No-op if present.
    pub fn add_attribute(&mut self, attribute: Attribute) {
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

    fn require_triangles(&self, op: &str) -> Result<()> {
        if self.primitive != PrimitiveType::Triangles {
            return Err(H3dError::InvalidOperation(format!(
                "{op} needs a triangle mesh, got {:?}",
                self.primitive
            )));
        }
        Ok(())
    }

    /// Replace normals with area-weighted averages of the adjacent face
    /// normals, adding a normal attribute if needed.
    ///
    /// # Errors
    /// Fails on non-triangle meshes.
    pub fn recalc_normals(&mut self) -> Result<()> {
        self.require_triangles("recalc_normals")?;
        self.add_attribute(Attribute::NORMAL);

        let positions = self.positions();
        let mut normals = vec![DVec3::ZERO; positions.len()];
        let indices = self.indices.to_u32();
        for tri in indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let normal = (positions[i1] - positions[i0]).cross(positions[i2] - positions[i0]);
            normals[i0] += normal;
            normals[i1] += normal;
            normals[i2] += normal;
        }

        if let Some(mut acc) = self.attribute_mut(Attribute::NORMAL) {
            for (i, n) in normals.iter().enumerate() {
                let n = n.try_normalize().unwrap_or(DVec3::ZERO);
                acc.set_vec(i, &[n.x as f32, n.y as f32, n.z as f32]);
            }
        }
        Ok(())
    }

    /// Flip every triangle and negate the normals.
    ///
    /// # Errors
    /// Fails on non-triangle meshes.
    pub fn reverse_winding(&mut self) -> Result<()> {
        self.require_triangles("reverse_winding")?;
        let mut indices = self.indices.to_u32();
        for tri in indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        self.indices = IndexBuffer::for_vertex_count(&indices, self.vertex_count());

        if let Some(mut acc) = self.attribute_mut(Attribute::NORMAL) {
            let mut n = [0.0f32; 3];
            for i in 0..acc.count() {
                acc.get_vec(i, &mut n);
                acc.set_vec(i, &[-n[0], -n[1], -n[2]]);
            }
        }
        Ok(())
    }

    /// Concatenate two meshes of the same primitive type. The result carries
    /// the union of both layouts; attributes missing from one side are zero
    /// for its vertices.
    ///
    /// # Errors
    /// Fails when the primitive types differ.
    pub fn merge(&self, other: &MeshBuffer) -> Result<MeshBuffer> {
        if self.primitive != other.primitive {
            return Err(H3dError::InvalidOperation(format!(
                "cannot merge {:?} with {:?}",
                self.primitive, other.primitive
            )));
        }
        let attributes: Vec<Attribute> = self
            .bindings
            .iter()
            .chain(&other.bindings)
            .map(|b| b.attribute)
            .collect();
        let (bindings, stride) = layout(&attributes);

        let (n1, n2) = (self.vertex_count(), other.vertex_count());
        let (seq1, seq2) = (make_indices(n1).to_u32(), make_indices(n2).to_u32());
        let mut vertices = vec![0.0; (n1 + n2) * stride];
        for binding in &bindings {
            let merged = BufferAccessor::merge(
                self.attribute(binding.attribute),
                &seq1,
                other.attribute(binding.attribute),
                &seq2,
            )?;
            for (v, value) in merged.iter().enumerate() {
                let start = v * stride + binding.offset;
                let n = value.len().min(binding.components);
                vertices[start..start + n].copy_from_slice(&value[..n]);
            }
        }

        let offset = n1 as u32;
        let indices: Vec<u32> = self
            .indices
            .iter()
            .chain(other.indices.iter().map(|i| i + offset))
            .collect();
        Ok(Self::from_parts(self.primitive, bindings, stride, vertices, &indices))
    }
}
