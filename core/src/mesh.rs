//! Mesh building: vertex welding, triangulation and handedness flipping
//!
//! [`MeshBuilder`] accumulates vertices and indices for one mesh part. Vertices
//! can be added directly, or through a corner key so that repeated corners
//! (same feature and position) collapse onto one vertex.

use std::hash::Hash;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::bounds::Aabb;
use crate::material::Material;
use crate::vertex::{IntoVertexBuffer, Vertex, VertexBuffer};

/// Largest vertex count addressable with 16-bit indices
pub const MAX_U16_VERTICES: usize = u16::MAX as usize;

/// Index storage, width picked from the vertex count
#[derive(Debug, Clone, PartialEq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    /// Pack indices with the narrowest width that addresses `vertex_count` vertices
    pub fn pack(indices: Vec<u32>, vertex_count: usize) -> Self {
        if vertex_count <= MAX_U16_VERTICES {
            IndexBuffer::U16(indices.into_iter().map(|i| i as u16).collect())
        } else {
            IndexBuffer::U32(indices)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(i) => i.len(),
            IndexBuffer::U32(i) => i.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            IndexBuffer::U16(v) => v.get(i).map(|&x| x as u32),
            IndexBuffer::U32(v) => v.get(i).copied(),
        }
    }

    pub fn to_u32(&self) -> Vec<u32> {
        match self {
            IndexBuffer::U16(v) => v.iter().map(|&x| x as u32).collect(),
            IndexBuffer::U32(v) => v.clone(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexBuffer::U16(v) => bytemuck::cast_slice(v),
            IndexBuffer::U32(v) => bytemuck::cast_slice(v),
        }
    }

    fn swap_triangle_winding(&mut self) {
        match self {
            IndexBuffer::U16(v) => v.chunks_exact_mut(3).for_each(|t| t.swap(1, 2)),
            IndexBuffer::U32(v) => v.chunks_exact_mut(3).for_each(|t| t.swap(1, 2)),
        }
    }
}

/// One drawable part: a vertex/index buffer pair with its material
#[derive(Debug, Clone)]
pub struct MeshPart {
    pub vertices: VertexBuffer,
    pub indices: IndexBuffer,
    pub bounds: Aabb,
    pub material: Option<Arc<Material>>,
    /// Index into the owning model's skin table
    pub skin: Option<usize>,
}

impl MeshPart {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Reverse triangle winding and mirror U
    ///
    /// Swaps the second and third index of every triangle. Applying it twice
    /// restores the original part.
    pub fn flip_handedness(&mut self) {
        self.indices.swap_triangle_winding();
        self.vertices.mirror_u();
    }

    pub fn with_material(mut self, material: Option<Arc<Material>>) -> Self {
        self.material = material;
        self
    }
}

/// A mesh made of independently drawn parts
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub parts: Vec<MeshPart>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(MeshPart::triangle_count).sum()
    }

    pub fn bounds(&self) -> Aabb {
        self.parts
            .iter()
            .fold(Aabb::EMPTY, |acc, p| acc.union(&p.bounds))
    }
}

/// Incremental vertex/index accumulator for one mesh part
pub struct MeshBuilder<V, K = ()> {
    vertices: Vec<V>,
    indices: Vec<u32>,
    welded: HashMap<K, u32>,
}

impl<V: IntoVertexBuffer, K: Hash + Eq> Default for MeshBuilder<V, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: IntoVertexBuffer, K: Hash + Eq> MeshBuilder<V, K> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            welded: HashMap::new(),
        }
    }

    /// Append a vertex without deduplication, returning its index
    pub fn add_vertex(&mut self, vertex: V) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Return the vertex for `key`, building it on first sight
    pub fn add_keyed_vertex(&mut self, key: K, build: impl FnOnce() -> V) -> u32 {
        if let Some(&index) = self.welded.get(&key) {
            return index;
        }
        let index = self.add_vertex(build());
        self.welded.insert(key, index);
        index
    }

    pub fn add_index(&mut self, index: u32) {
        self.indices.push(index);
    }

    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Fan-triangulate a convex polygon given its vertex indices
    pub fn add_polygon_fan(&mut self, corners: &[u32]) {
        for [a, b, c] in fan_triangles(corners.len()) {
            self.add_triangle(corners[a], corners[b], corners[c]);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Finish the part, optionally converting handedness
    ///
    /// A builder without vertices yields `Aabb::EMPTY` bounds.
    pub fn finish(self, flip: bool) -> MeshPart {
        let bounds = Aabb::from_points(self.vertices.iter().map(|v| v.position()));
        let vertex_count = self.vertices.len();
        let mut part = MeshPart {
            vertices: V::into_buffer(self.vertices),
            indices: IndexBuffer::pack(self.indices, vertex_count),
            bounds,
            material: None,
            skin: None,
        };
        if flip {
            part.flip_handedness();
        }
        part
    }
}

/// Fan triangulation of an `n`-corner convex polygon: `(0, t-1, t)` for `t` in `2..n`
///
/// Yields nothing for fewer than 3 corners.
pub fn fan_triangles(n: usize) -> impl Iterator<Item = [usize; 3]> {
    (2..n.max(2)).map(|t| [0, t - 1, t])
}
