//! GPU vertex layouts
//!
//! Both layouts are `#[repr(C)]` POD so a finished buffer can be handed to
//! an uploader via `bytemuck::cast_slice` without repacking.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Operations the mesh builder needs from a vertex layout
pub trait Vertex: Pod + std::fmt::Debug {
    fn position(&self) -> Vec3;
    fn uv(&self) -> Vec2;
    fn set_uv(&mut self, uv: Vec2);
}

/// Unskinned vertex (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct StaticVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl StaticVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }
}

impl Vertex for StaticVertex {
    fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }

    fn set_uv(&mut self, uv: Vec2) {
        self.uv = uv.to_array();
    }
}

/// Soft-skinned vertex (100 bytes)
///
/// `influence_positions[i]` is the vertex expressed in the local space of
/// joint `joints[i]`; unused slots are zero with weight 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub joints: [u8; 4],
    pub weights: [f32; 4],
    pub influence_positions: [[f32; 3]; 4],
}

impl Vertex for SkinnedVertex {
    fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }

    fn set_uv(&mut self, uv: Vec2) {
        self.uv = uv.to_array();
    }
}

/// Vertex storage of a finished mesh part
#[derive(Debug, Clone, PartialEq)]
pub enum VertexBuffer {
    Static(Vec<StaticVertex>),
    Skinned(Vec<SkinnedVertex>),
}

impl VertexBuffer {
    pub fn len(&self) -> usize {
        match self {
            VertexBuffer::Static(v) => v.len(),
            VertexBuffer::Skinned(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_skinned(&self) -> bool {
        matches!(self, VertexBuffer::Skinned(_))
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            VertexBuffer::Static(v) => bytemuck::cast_slice(v),
            VertexBuffer::Skinned(v) => bytemuck::cast_slice(v),
        }
    }

    /// Size of one vertex in bytes
    pub fn stride(&self) -> usize {
        match self {
            VertexBuffer::Static(_) => std::mem::size_of::<StaticVertex>(),
            VertexBuffer::Skinned(_) => std::mem::size_of::<SkinnedVertex>(),
        }
    }

    pub fn positions(&self) -> Vec<Vec3> {
        match self {
            VertexBuffer::Static(v) => v.iter().map(Vertex::position).collect(),
            VertexBuffer::Skinned(v) => v.iter().map(Vertex::position).collect(),
        }
    }

    pub fn uvs(&self) -> Vec<Vec2> {
        match self {
            VertexBuffer::Static(v) => v.iter().map(Vertex::uv).collect(),
            VertexBuffer::Skinned(v) => v.iter().map(Vertex::uv).collect(),
        }
    }

    pub(crate) fn mirror_u(&mut self) {
        fn mirror<V: Vertex>(vertices: &mut [V]) {
            for v in vertices {
                let uv = v.uv();
                v.set_uv(Vec2::new(1.0 - uv.x, uv.y));
            }
        }
        match self {
            VertexBuffer::Static(v) => mirror(v),
            VertexBuffer::Skinned(v) => mirror(v),
        }
    }
}

/// Wrap a typed vertex list in the matching buffer variant
pub trait IntoVertexBuffer: Vertex {
    fn into_buffer(vertices: Vec<Self>) -> VertexBuffer;
}

impl IntoVertexBuffer for StaticVertex {
    fn into_buffer(vertices: Vec<Self>) -> VertexBuffer {
        VertexBuffer::Static(vertices)
    }
}

impl IntoVertexBuffer for SkinnedVertex {
    fn into_buffer(vertices: Vec<Self>) -> VertexBuffer {
        VertexBuffer::Skinned(vertices)
    }
}
