//! Typed asset records
//!
//! These mirror what the source engine's record parser hands back for each
//! archive entry. All spatial data is still in the source coordinate system
//! (left-handed); nothing here has been converted.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::math::SourceMatrix;

// ============================================================================
// Materials and textures
// ============================================================================

/// Source alpha function of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub enum AlphaFunction {
    /// Engine default (treated as opaque)
    #[default]
    Default,
    /// Explicitly opaque
    None,
    /// Standard alpha blending
    Blend,
    /// Additive
    Add,
    /// Subtractive
    Subtract,
    /// Multiplicative
    Multiply,
    /// Multiplicative, doubled
    Multiply2,
}

/// Source material description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct MaterialRecord {
    /// Material name
    pub name: String,
    /// Diffuse texture name (empty when the surface is untextured)
    pub texture: String,
    /// Alpha function
    pub alpha_function: AlphaFunction,
    /// Base color (RGBA8)
    pub color: [u8; 4],
}

impl MaterialRecord {
    /// Create a textured material with the default alpha function
    pub fn textured(name: impl Into<String>, texture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: texture.into(),
            alpha_function: AlphaFunction::Default,
            color: [255, 255, 255, 255],
        }
    }

    /// Whether this material references a texture at all
    pub fn has_texture(&self) -> bool {
        !self.texture.is_empty()
    }
}

/// Pixel formats the source texture container can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum RawTextureFormat {
    B8G8R8A8,
    R8G8B8A8,
    A8B8G8R8,
    A8R8G8B8,
    B8G8R8,
    R8G8B8,
    A4R4G4B4,
    A1R5G5B5,
    R5G6B5,
    P8,
    Dxt1,
    Dxt2,
    Dxt3,
    Dxt4,
    Dxt5,
}

/// Compressed texture record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TextureRecord {
    /// Pixel format of every mip level
    pub format: RawTextureFormat,
    /// Width of mip 0 in pixels
    pub width: u32,
    /// Height of mip 0 in pixels
    pub height: u32,
    /// Raw mip level payloads, largest first
    pub mipmaps: Vec<Vec<u8>>,
}

// ============================================================================
// Meshes
// ============================================================================

/// One polygon corner of a multi-resolution sub-mesh
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct Wedge {
    /// Index into the owning mesh's position array
    pub position_index: u32,
    /// Corner normal
    pub normal: [f32; 3],
    /// Corner texture coordinate
    pub uv: [f32; 2],
}

/// A material group of a multi-resolution mesh
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct SubMesh {
    /// Material of this group
    pub material: Option<MaterialRecord>,
    /// Corner records
    pub wedges: Vec<Wedge>,
    /// Triangles as wedge indices
    pub triangles: Vec<[u16; 3]>,
}

/// Multi-resolution (progressive) mesh
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct MultiResMesh {
    /// Shared position pool
    pub positions: Vec<[f32; 3]>,
    /// Material groups
    pub sub_meshes: Vec<SubMesh>,
}

/// One bone influence of a soft-skinned position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct SkinWeightRecord {
    /// Skeleton node index
    pub node_index: u32,
    /// Influence weight
    pub weight: f32,
    /// Position relative to the influencing node
    pub position: [f32; 3],
}

/// Mesh skinned against a subset of skeleton nodes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct SoftSkinMesh {
    /// Geometry
    pub mesh: MultiResMesh,
    /// Skeleton node indices this mesh binds to, in source order
    pub nodes: Vec<u32>,
    /// Influences per position (indexed like `mesh.positions`)
    pub weights: Vec<Vec<SkinWeightRecord>>,
}

/// Static mesh attached to a named skeleton node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct MeshAttachment {
    /// Node name the mesh hangs off
    pub node_name: String,
    /// Geometry
    pub mesh: MultiResMesh,
}

/// Model mesh record (`.MDM`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct ModelMesh {
    /// Static per-node attachments
    pub attachments: Vec<MeshAttachment>,
    /// Independently skinned meshes
    pub skinned_meshes: Vec<SoftSkinMesh>,
}

// ============================================================================
// Skeletons and animation
// ============================================================================

/// One node of a model hierarchy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct HierarchyNode {
    /// Node name (unique per hierarchy)
    pub name: String,
    /// Parent node index, `None` for roots
    pub parent: Option<u32>,
    /// Local rest transform
    pub transform: SourceMatrix,
}

/// Model hierarchy record (`.MDH`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct ModelHierarchy {
    /// Nodes in source order
    pub nodes: Vec<HierarchyNode>,
    /// Extra translation applied to node 0
    pub root_translation: [f32; 3],
}

/// Animation declared by a model script
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct ScriptAnimation {
    /// Animation name (e.g. `S_RUN`)
    pub name: String,
    /// Playback frame rate
    pub fps: f32,
}

/// Model script record (`.MDS`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct ModelScript {
    /// Name of the skeleton (mesh) this script drives
    pub skeleton_name: String,
    /// Declared animations
    pub animations: Vec<ScriptAnimation>,
}

/// One sampled node pose
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct AnimationSample {
    /// Local translation
    pub position: [f32; 3],
    /// Local rotation quaternion [x, y, z, w]
    pub rotation: [f32; 4],
}

/// Model animation record (`.MAN`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct ModelAnimation {
    /// Number of frames
    pub frame_count: u32,
    /// Animated skeleton nodes
    pub node_indices: Vec<u32>,
    /// Samples, frame-major: `samples[node + frame * node_count]`
    pub samples: Vec<AnimationSample>,
}

// ============================================================================
// World
// ============================================================================

/// Per-corner feature record (normal + texture coordinate)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct WorldFeature {
    /// Corner normal
    pub normal: [f32; 3],
    /// Corner texture coordinate
    pub uv: [f32; 2],
}

/// World polygon (convex fan, 3+ corners)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct WorldPolygon {
    /// Index into the world material table
    pub material_index: u32,
    /// Feature index per corner
    pub feature_indices: Vec<u32>,
    /// Position index per corner
    pub position_indices: Vec<u32>,
}

/// World mesh
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct WorldMesh {
    /// Position pool
    pub positions: Vec<[f32; 3]>,
    /// Feature pool
    pub features: Vec<WorldFeature>,
    /// Polygons
    pub polygons: Vec<WorldPolygon>,
    /// Material table
    pub materials: Vec<MaterialRecord>,
}

/// World record (`.ZEN`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct WorldRecord {
    /// Static world geometry
    pub mesh: WorldMesh,
}

// ============================================================================
// Record envelope
// ============================================================================

/// Any record an archive entry can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub enum AssetRecord {
    Texture(TextureRecord),
    MultiResMesh(MultiResMesh),
    ModelHierarchy(ModelHierarchy),
    ModelMesh(ModelMesh),
    ModelScript(ModelScript),
    ModelAnimation(ModelAnimation),
    World(WorldRecord),
}

impl AssetRecord {
    /// Human-readable record kind, used in logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            AssetRecord::Texture(_) => "texture",
            AssetRecord::MultiResMesh(_) => "multi-resolution mesh",
            AssetRecord::ModelHierarchy(_) => "model hierarchy",
            AssetRecord::ModelMesh(_) => "model mesh",
            AssetRecord::ModelScript(_) => "model script",
            AssetRecord::ModelAnimation(_) => "model animation",
            AssetRecord::World(_) => "world",
        }
    }
}
