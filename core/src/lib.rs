//! Zenview Core - asset conversion pipeline
//!
//! Turns typed records from mounted archives into renderer-ready assets:
//! vertex and index buffers, skeletons with skins, keyframe clips and
//! spatially partitioned worlds. Everything leaves the pipeline in a
//! right-handed, Y-up space.
//!
//! # Architecture
//!
//! - [`AssetStore`] - Case-insensitive, last-mounted-wins record index
//! - [`Assets`] - Cached getters for textures, meshes, models and worlds
//! - [`WorldPartitioner`] - Splits a world mesh into an N x N grid of batches
//! - [`coords`] - Handedness conversion applied to every geometric value

pub mod animation;
pub mod assets;
pub mod bounds;
pub mod cache;
pub mod config;
pub mod coords;
pub mod error;
pub mod material;
pub mod mesh;
pub mod model;
pub mod skeleton;
pub mod skin;
pub mod store;
pub mod texture;
pub mod vertex;
pub mod world;

pub use assets::Assets;
pub use config::Config;
pub use error::{AssetError, IntegrityError, Result};
pub use store::AssetStore;

// Re-export output types
pub use animation::{AnimationChannel, AnimationClip, ClipTable, Keyframe};
pub use bounds::Aabb;
pub use material::{BlendMode, Material};
pub use mesh::{IndexBuffer, Mesh, MeshPart};
pub use model::Model;
pub use skeleton::{Bone, Skeleton, SrtTransform};
pub use skin::{Skin, SkinJoint};
pub use texture::{SurfaceFormat, Texture};
pub use vertex::{SkinnedVertex, StaticVertex, VertexBuffer};
pub use world::{Cell, RenderBatch, WorldGrid, WorldPartitioner};
