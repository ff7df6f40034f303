//! Model assembly
//!
//! A model is described by three records: a script (`.MDS`) naming the
//! skeleton and its animations, a hierarchy (`.MDH`) with the rest pose, and
//! a mesh record (`.MDM`) with static attachments and soft-skinned meshes.
//! Animations live in separate `.MAN` records.
//!
//! The model's mesh table holds the static attachments first (in record
//! order), then the skinned meshes.

use glam::Vec2;
use smallvec::SmallVec;
use zenview_shared::{HierarchyNode, ModelAnimation, ModelHierarchy, ModelMesh, MultiResMesh, SoftSkinMesh};

use crate::animation::{ClipTable, build_clip};
use crate::coords::{convert_normal, convert_position_array, convert_transform};
use crate::error::{AssetError, IntegrityError, Result};
use crate::material::MaterialTable;
use crate::mesh::{Mesh, MeshBuilder};
use crate::skeleton::{Skeleton, SkeletonBuilder, SkeletonNode, SrtTransform};
use crate::skin::{MAX_INFLUENCES, Skin, SkinBuilder, SkinWeight};
use crate::texture::TextureResolver;
use crate::vertex::{SkinnedVertex, StaticVertex};

/// Renderable model
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub skeleton: Skeleton,
    pub meshes: Vec<Mesh>,
    pub skins: Vec<Skin>,
    pub animations: ClipTable,
}

impl Model {
    pub fn part_count(&self) -> usize {
        self.meshes.iter().map(|m| m.parts.len()).sum()
    }
}

/// Everything needed to assemble one model
pub struct ModelSources<'a> {
    pub name: &'a str,
    pub hierarchy: &'a ModelHierarchy,
    pub mesh: &'a ModelMesh,
    /// `(clip name, frame rate, samples)` in script order
    pub animations: Vec<(&'a str, f32, &'a ModelAnimation)>,
}

/// Convert hierarchy nodes to renderer space, applying the root translation to node 0
pub fn skeleton_nodes(hierarchy: &ModelHierarchy) -> Vec<SkeletonNode> {
    let root_offset = convert_position_array(hierarchy.root_translation);
    hierarchy
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node): (usize, &HierarchyNode)| {
            let mut transform = SrtTransform::from_matrix(&convert_transform(&node.transform));
            if i == 0 {
                transform.translation += root_offset;
            }
            SkeletonNode {
                name: node.name.clone(),
                transform,
                parent: node.parent.map(|p| p as usize),
            }
        })
        .collect()
}

/// Build a model from its records
pub fn assemble_model<R: TextureResolver + ?Sized>(
    sources: &ModelSources<'_>,
    materials: &mut MaterialTable<'_, R>,
    flip: bool,
) -> Result<Model> {
    let name = sources.name;
    let integrity = |e| AssetError::integrity(name, e);
    let nodes = skeleton_nodes(sources.hierarchy);

    let mut meshes = Vec::with_capacity(sources.mesh.attachments.len() + sources.mesh.skinned_meshes.len());
    let mut builder = SkeletonBuilder::new(&nodes);

    for attachment in &sources.mesh.attachments {
        let mesh = convert_static_mesh(name, &attachment.mesh, materials, flip)?;
        builder.attach_mesh(attachment.node_name.clone(), meshes.len());
        meshes.push(mesh);
    }

    for (skin_index, skinned) in sources.mesh.skinned_meshes.iter().enumerate() {
        let skin_nodes: Vec<usize> = skinned.nodes.iter().map(|&n| n as usize).collect();
        let skin = SkinBuilder::new(&skin_nodes).map_err(integrity)?;
        let mesh = convert_skinned_mesh(name, skinned, &skin, skin_index, materials, flip)?;
        builder.add_skinned_mesh(meshes.len(), skin.joint_bones());
        meshes.push(mesh);
    }

    let built = builder.build().map_err(integrity)?;

    let mut animations = ClipTable::new();
    for &(clip_name, fps, record) in &sources.animations {
        let node_indices: Vec<usize> = record.node_indices.iter().map(|&n| n as usize).collect();
        let clip = build_clip(
            clip_name,
            fps,
            record.frame_count as usize,
            &node_indices,
            &record.samples,
            &built.skeleton,
        )
        .map_err(|e| AssetError::integrity(format!("{}:{}", name, clip_name), e))?;
        animations.insert(clip.name.clone(), clip);
    }

    Ok(Model {
        name: name.to_string(),
        skeleton: built.skeleton,
        meshes,
        skins: built.skins,
        animations,
    })
}

/// Convert a multi-resolution mesh into unskinned parts, one per sub-mesh
pub fn convert_static_mesh<R: TextureResolver + ?Sized>(
    name: &str,
    mesh: &MultiResMesh,
    materials: &mut MaterialTable<'_, R>,
    flip: bool,
) -> Result<Mesh> {
    let integrity = |e| AssetError::integrity(name, e);
    let mut parts = Vec::with_capacity(mesh.sub_meshes.len());

    for sub in &mesh.sub_meshes {
        let mut builder: MeshBuilder<StaticVertex> = MeshBuilder::new();
        for wedge in &sub.wedges {
            let position = mesh
                .positions
                .get(wedge.position_index as usize)
                .ok_or_else(|| {
                    integrity(IntegrityError::IndexOutOfRange {
                        what: "position",
                        index: wedge.position_index as usize,
                        len: mesh.positions.len(),
                    })
                })?;
            builder.add_vertex(StaticVertex::new(
                convert_position_array(*position),
                convert_normal(wedge.normal.into()),
                Vec2::from_array(wedge.uv),
            ));
        }
        add_wedge_triangles(&mut builder, &sub.triangles, sub.wedges.len()).map_err(integrity)?;
        // No wedges means no triangles either; nothing to draw
        if builder.vertex_count() == 0 {
            continue;
        }

        let material = materials.resolve_or_plain(sub.material.as_ref())?;
        parts.push(builder.finish(flip).with_material(Some(material)));
    }

    Ok(Mesh { parts })
}

/// Convert a soft-skinned mesh; every part is bound to skin `skin_index`
pub fn convert_skinned_mesh<R: TextureResolver + ?Sized>(
    name: &str,
    skinned: &SoftSkinMesh,
    skin: &SkinBuilder,
    skin_index: usize,
    materials: &mut MaterialTable<'_, R>,
    flip: bool,
) -> Result<Mesh> {
    let integrity = |e| AssetError::integrity(name, e);
    let mesh = &skinned.mesh;
    let mut parts = Vec::with_capacity(mesh.sub_meshes.len());

    for sub in &mesh.sub_meshes {
        let mut builder: MeshBuilder<SkinnedVertex> = MeshBuilder::new();
        for wedge in &sub.wedges {
            let index = wedge.position_index as usize;
            let (position, weights) = mesh
                .positions
                .get(index)
                .zip(skinned.weights.get(index))
                .ok_or_else(|| {
                    integrity(IntegrityError::IndexOutOfRange {
                        what: "skinned position",
                        index,
                        len: mesh.positions.len().min(skinned.weights.len()),
                    })
                })?;

            let influences: SmallVec<[SkinWeight; MAX_INFLUENCES]> = weights
                .iter()
                .take(MAX_INFLUENCES)
                .map(|w| SkinWeight {
                    node: w.node_index as usize,
                    weight: w.weight,
                    position: convert_position_array(w.position),
                })
                .collect();
            let blend = skin.blend_attributes(&influences).map_err(integrity)?;

            builder.add_vertex(SkinnedVertex {
                position: convert_position_array(*position).to_array(),
                normal: convert_normal(wedge.normal.into()).to_array(),
                uv: wedge.uv,
                joints: blend.joints,
                weights: blend.weights,
                influence_positions: blend.positions,
            });
        }
        add_wedge_triangles(&mut builder, &sub.triangles, sub.wedges.len()).map_err(integrity)?;
        // No wedges means no triangles either; nothing to draw
        if builder.vertex_count() == 0 {
            continue;
        }

        let material = materials.resolve_or_plain(sub.material.as_ref())?;
        let mut part = builder.finish(flip).with_material(Some(material));
        part.skin = Some(skin_index);
        parts.push(part);
    }

    Ok(Mesh { parts })
}

fn add_wedge_triangles<V: crate::vertex::IntoVertexBuffer>(
    builder: &mut MeshBuilder<V>,
    triangles: &[[u16; 3]],
    wedge_count: usize,
) -> std::result::Result<(), IntegrityError> {
    for triangle in triangles {
        if let Some(&bad) = triangle.iter().find(|&&w| w as usize >= wedge_count) {
            return Err(IntegrityError::IndexOutOfRange {
                what: "wedge",
                index: bad as usize,
                len: wedge_count,
            });
        }
        builder.add_triangle(triangle[0] as u32, triangle[1] as u32, triangle[2] as u32);
    }
    Ok(())
}
