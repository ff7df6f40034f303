//! Programmatic archive generation for integration tests.
//!
//! Builds a small but complete data set:
//! - DXT textures stored under their compressed names
//! - A static barrel mesh (`BARREL.MRM`)
//! - A humanoid model: script, 3-node hierarchy, one head attachment, one
//!   skinned body, and a 30-frame run cycle at 30 fps
//! - A flat world of 8 x 8 inset quads, two materials

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use zenview_shared::{
    AlphaFunction, AnimationSample, AssetRecord, HierarchyNode, MaterialRecord, MeshAttachment,
    ModelAnimation, ModelHierarchy, ModelMesh, ModelScript, MultiResMesh, RawTextureFormat,
    RecordArchive, ScriptAnimation, SkinWeightRecord, SoftSkinMesh, SourceMatrix, SubMesh,
    TextureRecord, Wedge, WorldFeature, WorldMesh, WorldPolygon, WorldRecord,
};

/// Frames in the run cycle
pub const RUN_FRAMES: u32 = 30;
/// Run cycle frame rate
pub const RUN_FPS: f32 = 30.0;
/// Quads per world side
pub const WORLD_TILES: usize = 8;
/// World tile pitch
pub const TILE_SIZE: f32 = 100.0;
/// Gap between a quad and its tile border
pub const TILE_INSET: f32 = 10.0;

pub fn texture(format: RawTextureFormat) -> AssetRecord {
    AssetRecord::Texture(TextureRecord {
        format,
        width: 8,
        height: 8,
        mipmaps: vec![vec![0xAB; 32], vec![0xCD; 8]],
    })
}

/// Unit quad in the XY plane, one sub-mesh
pub fn quad_mesh(material: Option<MaterialRecord>) -> MultiResMesh {
    MultiResMesh {
        positions: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        sub_meshes: vec![SubMesh {
            material,
            wedges: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
                .iter()
                .enumerate()
                .map(|(i, uv)| Wedge {
                    position_index: i as u32,
                    normal: [0.0, 0.0, -1.0],
                    uv: *uv,
                })
                .collect(),
            triangles: vec![[0, 1, 2], [0, 2, 3]],
        }],
    }
}

pub fn humans_hierarchy() -> ModelHierarchy {
    let node = |name: &str, parent: Option<u32>, t: [f32; 3]| HierarchyNode {
        name: name.to_string(),
        parent,
        transform: SourceMatrix::from_translation(t),
    };
    ModelHierarchy {
        nodes: vec![
            node("BIP01", None, [0.0, 90.0, 0.0]),
            node("BIP01 SPINE", Some(0), [0.0, 20.0, 0.0]),
            node("BIP01 HEAD", Some(1), [0.0, 30.0, 5.0]),
        ],
        root_translation: [0.0, 0.0, 10.0],
    }
}

/// Body skinned to the pelvis and spine; position 3 has five influences
pub fn humans_mesh() -> ModelMesh {
    let influence = |node: u32, weight: f32| SkinWeightRecord {
        node_index: node,
        weight,
        position: [0.0, 0.0, 1.0],
    };
    let body = SoftSkinMesh {
        mesh: quad_mesh(Some(MaterialRecord::textured("BODY", "HUM_BODY.TGA"))),
        nodes: vec![0, 1],
        weights: vec![
            vec![influence(0, 1.0)],
            vec![influence(0, 0.25), influence(1, 0.75)],
            vec![influence(1, 3.0)],
            vec![
                influence(0, 1.0),
                influence(1, 1.0),
                influence(0, 1.0),
                influence(1, 1.0),
                influence(0, 100.0),
            ],
        ],
    };

    ModelMesh {
        attachments: vec![
            MeshAttachment {
                node_name: "BIP01 HEAD".to_string(),
                mesh: quad_mesh(Some(MaterialRecord::textured("HEAD", "HUM_HEAD.TGA"))),
            },
            MeshAttachment {
                node_name: "BIP01 TAIL".to_string(),
                mesh: quad_mesh(None),
            },
        ],
        skinned_meshes: vec![body],
    }
}

pub fn run_animation() -> ModelAnimation {
    let node_indices = vec![0, 2];
    let mut samples = Vec::new();
    for frame in 0..RUN_FRAMES {
        for _ in &node_indices {
            samples.push(AnimationSample {
                position: [0.0, 0.0, frame as f32],
                rotation: [0.0, 0.0, 0.0, 1.0],
            });
        }
    }
    ModelAnimation {
        frame_count: RUN_FRAMES,
        node_indices,
        samples,
    }
}

/// Flat ground: one inset quad per grid cell, alternating two textures
///
/// Quads are inset by `TILE_INSET` so none touches a cell border; with a
/// grid of `WORLD_TILES` every cell receives exactly its own quad.
pub fn flat_world() -> WorldRecord {
    let mut positions = Vec::new();
    let mut features = Vec::new();
    let mut polygons = Vec::new();
    for x in 0..WORLD_TILES {
        for z in 0..WORLD_TILES {
            let x0 = x as f32 * TILE_SIZE + TILE_INSET;
            let x1 = (x + 1) as f32 * TILE_SIZE - TILE_INSET;
            let z0 = z as f32 * TILE_SIZE + TILE_INSET;
            let z1 = (z + 1) as f32 * TILE_SIZE - TILE_INSET;

            let first = positions.len() as u32;
            // Source space is left-handed: renderer +Z is source -Z
            positions.extend([[x0, 0.0, -z0], [x1, 0.0, -z0], [x1, 0.0, -z1], [x0, 0.0, -z1]]);
            for i in 0..4 {
                features.push(WorldFeature {
                    normal: [0.0, 1.0, 0.0],
                    uv: [(i % 2) as f32, (i / 2) as f32],
                });
            }
            polygons.push(WorldPolygon {
                material_index: ((x + z) % 2) as u32,
                feature_indices: (first..first + 4).collect(),
                position_indices: (first..first + 4).collect(),
            });
        }
    }

    WorldRecord {
        mesh: WorldMesh {
            positions,
            features,
            polygons,
            materials: vec![
                MaterialRecord::textured("GRASS", "GRASS.TGA"),
                MaterialRecord {
                    name: "WATER".to_string(),
                    texture: "WATER.TGA".to_string(),
                    alpha_function: AlphaFunction::Blend,
                    color: [255, 255, 255, 128],
                },
            ],
        },
    }
}

/// The full data set as one archive
pub fn base_archive() -> RecordArchive {
    RecordArchive::new()
        .with("HUM_BODY-C.TEX", texture(RawTextureFormat::Dxt1))
        .with("HUM_HEAD-C.TEX", texture(RawTextureFormat::Dxt3))
        .with("GRASS-C.TEX", texture(RawTextureFormat::Dxt1))
        .with("WATER-C.TEX", texture(RawTextureFormat::Dxt3))
        .with(
            "BARREL.MRM",
            AssetRecord::MultiResMesh(quad_mesh(Some(MaterialRecord::textured("WOOD", "GRASS.TGA")))),
        )
        .with(
            "HUMANS.MDS",
            AssetRecord::ModelScript(ModelScript {
                skeleton_name: "HUMANS.ASC".to_string(),
                animations: vec![ScriptAnimation {
                    name: "S_RUN".to_string(),
                    fps: RUN_FPS,
                }],
            }),
        )
        .with("HUMANS.MDH", AssetRecord::ModelHierarchy(humans_hierarchy()))
        .with("HUMANS.MDM", AssetRecord::ModelMesh(humans_mesh()))
        .with("HUMANS-S_RUN.MAN", AssetRecord::ModelAnimation(run_animation()))
        .with("NEWWORLD.ZEN", AssetRecord::World(flat_world()))
}

/// Save `archive` as `<dir>/<file_name>` and return the path
pub fn write_archive(dir: &Path, file_name: &str, archive: &RecordArchive) -> PathBuf {
    let path = dir.join(file_name);
    archive.save(&path).expect("Failed to write archive");
    path
}
