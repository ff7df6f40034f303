//! Integration tests for the asset pipeline.
//!
//! Tests the complete flow:
//! 1. Generate archives programmatically
//! 2. Write them to disk and mount them
//! 3. Query textures, meshes, models and worlds through `Assets`

mod fixtures;

use std::sync::Arc;

use glam::Vec3;
use tempfile::tempdir;

use zenview_core::{
    AssetError, AssetStore, Assets, BlendMode, Config, IntegrityError, SurfaceFormat,
    VertexBuffer,
};
use zenview_shared::{AssetRecord, HierarchyNode, RawTextureFormat, RecordArchive, SourceMatrix};

fn mount(archives: &[(&str, RecordArchive)]) -> AssetStore {
    let dir = tempdir().expect("Failed to create temp dir");
    for (file_name, archive) in archives {
        fixtures::write_archive(dir.path(), file_name, archive);
    }
    let mut store = AssetStore::new();
    let mounted = store.mount_dir(dir.path(), "zvpak").expect("Failed to mount");
    assert_eq!(mounted, archives.len());
    store
}

fn base_assets() -> Assets {
    Assets::new(mount(&[("base.zvpak", fixtures::base_archive())]), Config::default())
}

// ============================================================================
// Mounting
// ============================================================================

#[test]
fn test_mount_indexes_every_record() {
    let assets = base_assets();
    let keys = assets.keys();
    assert_eq!(keys.len(), fixtures::base_archive().entries.len());
    assert!(keys.windows(2).all(|w| w[0] < w[1]), "Keys not sorted");
    assert!(keys.iter().any(|k| k == "HUMANS-S_RUN.MAN"));
}

#[test]
fn test_later_archive_overrides_earlier() {
    let patch = RecordArchive::new().with(
        "barrel.mrm",
        AssetRecord::MultiResMesh(fixtures::quad_mesh(Some(
            zenview_shared::MaterialRecord::textured("WOOD", "WATER.TGA"),
        ))),
    );
    let store = mount(&[("00_base.zvpak", fixtures::base_archive()), ("10_patch.zvpak", patch)]);
    assert!(store.source_of("BARREL.MRM").unwrap().ends_with("10_patch.zvpak"));

    let assets = Assets::new(store, Config::default());
    let mesh = assets.get_multi_mesh("BARREL.MRM").unwrap();
    let material = mesh.parts[0].material.as_ref().unwrap();
    assert_eq!(material.texture_name, "WATER.TGA");
    assert_eq!(material.diffuse_texture.as_ref().unwrap().name, "WATER-C.TEX");
}

// ============================================================================
// Textures and meshes
// ============================================================================

#[test]
fn test_texture_compressed_fallback() {
    let assets = base_assets();
    let texture = assets.get_texture("hum_head.tga").unwrap();
    assert_eq!(texture.name, "HUM_HEAD-C.TEX");
    assert_eq!(texture.format, SurfaceFormat::Dxt3);
    assert_eq!(texture.mips.len(), 2);
}

#[test]
fn test_multi_mesh_is_cached() {
    let assets = base_assets();
    let a = assets.get_multi_mesh("BARREL.MRM").unwrap();
    let b = assets.get_multi_mesh("barrel.mrm").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.vertex_count(), 4);
    assert_eq!(a.triangle_count(), 2);
}

#[test]
fn test_unsupported_texture_fails_world() {
    let patch = RecordArchive::new().with("GRASS-C.TEX", fixtures::texture(RawTextureFormat::P8));
    let store = mount(&[("a.zvpak", fixtures::base_archive()), ("b.zvpak", patch)]);
    let assets = Assets::new(store, Config::default());

    match assets.get_world("NEWWORLD.ZEN") {
        Err(AssetError::UnsupportedFormat { texture, .. }) => assert_eq!(texture, "GRASS-C.TEX"),
        other => panic!("Expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn test_unsupported_texture_placeholder() {
    let patch = RecordArchive::new().with("GRASS-C.TEX", fixtures::texture(RawTextureFormat::P8));
    let store = mount(&[("a.zvpak", fixtures::base_archive()), ("b.zvpak", patch)]);
    let mut config = Config::default();
    config.textures.placeholder_for_unsupported = true;
    let assets = Assets::new(store, config);

    let world = assets.get_world("NEWWORLD.ZEN").unwrap();
    let grass = world.cell(0, 0).unwrap().batches[0].material.clone();
    assert!(grass.diffuse_texture.as_ref().unwrap().is_placeholder());
}

// ============================================================================
// Models
// ============================================================================

#[test]
fn test_model_skeleton() {
    let assets = base_assets();
    let model = assets.get_model("humans.mds").unwrap();
    let skeleton = &model.skeleton;

    // Three nodes, the synthetic root and one skinned-mesh bone
    assert_eq!(skeleton.len(), 5);
    assert_eq!(skeleton.bones[skeleton.root].name, "_ROOT");
    assert_eq!(skeleton.bones[0].parent, Some(skeleton.root));

    // Root translation lands on node 0, converted to renderer space
    let pelvis = skeleton.find("BIP01").unwrap();
    assert!((pelvis.default_pose.translation - Vec3::new(0.0, 90.0, -10.0)).length() < 1e-5);
    let head = skeleton.find("BIP01 HEAD").unwrap();
    assert!((head.default_pose.translation - Vec3::new(0.0, 30.0, -5.0)).length() < 1e-5);

    // Every bone reaches the root in at most n steps
    for bone in &skeleton.bones {
        let depth = skeleton.depth(bone.index).expect("Bone not connected to root");
        assert!(depth <= skeleton.len());
    }
}

#[test]
fn test_model_meshes_and_attachments() {
    let assets = base_assets();
    let model = assets.get_model("HUMANS.MDS").unwrap();

    // Head, unmatched tail, then the skinned body
    assert_eq!(model.meshes.len(), 3);
    assert_eq!(model.skeleton.find("BIP01 HEAD").unwrap().mesh, Some(0));
    assert_eq!(model.skeleton.find("_MESH0").unwrap().mesh, Some(2));
    assert!(model.skeleton.bones.iter().all(|b| b.mesh != Some(1)));

    let head = &model.meshes[0].parts[0];
    assert!(!head.vertices.is_skinned());
    let head_texture = head.material.as_ref().unwrap().diffuse_texture.as_ref().unwrap();
    assert_eq!(head_texture.name, "HUM_HEAD-C.TEX");
    let tail = &model.meshes[1].parts[0];
    assert!(tail.material.as_ref().unwrap().diffuse_texture.is_none());
}

#[test]
fn test_model_skin_weights() {
    let assets = base_assets();
    let model = assets.get_model("HUMANS.MDS").unwrap();
    assert_eq!(model.skins.len(), 1);
    let joints: Vec<usize> = model.skins[0].joints.iter().map(|j| j.bone).collect();
    assert_eq!(joints, vec![0, 1]);

    let body = &model.meshes[2].parts[0];
    assert_eq!(body.skin, Some(0));
    let VertexBuffer::Skinned(vertices) = &body.vertices else {
        panic!("Body should be skinned");
    };
    for v in vertices {
        let sum: f32 = v.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "Weights sum to {sum}");
    }

    // Five influences: only the first four are kept and renormalized
    assert_eq!(vertices[3].joints, [0, 1, 0, 1]);
    for w in vertices[3].weights {
        assert!((w - 0.25).abs() < 1e-5);
    }
    assert_eq!(vertices[2].joints[0], 1);
    assert!((vertices[2].weights[0] - 1.0).abs() < 1e-5);
    assert_eq!(vertices[0].influence_positions[0], [0.0, 0.0, -1.0]);
}

#[test]
fn test_model_animation_clip() {
    let assets = base_assets();
    let model = assets.get_model("HUMANS.MDS").unwrap();
    let clip = &model.animations["S_RUN"];

    assert!((clip.duration - 1.0).abs() < 1e-5);
    assert_eq!(clip.channels.len(), 2);
    assert_eq!(clip.channels[0].bone, 0);
    assert_eq!(clip.channels[1].bone, 2);

    let keys = &clip.channels[1].keyframes;
    assert_eq!(keys.len(), fixtures::RUN_FRAMES as usize);
    assert!((keys[0].time - 1.0 / fixtures::RUN_FPS).abs() < 1e-5);
    assert!((keys.last().unwrap().time - 1.0).abs() < 1e-5);
    assert!((keys[29].transform.translation - Vec3::new(0.0, 0.0, -29.0)).length() < 1e-5);
}

#[test]
fn test_missing_animation_is_reported() {
    let mut archive = fixtures::base_archive();
    archive.entries.retain(|e| e.name != "HUMANS-S_RUN.MAN");
    let assets = Assets::new(mount(&[("base.zvpak", archive)]), Config::default());

    match assets.get_model("HUMANS.MDS") {
        Err(AssetError::Missing { name }) => assert_eq!(name, "HUMANS-S_RUN.MAN"),
        other => panic!("Expected Missing, got {other:?}"),
    }
}

#[test]
fn test_cyclic_hierarchy_rejected() {
    let mut hierarchy = fixtures::humans_hierarchy();
    hierarchy.nodes[0] = HierarchyNode {
        name: "BIP01".to_string(),
        parent: Some(2),
        transform: SourceMatrix::IDENTITY,
    };
    let patch = RecordArchive::new().with("HUMANS.MDH", AssetRecord::ModelHierarchy(hierarchy));
    let store = mount(&[("a.zvpak", fixtures::base_archive()), ("b.zvpak", patch)]);
    let assets = Assets::new(store, Config::default());

    let err = assets.get_model("HUMANS.MDS").unwrap_err();
    assert!(matches!(
        err,
        AssetError::Integrity {
            error: IntegrityError::CyclicHierarchy { .. },
            ..
        }
    ));
    // Errors are not cached: the next call fails the same way
    assert!(assets.get_model("HUMANS.MDS").is_err());
}

#[test]
fn test_concurrent_model_requests_share_instance() {
    let assets = Arc::new(base_assets());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let assets = assets.clone();
            std::thread::spawn(move || assets.get_model("HUMANS.MDS").unwrap())
        })
        .collect();
    let models: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for model in &models[1..] {
        assert!(Arc::ptr_eq(&models[0], model));
    }
}

// ============================================================================
// Worlds
// ============================================================================

#[test]
fn test_world_grid_layout() {
    let assets = base_assets();
    let world = assets.get_world("NEWWORLD.ZEN").unwrap();
    let n = fixtures::WORLD_TILES;

    assert_eq!(world.size, n);
    assert_eq!(world.cells.len(), n * n);
    assert_eq!(world.polygon_count(), n * n);
    assert!((world.bounds.min - Vec3::new(10.0, 0.0, 10.0)).length() < 1e-5);
    assert!((world.bounds.max - Vec3::new(790.0, 0.0, 790.0)).length() < 1e-5);

    // Each inset quad lands in its own cell
    for x in 0..n {
        for z in 0..n {
            let cell = world.cell(x, z).unwrap();
            assert_eq!(cell.polygon_count, 1, "cell ({x}, {z})");
            assert_eq!(cell.batches.len(), 1);
            let part = &cell.batches[0].part;
            assert_eq!(part.vertices.len(), 4);
            assert_eq!(part.triangle_count(), 2);
            assert!(world.cell_bounds(x, z).intersects(&part.bounds));
        }
    }
}

#[test]
fn test_world_materials_shared_across_cells() {
    let assets = base_assets();
    let world = assets.get_world("NEWWORLD.ZEN").unwrap();

    let grass = &world.cell(0, 0).unwrap().batches[0].material;
    let water = &world.cell(0, 1).unwrap().batches[0].material;
    assert_eq!(grass.blend, BlendMode::Opaque);
    assert_eq!(water.blend, BlendMode::AlphaBlend);
    assert!(Arc::ptr_eq(grass, &world.cell(1, 1).unwrap().batches[0].material));
    assert!(Arc::ptr_eq(
        grass.diffuse_texture.as_ref().unwrap(),
        &assets.get_texture("GRASS.TGA").unwrap()
    ));
}

#[test]
fn test_world_grid_size_from_config() {
    let mut config = Config::default();
    config.world.grid_size = 2;
    let assets = Assets::new(mount(&[("base.zvpak", fixtures::base_archive())]), config);
    let world = assets.get_world("NEWWORLD.ZEN").unwrap();

    assert_eq!(world.cells.len(), 4);
    assert_eq!(world.polygon_count(), 64);
    // Each coarse cell holds both materials
    for cell in &world.cells {
        assert_eq!(cell.batches.len(), 2);
    }
}
