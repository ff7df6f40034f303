//! Asset facade
//!
//! `Assets` owns the mounted store and one compute-once cache per asset kind.
//! Every getter returns a shared handle; the first request for a name builds
//! the asset, later requests (with any casing) get the same instance.

use std::sync::Arc;

use crate::cache::AssetCache;
use crate::config::Config;
use crate::error::{AssetError, Result};
use crate::material::MaterialTable;
use crate::mesh::Mesh;
use crate::model::{Model, ModelSources, assemble_model, convert_static_mesh};
use crate::store::AssetStore;
use crate::texture::{Texture, TextureResolver, compressed_name, load_texture};
use crate::world::{WorldGrid, WorldPartitioner};

/// Builds and caches renderer assets from a mounted store
#[derive(Debug)]
pub struct Assets {
    store: AssetStore,
    config: Config,

    // ========================================================================
    // Per-kind caches
    // ========================================================================
    textures: AssetCache<Texture>,
    multi_meshes: AssetCache<Mesh>,
    models: AssetCache<Model>,
    worlds: AssetCache<WorldGrid>,
}

impl Assets {
    pub fn new(store: AssetStore, config: Config) -> Self {
        Self {
            store,
            config,
            textures: AssetCache::new(),
            multi_meshes: AssetCache::new(),
            models: AssetCache::new(),
            worlds: AssetCache::new(),
        }
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Every mounted record name, uppercase and sorted
    pub fn keys(&self) -> &[String] {
        self.store.keys()
    }

    /// Texture by name
    ///
    /// Names that are not mounted are retried under their compressed variant
    /// (`STONE.TGA` -> `STONE-C.TEX`).
    pub fn get_texture(&self, name: &str) -> Result<Arc<Texture>> {
        self.textures.get_or_try_insert(name, || {
            tracing::info!("Querying texture '{}'", name);
            let (key, record) = match self.store.texture(name) {
                Ok(record) => (name.to_uppercase(), record),
                Err(AssetError::Missing { .. }) => {
                    let compressed = compressed_name(name, &self.config.textures);
                    tracing::info!("Texture '{}' not found, trying '{}'", name, compressed);
                    let record = self.store.texture(&compressed)?;
                    (compressed, record)
                }
                Err(e) => return Err(e),
            };
            load_texture(&key, record, &self.config.textures)
        })
    }

    /// Static multi-resolution mesh (`.MRM`)
    pub fn get_multi_mesh(&self, name: &str) -> Result<Arc<Mesh>> {
        self.multi_meshes.get_or_try_insert(name, || {
            tracing::info!("Querying mesh '{}'", name);
            let record = self.store.multi_res_mesh(name)?;
            let mut materials = MaterialTable::new(self);
            convert_static_mesh(
                &name.to_uppercase(),
                record,
                &mut materials,
                self.config.model.flip_winding,
            )
        })
    }

    /// Model with skeleton, meshes, skins and animation clips (`.MDS`)
    pub fn get_model(&self, name: &str) -> Result<Arc<Model>> {
        self.models.get_or_try_insert(name, || {
            tracing::info!("Querying model '{}'", name);
            self.load_model(&name.to_uppercase())
        })
    }

    /// Partitioned world (`.ZEN`)
    pub fn get_world(&self, name: &str) -> Result<Arc<WorldGrid>> {
        self.worlds.get_or_try_insert(name, || {
            tracing::info!("Querying world '{}'", name);
            let record = self.store.world(name)?;
            let mut materials = MaterialTable::new(self);
            WorldPartitioner::new(
                self.config.world.grid_size as usize,
                self.config.world.flip_winding,
            )
            .with_label(name.to_uppercase())
            .partition(&record.mesh, &mut materials)
        })
    }

    fn load_model(&self, name: &str) -> Result<Model> {
        let script = self.store.model_script(name)?;
        let hierarchy = self.store.model_hierarchy(&change_extension(name, "MDH"))?;
        let mesh = self
            .store
            .model_mesh(&change_extension(&script.skeleton_name, "MDM"))?;

        let stem = file_stem(name);
        let mut animations = Vec::with_capacity(script.animations.len());
        for animation in &script.animations {
            let record = self
                .store
                .model_animation(&format!("{}-{}.MAN", stem, animation.name))?;
            animations.push((animation.name.as_str(), animation.fps, record));
        }

        let sources = ModelSources {
            name,
            hierarchy,
            mesh,
            animations,
        };
        let mut materials = MaterialTable::new(self);
        let model = assemble_model(&sources, &mut materials, self.config.model.flip_winding)?;
        tracing::debug!(
            "Model '{}': {} bones, {} meshes, {} clips",
            name,
            model.skeleton.len(),
            model.meshes.len(),
            model.animations.len()
        );
        Ok(model)
    }
}

impl TextureResolver for Assets {
    fn resolve_texture(&self, name: &str) -> Result<Arc<Texture>> {
        self.get_texture(name)
    }
}

/// `name` with everything after its last `.` replaced
fn change_extension(name: &str, extension: &str) -> String {
    format!("{}.{}", file_stem(name), extension)
}

fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}
