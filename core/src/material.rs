//! Render materials and the per-world material table

use std::sync::Arc;

use glam::Vec4;
use hashbrown::HashMap;
use zenview_shared::{AlphaFunction, MaterialRecord};

use crate::error::Result;
use crate::texture::{Texture, TextureResolver};

/// How a material is composited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    AlphaBlend,
}

impl From<AlphaFunction> for BlendMode {
    fn from(alpha: AlphaFunction) -> Self {
        match alpha {
            AlphaFunction::Blend => BlendMode::AlphaBlend,
            _ => BlendMode::Opaque,
        }
    }
}

/// Render material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse_color: Vec4,
    pub diffuse_texture: Option<Arc<Texture>>,
    /// Uppercase texture name, empty for untextured materials
    pub texture_name: String,
    pub casts_shadows: bool,
    pub blend: BlendMode,
}

impl Material {
    /// White, untextured, opaque
    pub fn plain() -> Self {
        Self {
            diffuse_color: Vec4::ONE,
            diffuse_texture: None,
            texture_name: String::new(),
            casts_shadows: true,
            blend: BlendMode::Opaque,
        }
    }

    pub fn textured(texture: Arc<Texture>, blend: BlendMode) -> Self {
        Self {
            texture_name: texture.name.to_uppercase(),
            diffuse_texture: Some(texture),
            blend,
            ..Self::plain()
        }
    }
}

/// Turns source material records into shared render materials
pub trait MaterialResolver {
    /// `None` when the record has nothing to render (no texture)
    fn resolve(&mut self, record: &MaterialRecord) -> Result<Option<Arc<Material>>>;
}

/// Materials keyed by uppercase texture name
///
/// Source materials that sample the same texture collapse onto one entry.
/// The first record seen for a texture decides its blend mode.
pub struct MaterialTable<'r, R: TextureResolver + ?Sized> {
    textures: &'r R,
    materials: HashMap<String, Arc<Material>>,
}

impl<'r, R: TextureResolver + ?Sized> MaterialTable<'r, R> {
    pub fn new(textures: &'r R) -> Self {
        Self {
            textures,
            materials: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Resolve a record, falling back to a plain white material when untextured
    pub fn resolve_or_plain(&mut self, record: Option<&MaterialRecord>) -> Result<Arc<Material>> {
        match record {
            Some(record) => match self.resolve(record)? {
                Some(material) => Ok(material),
                None => Ok(Arc::new(Material::plain())),
            },
            None => Ok(Arc::new(Material::plain())),
        }
    }
}

impl<R: TextureResolver + ?Sized> MaterialResolver for MaterialTable<'_, R> {
    fn resolve(&mut self, record: &MaterialRecord) -> Result<Option<Arc<Material>>> {
        if !record.has_texture() {
            return Ok(None);
        }

        let key = record.texture.to_uppercase();
        if let Some(material) = self.materials.get(&key) {
            return Ok(Some(material.clone()));
        }

        let texture = self.textures.resolve_texture(&key)?;
        let mut material = Material::textured(texture, record.alpha_function.into());
        material.texture_name = key.clone();
        let material = Arc::new(material);
        self.materials.insert(key, material.clone());
        Ok(Some(material))
    }
}
