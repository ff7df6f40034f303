//! Texture records to GPU-ready surfaces
//!
//! Only block-compressed formats the renderer can sample directly are
//! accepted. Decompression is the uploader's job, not ours.

use std::fmt;
use std::sync::Arc;

use zenview_shared::{RawTextureFormat, TextureRecord};

use crate::config::TextureConfig;
use crate::error::{AssetError, Result};

/// Surface formats handed to the uploader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFormat {
    Dxt1,
    Dxt3,
    /// Uncompressed RGBA8, only used for the placeholder
    Rgba8,
}

impl fmt::Display for SurfaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurfaceFormat::Dxt1 => "DXT1",
            SurfaceFormat::Dxt3 => "DXT3",
            SurfaceFormat::Rgba8 => "RGBA8",
        };
        f.write_str(name)
    }
}

/// CPU-side texture ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: SurfaceFormat,
    /// Mip level payloads, largest first
    pub mips: Vec<Vec<u8>>,
}

impl Texture {
    /// Convert a texture record, rejecting formats without a surface equivalent
    pub fn from_record(name: &str, record: &TextureRecord) -> Result<Self> {
        let format = surface_format(record.format).ok_or_else(|| AssetError::UnsupportedFormat {
            texture: name.to_string(),
            format: format!("{:?}", record.format),
        })?;

        Ok(Self {
            name: name.to_string(),
            width: record.width,
            height: record.height,
            format,
            mips: record.mipmaps.clone(),
        })
    }

    /// 1x1 opaque white texture
    pub fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            width: 1,
            height: 1,
            format: SurfaceFormat::Rgba8,
            mips: vec![vec![255, 255, 255, 255]],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.format == SurfaceFormat::Rgba8
    }
}

/// Surface format for a raw record format, if one exists
pub fn surface_format(format: RawTextureFormat) -> Option<SurfaceFormat> {
    match format {
        RawTextureFormat::Dxt1 => Some(SurfaceFormat::Dxt1),
        RawTextureFormat::Dxt3 => Some(SurfaceFormat::Dxt3),
        _ => None,
    }
}

/// Convert a record, optionally substituting the placeholder for unsupported formats
pub fn load_texture(name: &str, record: &TextureRecord, config: &TextureConfig) -> Result<Texture> {
    match Texture::from_record(name, record) {
        Err(AssetError::UnsupportedFormat { texture, format })
            if config.placeholder_for_unsupported =>
        {
            tracing::warn!("Texture '{}' has unsupported format {}, using placeholder", texture, format);
            Ok(Texture::placeholder(name))
        }
        other => other,
    }
}

/// Name the compressed variant of a texture is stored under
///
/// `STONE.TGA` becomes `STONE-C.TEX` with the default settings.
pub fn compressed_name(name: &str, config: &TextureConfig) -> String {
    let stem = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    };
    format!(
        "{}{}.{}",
        stem, config.compressed_suffix, config.compressed_extension
    )
    .to_uppercase()
}

/// Something that can produce textures by name
pub trait TextureResolver {
    fn resolve_texture(&self, name: &str) -> Result<Arc<Texture>>;
}
