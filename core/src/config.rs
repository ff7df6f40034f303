//! Configuration management (`config.toml`)
//!
//! Handles loading, saving, and providing defaults for pipeline settings.
//! Settings are stored in TOML format; every field has a default so partial
//! files are accepted.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::world::MAX_GRID_SIZE;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// World partitioning settings
    #[serde(default)]
    pub world: WorldConfig,
    /// Model conversion settings
    #[serde(default)]
    pub model: ModelConfig,
    /// Texture lookup settings
    #[serde(default)]
    pub textures: TextureConfig,
}

/// World conversion and view-distance configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Cells per grid side (default: 8)
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    /// Far view distance in world units (default: 20000)
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
    /// Reverse winding and mirror U after conversion (default: true)
    #[serde(default = "default_true")]
    pub flip_winding: bool,
}

/// Model conversion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Reverse winding and mirror U after conversion (default: true)
    #[serde(default = "default_true")]
    pub flip_winding: bool,
}

/// Texture lookup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureConfig {
    /// Suffix appended to the stem of compressed variants (default: "-C")
    #[serde(default = "default_compressed_suffix")]
    pub compressed_suffix: String,
    /// Extension of compressed variants (default: "TEX")
    #[serde(default = "default_compressed_extension")]
    pub compressed_extension: String,
    /// Substitute a white placeholder for unsupported formats (default: false)
    #[serde(default)]
    pub placeholder_for_unsupported: bool,
}

fn default_grid_size() -> u32 {
    8
}
fn default_max_distance() -> f32 {
    20000.0
}
fn default_compressed_suffix() -> String {
    "-C".to_string()
}
fn default_compressed_extension() -> String {
    "TEX".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            max_distance: default_max_distance(),
            flip_winding: default_true(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            flip_winding: default_true(),
        }
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            compressed_suffix: default_compressed_suffix(),
            compressed_extension: default_compressed_extension(),
            placeholder_for_unsupported: false,
        }
    }
}

impl WorldConfig {
    /// Shadows are drawn up to half the view distance
    pub fn max_shadow_distance(&self) -> f32 {
        self.max_distance / 2.0
    }

    pub fn fog_start(&self) -> f32 {
        self.max_shadow_distance()
    }

    pub fn fog_end(&self) -> f32 {
        self.max_distance
    }
}

impl Config {
    /// Reject settings the pipeline cannot work with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.world.grid_size == 0 {
            anyhow::bail!("world.grid_size must be at least 1");
        }
        if self.world.grid_size as usize > MAX_GRID_SIZE {
            anyhow::bail!(
                "world.grid_size must be at most {} (got {})",
                MAX_GRID_SIZE,
                self.world.grid_size
            );
        }
        if self.world.max_distance.is_nan() || self.world.max_distance <= 0.0 {
            anyhow::bail!(
                "world.max_distance must be positive (got {})",
                self.world.max_distance
            );
        }
        Ok(())
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\zenview\config`
/// On macOS: `~/Library/Application Support/io.zenview.zenview`
/// On Linux: `~/.config/zenview`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.zenview", "", "zenview")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default location of `config.toml`
pub fn default_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the configuration from `path`.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load(path: &Path) -> Config {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| toml::from_str(&content).ok())
        .unwrap_or_default()
}

/// Loads and validates the configuration from `path`, surfacing every error.
pub fn load_strict(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Saves the configuration to `path`.
///
/// Creates the parent directory if it doesn't exist.
pub fn save(config: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.world.grid_size, 8);
        assert_eq!(config.world.max_distance, 20000.0);
        assert!(config.world.flip_winding);
        assert!(config.model.flip_winding);
        assert_eq!(config.textures.compressed_suffix, "-C");
        assert_eq!(config.textures.compressed_extension, "TEX");
        assert!(!config.textures.placeholder_for_unsupported);
    }

    #[test]
    fn test_derived_distances() {
        let world = WorldConfig::default();
        assert_eq!(world.max_shadow_distance(), 10000.0);
        assert_eq!(world.fog_start(), 10000.0);
        assert_eq!(world.fog_end(), 20000.0);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[world]\ngrid_size = 4\n").unwrap();
        assert_eq!(config.world.grid_size, 4);
        assert_eq!(config.world.max_distance, 20000.0);
        assert_eq!(config.textures, TextureConfig::default());
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.world.grid_size = 0;
        assert!(config.validate().is_err());
        config.world.grid_size = MAX_GRID_SIZE as u32;
        assert!(config.validate().is_ok());
        config.world.grid_size = 4_000_000_000;
        assert!(config.validate().is_err());
        config.world.grid_size = 8;
        config.world.max_distance = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.world.grid_size = 16;
        config.textures.placeholder_for_unsupported = true;

        save(&config, &path).unwrap();
        assert_eq!(load(&path), config);
        assert_eq!(load_strict(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_or_broken_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(load(&missing), Config::default());
        assert!(load_strict(&missing).is_err());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[world\ngrid_size = ").unwrap();
        assert_eq!(load(&broken), Config::default());
        assert!(load_strict(&broken).is_err());
    }

    #[test]
    fn test_load_strict_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[world]\ngrid_size = 0\n").unwrap();
        assert!(load_strict(&path).is_err());
    }
}
