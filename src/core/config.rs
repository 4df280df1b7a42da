//! Viewer configuration loaded from RON
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```ron
//! (
//!     window: (width: 1280, height: 960, vsync: false),
//!     texture_dir: "assets/textures",
//! )
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::engine::EngineConfig;
use super::error::ConfigError;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Window and presentation settings
    pub window: EngineConfig,
    /// Directory holding `stone.png` and `grass.png`
    pub texture_dir: PathBuf,
    /// Width and height of the spotlight shadow map
    pub shadow_map_size: u32,
    /// Shade with the light rig; off draws flat base colors
    pub lighting: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: EngineConfig::default(),
            texture_dir: PathBuf::from("textures"),
            shadow_map_size: 2048,
            lighting: true,
        }
    }
}

impl ViewerConfig {
    /// Parse a config from RON text
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    /// Read and parse a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&source)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Override the texture directory
    pub fn with_texture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.texture_dir = dir.into();
        self
    }
}
