//! # Configuration
//!
//! vnotes configuration is loaded with [`confique`], layered in priority order:
//!
//! 1. **Environment variables**: `VNOTES_STORAGE_KEY`, `VNOTES_AUTOSAVE_SECS`,
//!    `VNOTES_RATE_LIMIT_MS`, `VNOTES_DATA_DIR`.
//! 2. **Config file**: `vnotes.toml` in the OS config directory (via `directories`).
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `storage_key` | `vnotes-data` | Key the note set is stored and synced under |
//! | `autosave_interval_secs` | `30` | Seconds between autosave ticks |
//! | `rate_limit_ms` | `300` | Minimum milliseconds between mutating calls |
//! | `data_dir` | OS data dir | Where the durable store keeps its files |
//!
//! Capacity and length bounds are fixed and not configurable.

use crate::engine::EngineSettings;
use crate::error::{Result, VnotesError};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "vnotes.toml";

/// Configuration for vnotes, stored in `vnotes.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VnotesConfig {
    /// Key the note set is stored under. Contexts sharing a key see each other's writes.
    #[config(env = "VNOTES_STORAGE_KEY", default = "vnotes-data")]
    pub storage_key: String,

    #[config(env = "VNOTES_AUTOSAVE_SECS", default = 30)]
    pub autosave_interval_secs: u64,

    #[config(env = "VNOTES_RATE_LIMIT_MS", default = 300)]
    pub rate_limit_ms: u64,

    /// Directory for the durable store. When absent, the OS data directory is used.
    #[config(env = "VNOTES_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

impl Default for VnotesConfig {
    fn default() -> Self {
        Self {
            storage_key: "vnotes-data".to_string(),
            autosave_interval_secs: 30,
            rate_limit_ms: 300,
            data_dir: None,
        }
    }
}

impl VnotesConfig {
    /// Environment, then `file` if it exists, then defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| VnotesError::Config(e.to_string()))
    }

    /// Load from the standard location, falling back to defaults if the platform has
    /// no config directory.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path().as_deref())
    }

    /// Just the file and defaults, no environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::builder()
            .file(path)
            .load()
            .map_err(|e| VnotesError::Config(e.to_string()))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            storage_key: self.storage_key.clone(),
            autosave_interval: Duration::from_secs(self.autosave_interval_secs),
        }
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "vnotes", "vnotes")
}

/// `vnotes.toml` in the OS config directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
