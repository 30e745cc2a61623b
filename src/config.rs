use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::data::registry::LayerRegistry;

pub const DATA_DIR_ENV: &str = "LULC_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "data";
/// Optional registry override inside the data directory.
pub const REGISTRY_FILE: &str = "layers.json";

pub const TITLE: &str = "Chennai LULC Change Detection (2018–2025)";

/// Static configuration resolved once at startup.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub data_dir: PathBuf,
    pub registry: LayerRegistry,
}

impl ViewerConfig {
    /// Data directory from `LULC_DATA_DIR` (default `data`), registry
    /// from `<data_dir>/layers.json` when present.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Self::for_dir(&data_dir)
    }

    pub fn for_dir(data_dir: &Path) -> Result<Self> {
        let override_path = data_dir.join(REGISTRY_FILE);
        let registry = if override_path.is_file() {
            log::info!("Using layer registry from {}", override_path.display());
            LayerRegistry::load(&override_path)?
        } else {
            LayerRegistry::default()
        };

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            registry,
        })
    }
}
