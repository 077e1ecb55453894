//! Content factory for building levels from a data directory.

use std::path::{Path, PathBuf};

use maskgrid_core::{GameConfig, MaskCompatibility};

use crate::loaders::{ConfigLoader, Level, LevelLoader, LevelSpec, LoadResult, MaskTableLoader};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml      (optional)
/// ├── masks.ron        (optional)
/// └── levels/
///     ├── meadow.ron
///     └── pen.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`, or defaults when absent.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the gate compatibility table from `masks.ron`, or an empty table
    /// when absent. An empty table opens no gate.
    pub fn load_masks(&self) -> LoadResult<MaskCompatibility> {
        let path = self.data_dir.join("masks.ron");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no mask table, gates stay closed");
            return Ok(MaskCompatibility::new());
        }
        MaskTableLoader::load(&path)
    }

    /// Load a level layout from `levels/{name}.ron`.
    pub fn load_level(&self, name: &str) -> LoadResult<LevelSpec> {
        LevelLoader::load(&self.level_path(name))
    }

    /// Loads config, mask table, and the named level, then builds the world.
    pub fn build_level(&self, name: &str) -> LoadResult<Level> {
        let config = self.load_config()?;
        let table = self.load_masks()?;
        let spec = self.load_level(name)?;
        spec.build(config, table)
            .map_err(|e| anyhow::anyhow!("Failed to build level {}: {}", name, e))
    }

    pub fn level_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("levels").join(format!("{}.ron", name))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
