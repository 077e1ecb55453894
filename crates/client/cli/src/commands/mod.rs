//! Command implementations.
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod inspect;
mod play;

pub use inspect::Inspect;
pub use play::Play;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use maskgrid_content::{ConfigLoader, ContentFactory, Level, LevelLoader, MaskTableLoader};

use crate::config::CliConfig;

/// Arguments selecting a level and its content.
#[derive(Args)]
pub struct LevelArgs {
    /// Level name under `<DATA_DIR>/levels/`, or a path to a `.ron` level file
    #[arg(value_name = "LEVEL")]
    level: String,

    /// Content directory (defaults to $MASKGRID_DATA_DIR or the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Config TOML overriding `<DATA_DIR>/config.toml`
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Mask table RON overriding `<DATA_DIR>/masks.ron`
    #[arg(long, value_name = "FILE")]
    masks: Option<PathBuf>,
}

impl LevelArgs {
    pub fn name(&self) -> &str {
        &self.level
    }

    pub fn load(&self, env: &CliConfig) -> Result<Level> {
        let data_dir = self.data_dir.as_ref().unwrap_or(&env.data_dir);
        let factory = ContentFactory::new(data_dir);

        let config = match &self.config {
            Some(path) => ConfigLoader::load(path)?,
            None => factory.load_config()?,
        };
        let table = match &self.masks {
            Some(path) => MaskTableLoader::load(path)?,
            None => factory.load_masks()?,
        };

        let path = Path::new(&self.level);
        let spec = if path.extension().is_some_and(|ext| ext == "ron") {
            LevelLoader::load(path)?
        } else {
            factory.load_level(&self.level)?
        };

        let level = spec.build(config, table)?;
        tracing::info!(
            "loaded level `{}` (player {}, {} named entities)",
            self.level,
            level.player,
            level.names.len()
        );
        Ok(level)
    }
}
