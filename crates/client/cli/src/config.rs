//! Environment defaults for command arguments.
use std::env;
use std::path::PathBuf;

use maskgrid_runtime::RuntimeConfig;

/// Client settings resolved from the environment.
///
/// Environment variables:
/// - `MASKGRID_DATA_DIR` - Content directory (default: `crates/game/content/data`)
/// - `MASKGRID_TICK_HZ` - Simulation rate (default: 60)
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub tick_hz: u32,
}

impl CliConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("MASKGRID_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(hz) = read_env::<u32>("MASKGRID_TICK_HZ") {
            config.tick_hz = hz.max(1);
        }

        config
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("crates/game/content/data"),
            tick_hz: RuntimeConfig::DEFAULT_TICK_HZ,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
