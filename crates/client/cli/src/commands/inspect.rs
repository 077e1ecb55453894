//! Build a level and print its initial state.

use anyhow::{Context, Result};
use clap::Parser;

use maskgrid_runtime::WorldSnapshot;

use super::LevelArgs;
use crate::config::CliConfig;

/// Inspect a level
#[derive(Parser)]
pub struct Inspect {
    #[command(flatten)]
    level: LevelArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// One line per entity
    Summary,
    /// Full snapshot as RON
    Ron,
}

impl Inspect {
    pub fn execute(self) -> Result<()> {
        let level = self.level.load(&CliConfig::from_env())?;
        let snapshot = WorldSnapshot::capture(&level.world);

        match self.format {
            OutputFormat::Summary => print_summary(self.level.name(), &snapshot, &level.names),
            OutputFormat::Ron => {
                let text = ron::ser::to_string_pretty(&snapshot, ron::ser::PrettyConfig::default())
                    .context("Failed to serialize snapshot")?;
                println!("{}", text);
            }
        }
        Ok(())
    }
}

fn print_summary(
    name: &str,
    snapshot: &WorldSnapshot,
    names: &std::collections::BTreeMap<String, maskgrid_core::EntityId>,
) {
    println!(
        "level `{}`: {} entities, {} targets",
        name,
        snapshot.entities.len(),
        snapshot.targets_total
    );
    for view in &snapshot.entities {
        let label = names
            .iter()
            .find(|(_, id)| **id == view.id)
            .map(|(name, _)| format!(" `{}`", name))
            .unwrap_or_default();
        let cell = view
            .cell
            .map(|cell| cell.to_string())
            .unwrap_or_else(|| "-".to_string());
        let masks = if view.masks.is_empty() {
            String::new()
        } else {
            let list: Vec<String> = view.masks.iter().map(ToString::to_string).collect();
            format!(" masks [{}]", list.join(", "))
        };
        println!("  {} {}{} at {}{}", view.id, view.kind, label, cell, masks);
    }
}
