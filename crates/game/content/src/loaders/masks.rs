//! Mask compatibility table loader.

use std::collections::BTreeMap;
use std::path::Path;

use maskgrid_core::{MaskCompatibility, MaskType};

use crate::loaders::{LoadResult, read_file};

/// Loader for the gate compatibility table.
///
/// File format: `BTreeMap<MaskType, Vec<MaskType>>`, mapping a gate's
/// required mask to the active masks that open it.
///
/// Example:
/// ```text
/// {
///     Wolf: [Sheep],
///     Pig: [Cow, Chicken],
/// }
/// ```
pub struct MaskTableLoader;

impl MaskTableLoader {
    pub fn load(path: &Path) -> LoadResult<MaskCompatibility> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load mask table {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<MaskCompatibility> {
        let raw: BTreeMap<MaskType, Vec<MaskType>> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse mask table RON: {}", e))?;
        Ok(raw.into_iter().collect())
    }
}
