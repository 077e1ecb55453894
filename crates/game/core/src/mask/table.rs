use std::collections::{BTreeMap, BTreeSet};

use super::MaskType;

/// Compatibility table consulted by mask gates.
///
/// Maps a gate's required mask to the set of active masks that open it.
/// Matching is not reflexive: a gate requiring `Wolf` only opens for `Wolf`
/// if the table says so.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskCompatibility {
    entries: BTreeMap<MaskType, BTreeSet<MaskType>>,
}

impl MaskCompatibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::allow`].
    pub fn with(mut self, required: MaskType, matches: impl IntoIterator<Item = MaskType>) -> Self {
        self.allow(required, matches);
        self
    }

    pub fn allow(&mut self, required: MaskType, matches: impl IntoIterator<Item = MaskType>) {
        self.entries.entry(required).or_default().extend(matches);
    }

    pub fn matches(&self, required: MaskType, active: MaskType) -> bool {
        self.entries
            .get(&required)
            .is_some_and(|set| set.contains(&active))
    }
}

impl FromIterator<(MaskType, Vec<MaskType>)> for MaskCompatibility {
    fn from_iter<T: IntoIterator<Item = (MaskType, Vec<MaskType>)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (required, matches) in iter {
            table.allow(required, matches);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_scenario_wolf_matches_sheep() {
        let table = MaskCompatibility::new().with(MaskType::Wolf, [MaskType::Sheep]);
        assert!(table.matches(MaskType::Wolf, MaskType::Sheep));
        assert!(!table.matches(MaskType::Wolf, MaskType::Pig));
        assert!(!table.matches(MaskType::Wolf, MaskType::Wolf));
        assert!(!table.matches(MaskType::Sheep, MaskType::Wolf));
    }

    #[test]
    fn entries_accumulate() {
        let table: MaskCompatibility = [
            (MaskType::Pig, vec![MaskType::Cow]),
            (MaskType::Pig, vec![MaskType::Chicken]),
        ]
        .into_iter()
        .collect();

        assert!(table.matches(MaskType::Pig, MaskType::Cow));
        assert!(table.matches(MaskType::Pig, MaskType::Chicken));
        assert!(!table.matches(MaskType::Pig, MaskType::Pig));
    }
}
