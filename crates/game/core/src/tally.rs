//! Shared count of targets that must be eliminated to clear a level.
use std::collections::BTreeSet;

use crate::events::GameEvent;
use crate::world::EntityId;

/// Owned by the world and handed to targets by reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetTally {
    registered: BTreeSet<EntityId>,
    eliminated: BTreeSet<EntityId>,
    completed: bool,
}

impl TargetTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, target: EntityId) {
        self.registered.insert(target);
    }

    /// Records an elimination. Returns the completion event the first time
    /// every registered target is gone.
    pub fn eliminate(&mut self, target: EntityId) -> Option<GameEvent> {
        if !self.registered.contains(&target) || !self.eliminated.insert(target) {
            return None;
        }
        tracing::info!(
            "target {} eliminated ({}/{})",
            target,
            self.eliminated.len(),
            self.registered.len()
        );

        if !self.completed && self.eliminated.len() >= self.registered.len() {
            self.completed = true;
            tracing::info!("all targets eliminated");
            return Some(GameEvent::AllTargetsEliminated);
        }
        None
    }

    pub fn total(&self) -> usize {
        self.registered.len()
    }

    pub fn eliminated(&self) -> usize {
        self.eliminated.len()
    }

    pub fn remaining(&self) -> usize {
        self.total() - self.eliminated()
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_fires_once() {
        let mut tally = TargetTally::new();
        tally.register(EntityId(1));
        tally.register(EntityId(2));

        assert_eq!(tally.eliminate(EntityId(1)), None);
        assert_eq!(tally.eliminate(EntityId(1)), None);
        assert_eq!(tally.remaining(), 1);
        assert_eq!(tally.eliminate(EntityId(2)), Some(GameEvent::AllTargetsEliminated));
        assert!(tally.is_complete());

        tally.register(EntityId(3));
        assert_eq!(tally.eliminate(EntityId(3)), None);
    }

    #[test]
    fn unregistered_targets_do_not_count() {
        let mut tally = TargetTally::new();
        assert_eq!(tally.eliminate(EntityId(5)), None);
        assert_eq!(tally.eliminated(), 0);
        assert!(!tally.is_complete());
    }
}
