//! Pressure-plate style triggers and the effects bound to them.
use std::collections::BTreeSet;

use crate::occupancy::Layers;
use crate::world::EntityId;

/// Transition reported by a [`Trigger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerSignal {
    Activated,
    Deactivated,
}

/// Region tracking the set of overlapping entities.
///
/// Fires `Activated` when the set goes from empty to non-empty and
/// `Deactivated` when it empties again. A one-shot trigger fires once and
/// ignores everything until [`Trigger::reset`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trigger {
    filter: Layers,
    one_shot: bool,
    overlapping: BTreeSet<EntityId>,
    pressed: bool,
    fired: bool,
}

impl Trigger {
    pub fn new(filter: Layers, one_shot: bool) -> Self {
        Self {
            filter,
            one_shot,
            overlapping: BTreeSet::new(),
            pressed: false,
            fired: false,
        }
    }

    /// Layers of entities this trigger reacts to.
    pub fn filter(&self) -> Layers {
        self.filter
    }

    pub fn is_one_shot(&self) -> bool {
        self.one_shot
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn overlapping(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.overlapping.iter().copied()
    }

    pub fn enter(&mut self, id: EntityId) -> Option<TriggerSignal> {
        if self.one_shot && self.fired {
            return None;
        }
        if !self.overlapping.insert(id) {
            return None;
        }
        if self.overlapping.len() == 1 {
            return self.activate();
        }
        None
    }

    pub fn exit(&mut self, id: EntityId) -> Option<TriggerSignal> {
        if !self.overlapping.remove(&id) {
            return None;
        }
        if self.overlapping.is_empty() && !self.one_shot {
            return self.deactivate();
        }
        None
    }

    pub fn activate_external(&mut self) -> Option<TriggerSignal> {
        if self.one_shot && self.fired {
            return None;
        }
        self.activate()
    }

    pub fn deactivate_external(&mut self) -> Option<TriggerSignal> {
        if self.one_shot {
            return None;
        }
        self.deactivate()
    }

    /// Re-arms a one-shot trigger. No effect on regular triggers.
    pub fn reset(&mut self) {
        if self.one_shot {
            self.fired = false;
            self.pressed = false;
            self.overlapping.clear();
        }
    }

    fn activate(&mut self) -> Option<TriggerSignal> {
        if self.pressed {
            return None;
        }
        self.pressed = true;
        if self.one_shot {
            self.fired = true;
        }
        Some(TriggerSignal::Activated)
    }

    fn deactivate(&mut self) -> Option<TriggerSignal> {
        if !self.pressed {
            return None;
        }
        self.pressed = false;
        Some(TriggerSignal::Deactivated)
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new(Layers::SOLID, false)
    }
}

/// Enables and disables entities when a trigger changes state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerEffect {
    pub trigger: EntityId,
    pub enable: Vec<EntityId>,
    pub disable: Vec<EntityId>,
    /// Undo the effect when the trigger deactivates.
    pub revert_on_release: bool,
}

impl TriggerEffect {
    /// `(entity, enabled)` pairs to apply for `signal`, in list order.
    pub fn changes(&self, signal: TriggerSignal) -> Vec<(EntityId, bool)> {
        let (on, off) = match signal {
            TriggerSignal::Activated => (true, false),
            TriggerSignal::Deactivated if self.revert_on_release => (false, true),
            TriggerSignal::Deactivated => return Vec::new(),
        };
        self.enable
            .iter()
            .map(|id| (*id, on))
            .chain(self.disable.iter().map(|id| (*id, off)))
            .collect()
    }
}
