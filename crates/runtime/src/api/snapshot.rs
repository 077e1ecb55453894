//! Read-only views of the world handed to clients and input providers.
use glam::Vec3;
use serde::{Deserialize, Serialize};

use maskgrid_core::{Cell, EntityId, EntityKind, MaskType, MoveState, World};

/// Observable state of one entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub enabled: bool,
    pub controlled: bool,
    pub position: Vec3,
    /// Occupancy cell, `None` while disabled.
    pub cell: Option<Cell>,
    pub move_state: Option<MoveState>,
    /// Mask stack, active mask first.
    pub masks: Vec<MaskType>,
}

/// Point-in-time copy of the world for decision making and display.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub entities: Vec<EntityView>,
    pub targets_total: usize,
    pub targets_remaining: usize,
    pub complete: bool,
}

impl WorldSnapshot {
    pub fn capture(world: &World) -> Self {
        let entities = world
            .entities()
            .map(|entity| EntityView {
                id: entity.id,
                kind: entity.kind,
                enabled: entity.enabled,
                controlled: entity.controlled,
                position: entity.position,
                cell: world.cell_of(entity.id),
                move_state: world.move_state(entity.id),
                masks: world
                    .masks(entity.id)
                    .map(|stack| stack.as_slice().iter().rev().copied().collect())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            tick: world.tick_count(),
            entities,
            targets_total: world.tally().total(),
            targets_remaining: world.tally().remaining(),
            complete: world.tally().is_complete(),
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntityView> {
        self.entities.iter().find(|view| view.id == id)
    }

    /// Controlled actors in ascending id order.
    pub fn controlled(&self) -> impl Iterator<Item = &EntityView> {
        self.entities.iter().filter(|view| view.controlled)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
