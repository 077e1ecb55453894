//! Interactable capability consulted when a mover probes an occupied cell.
//!
//! Every occupant that can be bumped into carries a [`Block`]. The resolver
//! asks it [`Interactable::can_enter`]; side effects (door opening, block
//! relocation) happen only on the `true` path.
mod door;
mod push;

pub use door::{Door, DoorPhase, MaskGate};
pub use push::MovableBlock;

use glam::Vec3;

use crate::config::GameConfig;
use crate::events::GameEvent;
use crate::grid::Direction;
use crate::mask::{MaskCompatibility, MaskType};
use crate::occupancy::CellQuery;
use crate::world::EntityId;

/// Attempted move, built fresh for each resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionRequest {
    pub actor: EntityId,
    pub direction: Direction,
    pub from: Vec3,
    pub target: Vec3,
    pub active_mask: MaskType,
}

/// World access granted to an interactable during one `can_enter` call.
pub struct InteractionContext<'a> {
    pub query: &'a dyn CellQuery,
    pub table: &'a MaskCompatibility,
    pub config: &'a GameConfig,
    pub events: &'a mut Vec<GameEvent>,
    /// Entity owning the interactable being asked.
    pub self_id: EntityId,
    /// Logical position of that entity.
    pub self_position: Vec3,
}

pub trait Interactable {
    /// Whether the requester may enter this occupant's cell.
    fn can_enter(
        &mut self,
        request: &InteractionRequest,
        ctx: &mut InteractionContext<'_>,
    ) -> bool;
}

/// Static obstacle. Never passable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Immovable;

impl Interactable for Immovable {
    fn can_enter(&mut self, _: &InteractionRequest, _: &mut InteractionContext<'_>) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassiveKind {
    /// Eliminated when the player overlaps it.
    Animal,
    /// Defeats the player on overlap.
    Hazard,
}

/// Never blocks; overlap effects are handled by the world's overlap pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassiveTarget {
    pub kind: PassiveKind,
    pub eliminated: bool,
}

impl PassiveTarget {
    pub fn new(kind: PassiveKind) -> Self {
        Self {
            kind,
            eliminated: false,
        }
    }
}

impl Interactable for PassiveTarget {
    fn can_enter(&mut self, _: &InteractionRequest, _: &mut InteractionContext<'_>) -> bool {
        true
    }
}

/// Closed set of interactable variants.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Immovable(Immovable),
    Gate(MaskGate),
    Movable(MovableBlock),
    Passive(PassiveTarget),
}

impl Block {
    pub fn as_gate(&self) -> Option<&MaskGate> {
        match self {
            Block::Gate(gate) => Some(gate),
            _ => None,
        }
    }

    pub fn as_movable_mut(&mut self) -> Option<&mut MovableBlock> {
        match self {
            Block::Movable(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_passive(&self) -> Option<&PassiveTarget> {
        match self {
            Block::Passive(target) => Some(target),
            _ => None,
        }
    }

    /// Order in which occupants sharing a cell are asked. Variants that can
    /// deny come first; a gate only opens once nothing before it refused.
    pub fn resolve_rank(&self) -> u8 {
        match self {
            Block::Immovable(_) => 0,
            Block::Movable(_) => 1,
            Block::Gate(_) => 2,
            Block::Passive(_) => 3,
        }
    }
}

impl Interactable for Block {
    fn can_enter(
        &mut self,
        request: &InteractionRequest,
        ctx: &mut InteractionContext<'_>,
    ) -> bool {
        let allowed = match self {
            Block::Immovable(block) => block.can_enter(request, ctx),
            Block::Gate(gate) => gate.can_enter(request, ctx),
            Block::Movable(block) => block.can_enter(request, ctx),
            Block::Passive(target) => target.can_enter(request, ctx),
        };
        tracing::debug!(
            "{} asks {} to enter: {}",
            request.actor,
            ctx.self_id,
            if allowed { "allowed" } else { "denied" }
        );
        allowed
    }
}
