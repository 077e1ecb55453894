use crate::grid::Direction;
use crate::occupancy::Layers;

use super::{InteractionContext, InteractionRequest, Interactable};

/// Block that relocates one cell when pushed into a free cell.
///
/// Chains are not supported: a block whose destination holds any solid
/// occupant (including another block) denies the push.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovableBlock {
    resolving: bool,
    in_flight: bool,
    pending: Option<Direction>,
}

impl MovableBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Direction of an accepted push the world has not applied yet.
    pub fn take_pending(&mut self) -> Option<Direction> {
        self.pending.take()
    }

    /// Called by the world once the block's relocation finished.
    pub fn finish_move(&mut self) {
        self.in_flight = false;
    }

    fn destination_clear(&self, direction: Direction, ctx: &InteractionContext<'_>) -> bool {
        let unit = ctx.config.grid_unit;
        if ctx
            .query
            .query_occupant(ctx.self_position, direction, unit, Layers::SOLID)
            .is_some()
        {
            return false;
        }
        !ctx.config.require_ground
            || ctx
                .query
                .query_ground(ctx.self_position + direction.vector() * unit)
    }
}

impl Interactable for MovableBlock {
    fn can_enter(
        &mut self,
        request: &InteractionRequest,
        ctx: &mut InteractionContext<'_>,
    ) -> bool {
        if self.resolving || self.in_flight || self.pending.is_some() {
            return false;
        }

        self.resolving = true;
        let clear = self.destination_clear(request.direction, ctx);
        self.resolving = false;

        if !clear {
            return false;
        }
        self.pending = Some(request.direction);
        self.in_flight = true;
        true
    }
}
