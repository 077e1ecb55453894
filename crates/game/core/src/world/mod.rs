//! The simulation world: entity table, occupancy, masks, and the tick.
//!
//! # Position policy
//!
//! When a step commits, the mover's occupancy entry moves to the target cell
//! immediately, while its `position` interpolates across the step for the
//! host. Probes always use the occupancy index, so a second mover never sees
//! a half-completed step: the target is already reserved. Overlaps (triggers,
//! animals, hazards, mask items) use the cell of the interpolated position.
//!
//! # Ordering
//!
//! Entities are processed in ascending [`EntityId`] order, which is spawn
//! order. A tick runs: player input, in-flight motions, autonomous
//! behaviors, doors, mask items and despawns, then overlap detection.
mod entity;
mod tick;

pub use entity::{Entity, EntityId, EntityKind, MaskItem};

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::behavior::{AnimalWander, Behavior, GuardPatrol, PatrolSettings, WanderSettings};
use crate::config::GameConfig;
use crate::error::SetupError;
use crate::events::{GameEvent, Subscribers, SubscriptionId};
use crate::grid::{Cell, Direction, MoveInput, snap_to_lattice};
use crate::interact::{
    Block, Immovable, InteractionContext, InteractionRequest, Interactable, MaskGate, MovableBlock,
    PassiveKind, PassiveTarget,
};
use crate::mask::{MaskChange, MaskCompatibility, MaskStack, MaskType, MaskVisual, MaskVisualLayout};
use crate::movement::{MoveState, Mover, StepOutcome};
use crate::occupancy::{CellQuery, Layers, OccupancyIndex};
use crate::tally::TargetTally;
use crate::trigger::{Trigger, TriggerEffect, TriggerSignal};

/// Input for one controlled actor during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActorInput {
    pub movement: MoveInput,
    /// Pop the active mask and drop it as an item.
    pub drop_mask: bool,
}

impl ActorInput {
    pub fn moving(direction: Direction) -> Self {
        Self {
            movement: direction.into(),
            drop_mask: false,
        }
    }
}

/// Per-tick input keyed by controlled actor.
pub type InputFrame = BTreeMap<EntityId, ActorInput>;

pub struct World {
    config: GameConfig,
    table: MaskCompatibility,
    layout: MaskVisualLayout,
    index: OccupancyIndex,
    entities: BTreeMap<EntityId, Entity>,
    effects: Vec<TriggerEffect>,
    tally: TargetTally,
    hazard_contacts: BTreeSet<(EntityId, EntityId)>,
    rng: StdRng,
    events: Vec<GameEvent>,
    subscribers: Subscribers<GameEvent>,
    next_id: u32,
    tick: u64,
}

impl World {
    pub fn new(config: GameConfig, table: MaskCompatibility, seed: u64) -> Result<Self, SetupError> {
        config.validate()?;
        Ok(Self {
            layout: MaskVisualLayout::from_config(&config),
            index: OccupancyIndex::new(config.grid_unit),
            config,
            table,
            entities: BTreeMap::new(),
            effects: Vec::new(),
            tally: TargetTally::new(),
            hazard_contacts: BTreeSet::new(),
            rng: StdRng::seed_from_u64(seed),
            events: Vec::new(),
            subscribers: Subscribers::new(),
            next_id: 0,
            tick: 0,
        })
    }

    // ===== queries =====

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn compatibility(&self) -> &MaskCompatibility {
        &self.table
    }

    pub fn layout(&self) -> &MaskVisualLayout {
        &self.layout
    }

    pub fn occupancy(&self) -> &OccupancyIndex {
        &self.index
    }

    pub fn tally(&self) -> &TargetTally {
        &self.tally
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Controlled actors in processing order.
    pub fn controlled(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| entity.controlled)
            .map(|entity| entity.id)
            .collect()
    }

    pub fn position(&self, id: EntityId) -> Option<Vec3> {
        self.entity(id).map(|entity| entity.position)
    }

    /// Logical cell from the occupancy index (the reserved cell mid-step).
    pub fn cell_of(&self, id: EntityId) -> Option<Cell> {
        self.index.cell_of(id)
    }

    pub fn masks(&self, id: EntityId) -> Option<&MaskStack> {
        self.entity(id).and_then(|entity| entity.masks.as_ref())
    }

    pub fn move_state(&self, id: EntityId) -> Option<MoveState> {
        self.entity(id)
            .and_then(|entity| entity.mover.as_ref())
            .map(Mover::state)
    }

    pub fn trigger(&self, id: EntityId) -> Option<&Trigger> {
        self.entity(id).and_then(|entity| entity.trigger.as_ref())
    }

    /// Visual layers of an actor's current stack.
    pub fn mask_visuals(&self, id: EntityId) -> Vec<MaskVisual> {
        self.masks(id)
            .map(|stack| self.layout.layers(stack.as_slice()))
            .unwrap_or_default()
    }

    // ===== level construction =====

    pub fn add_ground(&mut self, cell: Cell) {
        self.index.add_ground(cell);
    }

    /// Adds ground to every cell of the inclusive rectangle.
    pub fn add_ground_rect(&mut self, min: Cell, max: Cell) {
        for x in min.x.min(max.x)..=min.x.max(max.x) {
            for z in min.z.min(max.z)..=min.z.max(max.z) {
                self.index.add_ground(Cell::new(x, z));
            }
        }
    }

    pub fn spawn_player(
        &mut self,
        cell: Cell,
        masks: impl IntoIterator<Item = MaskType>,
    ) -> Result<EntityId, SetupError> {
        let mut entity = self.build(EntityKind::Player, cell, Layers::ACTOR);
        entity.controlled = true;
        entity.mover = Some(Mover::new(
            self.config.player_move_duration,
            self.config.player_hop_height,
        ));
        entity.masks = Some(MaskStack::new(masks, self.config.bare_mask));
        self.insert(entity)
    }

    pub fn spawn_wall(&mut self, cell: Cell) -> Result<EntityId, SetupError> {
        let mut entity = self.build(EntityKind::Wall, cell, Layers::OBSTACLE);
        entity.block = Some(Block::Immovable(Immovable));
        self.insert(entity)
    }

    pub fn spawn_block(&mut self, cell: Cell) -> Result<EntityId, SetupError> {
        let mut entity = self.build(EntityKind::Block, cell, Layers::OBSTACLE);
        entity.block = Some(Block::Movable(MovableBlock::new()));
        entity.mover = Some(Mover::new(
            self.config.block_move_duration,
            self.config.block_hop_height,
        ));
        self.insert(entity)
    }

    pub fn spawn_gate(&mut self, cell: Cell, required: MaskType) -> Result<EntityId, SetupError> {
        let mut entity = self.build(EntityKind::Gate, cell, Layers::OBSTACLE);
        entity.block = Some(Block::Gate(MaskGate::new(required)));
        self.insert(entity)
    }

    /// Spawns an animal and registers it with the target tally.
    pub fn spawn_animal(&mut self, cell: Cell) -> Result<EntityId, SetupError> {
        let mut entity = self.build(EntityKind::Animal, cell, Layers::ACTOR);
        entity.block = Some(Block::Passive(PassiveTarget::new(PassiveKind::Animal)));
        let id = self.insert(entity)?;
        self.tally.register(id);
        Ok(id)
    }

    pub fn spawn_hazard(&mut self, cell: Cell) -> Result<EntityId, SetupError> {
        let mut entity = self.build(EntityKind::Hazard, cell, Layers::TRIGGER);
        entity.block = Some(Block::Passive(PassiveTarget::new(PassiveKind::Hazard)));
        self.insert(entity)
    }

    pub fn spawn_guard(
        &mut self,
        waypoints: Vec<Vec3>,
        settings: PatrolSettings,
    ) -> Result<EntityId, SetupError> {
        let start = waypoints.first().copied().unwrap_or(Vec3::ZERO);
        let cell = Cell::from_world(start, self.config.grid_unit);
        let mut entity = self.build(EntityKind::Guard, cell, Layers::ACTOR);
        entity.position = start;
        entity.behavior = Some(Behavior::Guard(GuardPatrol::new(waypoints, settings)));
        self.insert(entity)
    }

    pub fn spawn_trigger(
        &mut self,
        cell: Cell,
        filter: Layers,
        one_shot: bool,
    ) -> Result<EntityId, SetupError> {
        let mut entity = self.build(EntityKind::Trigger, cell, Layers::TRIGGER);
        entity.trigger = Some(Trigger::new(filter, one_shot));
        self.insert(entity)
    }

    /// Makes an existing actor wander between `waypoints`.
    pub fn attach_wander(
        &mut self,
        id: EntityId,
        waypoints: Vec<Vec3>,
        settings: WanderSettings,
    ) -> Result<(), SetupError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(SetupError::UnknownEntity(id))?;
        entity.behavior = Some(Behavior::Wander(AnimalWander::new(waypoints, settings)));
        Ok(())
    }

    pub fn bind_effect(&mut self, effect: TriggerEffect) -> Result<(), SetupError> {
        let trigger = self
            .entities
            .get(&effect.trigger)
            .ok_or(SetupError::UnknownEntity(effect.trigger))?;
        if trigger.trigger.is_none() {
            return Err(SetupError::MissingComponent {
                entity: effect.trigger,
                component: "trigger",
            });
        }
        if let Some(missing) = effect
            .enable
            .iter()
            .chain(&effect.disable)
            .find(|id| !self.entities.contains_key(*id))
        {
            return Err(SetupError::UnknownEntity(*missing));
        }
        self.effects.push(effect);
        Ok(())
    }

    /// Adds or removes an entity from play. Disabled entities neither block
    /// nor trigger.
    pub fn set_enabled(&mut self, id: EntityId, enabled: bool) -> Result<(), SetupError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(SetupError::UnknownEntity(id))?;
        if entity.enabled == enabled {
            return Ok(());
        }

        if enabled {
            let cell = Cell::from_world(entity.position, self.config.grid_unit);
            self.index.insert(id, cell, entity.layers)?;
        } else {
            self.index.remove(id);
        }
        entity.enabled = enabled;
        tracing::debug!("{} {} {}", entity.kind, id, if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    // ===== masks =====

    pub fn push_mask(&mut self, actor: EntityId, mask: MaskType) -> Result<bool, SetupError> {
        let stack = self.stack_mut(actor)?;
        let pushed = stack.push(mask);
        if pushed {
            self.events.push(GameEvent::MaskPushed { actor, mask });
        }
        Ok(pushed)
    }

    /// Pops the active mask and drops it as an item on the actor's cell.
    ///
    /// The item is placed before the stack changes, so a full cell leaves
    /// the stack untouched.
    pub fn pop_mask(&mut self, actor: EntityId) -> Result<Option<MaskType>, SetupError> {
        let layout = self.layout;
        let stack = self.stack_mut(actor)?;
        if stack.len() <= 1 {
            return Ok(stack.pop());
        }
        let mask = stack.top();
        let visual = layout
            .layers(stack.as_slice())
            .into_iter()
            .find(|visual| visual.mask == mask)
            .unwrap_or_else(|| MaskVisual::unlayered(mask));

        let position = self
            .entities
            .get(&actor)
            .map(|entity| entity.position)
            .ok_or(SetupError::UnknownEntity(actor))?;
        let cell = Cell::from_world(position, self.config.grid_unit);

        let mut item = self.build(EntityKind::MaskItem, cell, Layers::ITEM | Layers::TRIGGER);
        item.item = Some(MaskItem::dropped(mask, actor, visual));
        let item_id = self.insert(item)?;

        self.stack_mut(actor)?.pop();
        self.events.push(GameEvent::MaskPopped { actor, mask });
        tracing::debug!("{} dropped {} at {}", actor, mask, cell);
        self.events.push(GameEvent::MaskDropped {
            item: item_id,
            mask,
            cell,
        });
        Ok(Some(mask))
    }

    pub fn subscribe_masks(
        &mut self,
        actor: EntityId,
        observer: impl FnMut(&MaskChange) + Send + 'static,
    ) -> Result<SubscriptionId, SetupError> {
        Ok(self.stack_mut(actor)?.subscribe(observer))
    }

    pub fn unsubscribe_masks(
        &mut self,
        actor: EntityId,
        id: SubscriptionId,
    ) -> Result<bool, SetupError> {
        Ok(self.stack_mut(actor)?.unsubscribe(id))
    }

    fn stack_mut(&mut self, actor: EntityId) -> Result<&mut MaskStack, SetupError> {
        self.entities
            .get_mut(&actor)
            .ok_or(SetupError::UnknownEntity(actor))?
            .masks
            .as_mut()
            .ok_or(SetupError::MissingComponent {
                entity: actor,
                component: "masks",
            })
    }

    // ===== game events =====

    pub fn subscribe(&mut self, observer: impl FnMut(&GameEvent) + Send + 'static) -> SubscriptionId {
        self.subscribers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // ===== triggers =====

    pub fn activate_trigger(&mut self, id: EntityId) -> Result<bool, SetupError> {
        let signal = self.trigger_mut(id)?.activate_external();
        Ok(self.apply_optional_signal(id, signal))
    }

    pub fn deactivate_trigger(&mut self, id: EntityId) -> Result<bool, SetupError> {
        let signal = self.trigger_mut(id)?.deactivate_external();
        Ok(self.apply_optional_signal(id, signal))
    }

    pub fn reset_trigger(&mut self, id: EntityId) -> Result<(), SetupError> {
        self.trigger_mut(id)?.reset();
        Ok(())
    }

    fn trigger_mut(&mut self, id: EntityId) -> Result<&mut Trigger, SetupError> {
        self.entities
            .get_mut(&id)
            .ok_or(SetupError::UnknownEntity(id))?
            .trigger
            .as_mut()
            .ok_or(SetupError::MissingComponent {
                entity: id,
                component: "trigger",
            })
    }

    fn apply_optional_signal(&mut self, id: EntityId, signal: Option<TriggerSignal>) -> bool {
        match signal {
            Some(signal) => {
                self.apply_signal(id, signal);
                true
            }
            None => false,
        }
    }

    pub(crate) fn apply_signal(&mut self, trigger: EntityId, signal: TriggerSignal) {
        tracing::info!("trigger {} {:?}", trigger, signal);
        self.events.push(match signal {
            TriggerSignal::Activated => GameEvent::TriggerActivated { trigger },
            TriggerSignal::Deactivated => GameEvent::TriggerDeactivated { trigger },
        });

        let changes: Vec<_> = self
            .effects
            .iter()
            .filter(|effect| effect.trigger == trigger)
            .flat_map(|effect| effect.changes(signal))
            .collect();
        for (target, enabled) in changes {
            if let Err(err) = self.set_enabled(target, enabled) {
                tracing::warn!("trigger {} could not toggle {}: {}", trigger, target, err);
            }
        }
    }

    // ===== movement =====

    /// Runs one resolution for `actor` toward `direction`.
    pub fn resolve_step(
        &mut self,
        actor: EntityId,
        direction: Direction,
    ) -> Result<StepOutcome, SetupError> {
        let unit = self.config.grid_unit;
        let bare = self.config.bare_mask;
        let entity = self
            .entities
            .get_mut(&actor)
            .ok_or(SetupError::UnknownEntity(actor))?;
        let origin = entity.position;
        let active_mask = entity.masks.as_ref().map_or(bare, MaskStack::top);
        let enabled = entity.enabled;
        let mover = entity.mover.as_mut().ok_or(SetupError::MissingComponent {
            entity: actor,
            component: "mover",
        })?;

        if !enabled || !mover.begin(direction) {
            return Ok(StepOutcome::Busy);
        }

        let target = snap_to_lattice(origin + direction.vector() * unit, unit);
        let request = InteractionRequest {
            actor,
            direction,
            from: origin,
            target,
            active_mask,
        };

        if !self.check_step(&request) {
            self.finish_reject(actor, direction);
            return Ok(StepOutcome::Rejected);
        }

        let to = Cell::from_world(target, unit);
        if let Err(err) = self.index.relocate(actor, to) {
            tracing::warn!("{} cannot reserve {}: {}", actor, to, err);
            self.finish_reject(actor, direction);
            return Ok(StepOutcome::Rejected);
        }

        let from = Cell::from_world(origin, unit);
        if let Some(mover) = self
            .entities
            .get_mut(&actor)
            .and_then(|entity| entity.mover.as_mut())
        {
            mover.commit(origin, target);
        }
        tracing::debug!("{} commits {} -> {}", actor, from, to);
        self.events.push(GameEvent::MoveCommitted { actor, from, to });
        Ok(StepOutcome::Committed)
    }

    fn finish_reject(&mut self, actor: EntityId, direction: Direction) {
        if let Some(mover) = self
            .entities
            .get_mut(&actor)
            .and_then(|entity| entity.mover.as_mut())
        {
            mover.reject();
        }
        self.events.push(GameEvent::MoveRejected { actor, direction });
    }

    /// Ground check, probe, and interaction for a pending request.
    fn check_step(&mut self, request: &InteractionRequest) -> bool {
        let unit = self.config.grid_unit;
        if self.config.require_ground && !self.index.query_ground(request.target) {
            tracing::debug!("{} has no ground toward {}", request.actor, request.direction);
            return false;
        }

        let Some(occupant) =
            self.index
                .query_occupant(request.from, request.direction, unit, Layers::SOLID)
        else {
            return true;
        };

        // Every solid occupant of the cell must agree. Occupants without an
        // interactable rank first since they always refuse.
        let mut occupants: Vec<(u8, EntityId)> = self
            .index
            .occupants_at(occupant.cell)
            .filter(|(_, layers)| layers.is_solid())
            .map(|(id, _)| {
                let rank = self
                    .entities
                    .get(&id)
                    .and_then(|entity| entity.block.as_ref())
                    .map_or(0, Block::resolve_rank);
                (rank, id)
            })
            .collect();
        occupants.sort_by_key(|(rank, _)| *rank);

        let mut pushes = Vec::new();
        for (_, id) in occupants {
            match self.ask_occupant(id, request) {
                Some(Some(direction)) => pushes.push((id, direction)),
                Some(None) => {}
                None => {
                    self.cancel_pushes(&pushes);
                    return false;
                }
            }
        }

        let mut moved = true;
        for (id, direction) in pushes {
            moved &= self.push_block(id, direction);
        }
        moved
    }

    /// Asks one occupant. `None` denies; `Some` carries an accepted push.
    fn ask_occupant(
        &mut self,
        id: EntityId,
        request: &InteractionRequest,
    ) -> Option<Option<Direction>> {
        let Some(entity) = self.entities.get_mut(&id) else {
            tracing::warn!("occupant {} missing from entity table", id);
            return None;
        };
        let self_position = entity.position;
        let Some(block) = entity.block.as_mut() else {
            tracing::debug!("{} blocked by {} {}", request.actor, entity.kind, id);
            return None;
        };

        let mut ctx = InteractionContext {
            query: &self.index,
            table: &self.table,
            config: &self.config,
            events: &mut self.events,
            self_id: id,
            self_position,
        };
        if !block.can_enter(request, &mut ctx) {
            tracing::debug!("{} refused by {} {}", request.actor, entity.kind, id);
            return None;
        }
        Some(block.as_movable_mut().and_then(MovableBlock::take_pending))
    }

    /// Releases blocks that accepted a push the request will not make.
    fn cancel_pushes(&mut self, pushes: &[(EntityId, Direction)]) {
        for (id, _) in pushes {
            if let Some(block) = self
                .entities
                .get_mut(id)
                .and_then(|entity| entity.block.as_mut())
                .and_then(Block::as_movable_mut)
            {
                block.finish_move();
            }
        }
    }

    /// Relocates a block whose push was accepted.
    fn push_block(&mut self, id: EntityId, direction: Direction) -> bool {
        let unit = self.config.grid_unit;
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        let from = entity.position;
        let target = snap_to_lattice(from + direction.vector() * unit, unit);
        let to = Cell::from_world(target, unit);

        if let Err(err) = self.index.relocate(id, to) {
            tracing::warn!("block {} cannot move to {}: {}", id, to, err);
            if let Some(block) = entity.block.as_mut().and_then(Block::as_movable_mut) {
                block.finish_move();
            }
            return false;
        }

        if let Some(mover) = entity.mover.as_mut() {
            mover.begin(direction);
            mover.commit(from, target);
        } else {
            entity.position = target;
        }
        tracing::debug!("block {} pushed to {}", id, to);
        self.events.push(GameEvent::BlockPushed { block: id, to });
        true
    }

    // ===== internals =====

    fn build(&self, kind: EntityKind, cell: Cell, layers: Layers) -> Entity {
        let id = EntityId(self.next_id);
        Entity::new(id, kind, cell.to_world(self.config.grid_unit, 0.0), layers)
    }

    fn insert(&mut self, entity: Entity) -> Result<EntityId, SetupError> {
        let id = entity.id;
        let cell = Cell::from_world(entity.position, self.config.grid_unit);
        self.index.insert(id, cell, entity.layers)?;
        self.entities.insert(id, entity);
        self.next_id += 1;
        Ok(id)
    }

    fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.index.remove(id);
        self.hazard_contacts
            .retain(|(hazard, actor)| *hazard != id && *actor != id);
        let entity = self.entities.remove(&id)?;
        tracing::debug!("{} {} despawned", entity.kind, id);
        Some(entity)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("tick", &self.tick)
            .field("entities", &self.entities.len())
            .field("effects", &self.effects.len())
            .field("tally", &self.tally)
            .finish()
    }
}
