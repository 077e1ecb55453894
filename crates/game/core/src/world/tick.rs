use std::collections::BTreeSet;

use glam::Quat;

use crate::error::{ErrorContext, GameError};
use crate::events::GameEvent;
use crate::grid::{Cell, Direction};
use crate::interact::{Block, PassiveKind};
use crate::occupancy::Layers;

use super::{EntityId, InputFrame, World};

/// Snapshot of an entity's body used by the overlap pass.
#[derive(Clone, Copy)]
struct Body {
    id: EntityId,
    cell: Cell,
    layers: Layers,
    controlled: bool,
}

impl World {
    /// Advances the simulation by `dt` seconds and returns the events raised.
    ///
    /// Observers registered with [`World::subscribe`] see every returned
    /// event before this call returns.
    pub fn tick(&mut self, dt: f32, inputs: &InputFrame) -> Vec<GameEvent> {
        self.tick += 1;
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();

        for &id in &ids {
            self.apply_input(id, inputs);
        }
        for &id in &ids {
            self.advance_motion(id, dt, inputs);
        }
        for &id in &ids {
            self.advance_behavior(id, dt);
        }
        self.advance_doors(dt);
        self.advance_items(dt);
        self.advance_despawns(dt);
        self.detect_overlaps();

        self.drain_events()
    }

    /// Takes queued events and notifies subscribers. Events raised by calls
    /// made between ticks (mask pushes, external trigger presses) otherwise
    /// ride along with the next tick.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        let events = std::mem::take(&mut self.events);
        for event in &events {
            self.subscribers.notify(event);
        }
        events
    }

    fn input_direction(&self, id: EntityId, inputs: &InputFrame) -> Option<Direction> {
        inputs
            .get(&id)
            .and_then(|input| input.movement.direction(self.config.input_deadzone))
    }

    fn apply_input(&mut self, id: EntityId, inputs: &InputFrame) {
        let Some(entity) = self.entities.get(&id) else {
            return;
        };
        if !entity.controlled || !entity.enabled {
            return;
        }
        let idle = entity.mover.as_ref().is_some_and(|mover| mover.is_idle());

        if inputs.get(&id).is_some_and(|input| input.drop_mask) {
            if let Err(err) = self.pop_mask(id) {
                tracing::warn!("{} cannot drop a mask: {}", id, err);
            }
        }

        if idle {
            if let Some(direction) = self.input_direction(id, inputs) {
                self.step(id, direction);
            }
        }
    }

    fn step(&mut self, id: EntityId, direction: Direction) {
        if let Err(err) = self.resolve_step(id, direction) {
            tracing::warn!("{} step {} failed: {}", id, direction, err);
        }
    }

    fn advance_motion(&mut self, id: EntityId, dt: f32, inputs: &InputFrame) {
        let unit = self.config.grid_unit;
        let facing_rate = self.config.facing_speed;
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if !entity.enabled {
            return;
        }
        let Some(mover) = entity.mover.as_mut() else {
            return;
        };

        let sample = mover.advance(dt, facing_rate);
        let moving = mover.is_moving();
        let facing = mover.facing.current;
        entity.facing = facing;
        if entity.controlled {
            entity.animator.is_moving = moving;
        }

        let Some(sample) = sample else {
            return;
        };
        entity.position = sample.position;
        if !sample.finished {
            return;
        }

        if let Some(block) = entity.block.as_mut().and_then(Block::as_movable_mut) {
            block.finish_move();
        }
        let controlled = entity.controlled;
        let cell = Cell::from_world(sample.position, unit);
        self.events.push(GameEvent::MoveCompleted { actor: id, cell });

        // A held input chains straight into the next step.
        if controlled {
            if let Some(direction) = self.input_direction(id, inputs) {
                self.step(id, direction);
            }
        }
    }

    fn advance_behavior(&mut self, id: EntityId, dt: f32) {
        let World {
            entities,
            index,
            rng,
            events,
            config,
            tick,
            ..
        } = self;
        let Some(entity) = entities.get_mut(&id) else {
            return;
        };
        if !entity.enabled {
            return;
        }
        let Some(behavior) = entity.behavior.as_mut() else {
            return;
        };
        if behavior.is_disabled() {
            return;
        }

        if !behavior.is_started() {
            if let Err(err) = behavior.start(id, &mut entity.position) {
                let context = ErrorContext::new(*tick)
                    .with_actor(id)
                    .with_cell(Cell::from_world(entity.position, config.grid_unit))
                    .with_message("behavior disabled");
                tracing::error!(
                    code = err.error_code(),
                    severity = err.severity().as_str(),
                    ?context,
                    "{}",
                    err
                );
                events.push(GameEvent::BehaviorDisabled {
                    actor: id,
                    reason: err.to_string(),
                });
                return;
            }
        } else {
            behavior.advance(dt, &mut entity.position, rng, &mut entity.animator);
        }

        entity.facing = Quat::from_rotation_y(behavior.yaw());
        let cell = Cell::from_world(entity.position, config.grid_unit);
        if index.cell_of(id) != Some(cell) {
            if let Err(err) = index.relocate(id, cell) {
                tracing::warn!("{} could not follow its path into {}: {}", id, cell, err);
            }
        }
    }

    fn advance_doors(&mut self, dt: f32) {
        let open = self.config.door_open_duration;
        let dwell = self.config.door_dwell;
        for entity in self.entities.values_mut().filter(|entity| entity.enabled) {
            if let Some(Block::Gate(gate)) = entity.block.as_mut() {
                if let Some(phase) = gate.door.advance(dt, open, dwell) {
                    tracing::debug!("door {} {}", entity.id, phase);
                }
            }
        }
    }

    fn advance_items(&mut self, dt: f32) {
        let duration = self.config.mask_equip_duration;
        let mut ready = Vec::new();
        for entity in self.entities.values_mut().filter(|entity| entity.enabled) {
            let Some(item) = entity.item.as_mut() else {
                continue;
            };
            if let Some(timer) = item.equip_timer.as_mut() {
                *timer += dt;
                if *timer >= duration {
                    ready.push(entity.id);
                }
            }
        }

        for id in ready {
            self.finish_equip(id);
        }
    }

    fn finish_equip(&mut self, id: EntityId) {
        let Some(item) = self.entities.get(&id).and_then(|entity| entity.item) else {
            return;
        };

        match self.push_mask(item.owner, item.mask) {
            Ok(true) => {
                tracing::info!("{} re-equipped {}", item.owner, item.mask);
                self.events.push(GameEvent::MaskReequipped {
                    actor: item.owner,
                    mask: item.mask,
                });
                self.despawn(id);
            }
            Ok(false) => {
                if let Some(item) = self.entities.get_mut(&id).and_then(|e| e.item.as_mut()) {
                    item.equip_timer = None;
                }
            }
            Err(err) => {
                tracing::warn!("mask item {} has no valid owner: {}", id, err);
                if let Some(item) = self.entities.get_mut(&id).and_then(|e| e.item.as_mut()) {
                    item.equip_timer = None;
                }
            }
        }
    }

    fn advance_despawns(&mut self, dt: f32) {
        let mut expired = Vec::new();
        for entity in self.entities.values_mut() {
            if let Some(remaining) = entity.despawn_in.as_mut() {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    expired.push(entity.id);
                }
            }
        }
        for id in expired {
            self.despawn(id);
        }
    }

    fn detect_overlaps(&mut self) {
        let unit = self.config.grid_unit;
        let bodies: Vec<Body> = self
            .entities
            .values()
            .filter(|entity| entity.enabled)
            .map(|entity| Body {
                id: entity.id,
                cell: Cell::from_world(entity.position, unit),
                layers: entity.layers,
                controlled: entity.controlled,
            })
            .collect();

        self.overlap_triggers(&bodies);
        self.overlap_passives(&bodies);
        self.overlap_items(&bodies);
    }

    fn overlap_triggers(&mut self, bodies: &[Body]) {
        let unit = self.config.grid_unit;
        let mut signals = Vec::new();

        for entity in self.entities.values_mut().filter(|entity| entity.enabled) {
            let id = entity.id;
            let cell = Cell::from_world(entity.position, unit);
            let Some(trigger) = entity.trigger.as_mut() else {
                continue;
            };

            let inside: BTreeSet<EntityId> = bodies
                .iter()
                .filter(|body| {
                    body.id != id && body.cell == cell && body.layers.intersects(trigger.filter())
                })
                .map(|body| body.id)
                .collect();
            let left: Vec<EntityId> = trigger
                .overlapping()
                .filter(|other| !inside.contains(other))
                .collect();

            for other in left {
                if let Some(signal) = trigger.exit(other) {
                    signals.push((id, signal));
                }
            }
            for other in inside {
                if let Some(signal) = trigger.enter(other) {
                    signals.push((id, signal));
                }
            }
        }

        for (id, signal) in signals {
            self.apply_signal(id, signal);
        }
    }

    fn overlap_passives(&mut self, bodies: &[Body]) {
        let delay = self.config.target_despawn_delay;
        let mut contacts = BTreeSet::new();

        for player in bodies.iter().filter(|body| body.controlled) {
            for other in bodies.iter().filter(|body| body.cell == player.cell) {
                let Some(entity) = self.entities.get_mut(&other.id) else {
                    continue;
                };
                let Some(Block::Passive(target)) = entity.block.as_mut() else {
                    continue;
                };

                match target.kind {
                    PassiveKind::Animal if !target.eliminated => {
                        target.eliminated = true;
                        entity.despawn_in = Some(delay);
                        self.events.push(GameEvent::TargetEliminated {
                            target: other.id,
                            by: player.id,
                        });
                        if let Some(done) = self.tally.eliminate(other.id) {
                            self.events.push(done);
                        }
                    }
                    PassiveKind::Animal => {}
                    PassiveKind::Hazard => {
                        let contact = (other.id, player.id);
                        if !self.hazard_contacts.contains(&contact) {
                            tracing::info!("{} defeated by hazard {}", player.id, other.id);
                            self.events.push(GameEvent::ActorDefeated {
                                actor: player.id,
                                hazard: other.id,
                            });
                        }
                        contacts.insert(contact);
                    }
                }
            }
        }

        self.hazard_contacts = contacts;
    }

    fn overlap_items(&mut self, bodies: &[Body]) {
        let unit = self.config.grid_unit;
        for entity in self.entities.values_mut().filter(|entity| entity.enabled) {
            let cell = Cell::from_world(entity.position, unit);
            let Some(item) = entity.item.as_mut() else {
                continue;
            };

            let inside = bodies
                .iter()
                .any(|body| body.id == item.owner && body.cell == cell);
            if !inside {
                item.equippable = true;
            } else if !item.owner_inside && item.equippable && item.equip_timer.is_none() {
                tracing::debug!("{} picking up {}", item.owner, item.mask);
                item.equip_timer = Some(0.0);
            }
            item.owner_inside = inside;
        }
    }
}
