use std::sync::{Arc, Mutex};

use glam::Vec3;
use maskgrid_core::{
    ActorInput, Cell, Direction, DoorPhase, EntityId, GameConfig, GameEvent, InputFrame, Layers,
    MaskCompatibility, MaskType, MoveState, PatrolSettings, SetupError, StepOutcome, TriggerEffect,
    WanderSettings, World,
};

const DT: f32 = 0.05;

fn world_with(table: MaskCompatibility) -> World {
    let mut world = World::new(GameConfig::default(), table, 7).unwrap();
    world.add_ground_rect(Cell::new(-5, -5), Cell::new(5, 5));
    world
}

fn world() -> World {
    world_with(MaskCompatibility::new())
}

fn hold(actor: EntityId, direction: Direction) -> InputFrame {
    InputFrame::from([(actor, ActorInput::moving(direction))])
}

/// Ticks without input until `actor` is idle again.
fn settle(world: &mut World, actor: EntityId) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..200 {
        if world.move_state(actor) == Some(MoveState::Idle) {
            break;
        }
        events.extend(world.tick(DT, &InputFrame::new()));
    }
    events
}

/// One step: a single tick of input, then idle ticks until the step ends.
fn walk(world: &mut World, actor: EntityId, direction: Direction) -> Vec<GameEvent> {
    let mut events = world.tick(DT, &hold(actor, direction));
    events.extend(settle(world, actor));
    events
}

#[test]
fn step_into_empty_cell_lands_exactly_on_lattice() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, [MaskType::Wolf]).unwrap();

    let events = world.tick(DT, &hold(player, Direction::Forward));
    assert_eq!(world.move_state(player), Some(MoveState::Committing));
    assert_eq!(world.cell_of(player), Some(Cell::new(0, 1)));
    assert!(events.contains(&GameEvent::MoveCommitted {
        actor: player,
        from: Cell::ORIGIN,
        to: Cell::new(0, 1),
    }));

    let events = settle(&mut world, player);
    assert_eq!(world.move_state(player), Some(MoveState::Idle));
    assert_eq!(world.position(player), Some(Vec3::new(0.0, 0.0, 1.0)));
    assert!(events.contains(&GameEvent::MoveCompleted {
        actor: player,
        cell: Cell::new(0, 1),
    }));
}

#[test]
fn input_during_a_step_is_dropped() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, []).unwrap();

    assert_eq!(
        world.resolve_step(player, Direction::Right).unwrap(),
        StepOutcome::Committed
    );
    assert_eq!(
        world.resolve_step(player, Direction::Forward).unwrap(),
        StepOutcome::Busy
    );
    settle(&mut world, player);
    assert_eq!(world.position(player), Some(Vec3::new(1.0, 0.0, 0.0)));
}

#[test]
fn held_input_chains_axis_aligned_steps() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, []).unwrap();

    for _ in 0..80 {
        world.tick(DT, &hold(player, Direction::Forward));
    }
    settle(&mut world, player);

    // Ground ends at z = 5; the next step is rejected there.
    assert_eq!(world.position(player), Some(Vec3::new(0.0, 0.0, 5.0)));
}

#[test]
fn missing_ground_rejects_the_step() {
    let mut world = World::new(GameConfig::default(), MaskCompatibility::new(), 0).unwrap();
    world.add_ground(Cell::ORIGIN);
    let player = world.spawn_player(Cell::ORIGIN, []).unwrap();

    assert_eq!(
        world.resolve_step(player, Direction::Left).unwrap(),
        StepOutcome::Rejected
    );
    assert_eq!(world.move_state(player), Some(MoveState::Idle));
    assert_eq!(world.position(player), Some(Vec3::ZERO));
}

#[test]
fn walls_reject_and_keep_the_actor_in_place() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, []).unwrap();
    world.spawn_wall(Cell::new(0, 1)).unwrap();

    let events = world.tick(DT, &hold(player, Direction::Forward));
    assert!(events.contains(&GameEvent::MoveRejected {
        actor: player,
        direction: Direction::Forward,
    }));
    assert_eq!(world.move_state(player), Some(MoveState::Idle));
    assert_eq!(world.cell_of(player), Some(Cell::ORIGIN));
}

#[test]
fn gate_opens_only_for_compatible_mask() {
    let table = MaskCompatibility::new().with(MaskType::Wolf, [MaskType::Sheep]);

    let mut world = world_with(table.clone());
    let sheep = world
        .spawn_player(Cell::ORIGIN, [MaskType::Wolf, MaskType::Sheep])
        .unwrap();
    let gate = world.spawn_gate(Cell::new(0, 1), MaskType::Wolf).unwrap();

    let events = walk(&mut world, sheep, Direction::Forward);
    assert!(events.contains(&GameEvent::DoorUnlocked { door: gate, by: sheep }));
    assert_eq!(world.position(sheep), Some(Vec3::new(0.0, 0.0, 1.0)));

    let mut world = world_with(table);
    let pig = world
        .spawn_player(Cell::ORIGIN, [MaskType::Wolf, MaskType::Pig])
        .unwrap();
    let gate = world.spawn_gate(Cell::new(0, 1), MaskType::Wolf).unwrap();

    assert_eq!(
        world.resolve_step(pig, Direction::Forward).unwrap(),
        StepOutcome::Rejected
    );
    let events = world.tick(DT, &InputFrame::new());
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, GameEvent::DoorUnlocked { .. }))
    );
    let door = world.entity(gate).and_then(|e| e.block.as_ref()).and_then(|b| b.as_gate());
    assert_eq!(door.map(|gate| gate.door.phase()), Some(DoorPhase::Closed));
}

#[test]
fn door_animation_closes_after_dwell() {
    let table = MaskCompatibility::new().with(MaskType::Cow, [MaskType::Cow]);
    let mut world = world_with(table);
    let player = world.spawn_player(Cell::ORIGIN, [MaskType::Cow]).unwrap();
    let gate = world.spawn_gate(Cell::new(1, 0), MaskType::Cow).unwrap();

    walk(&mut world, player, Direction::Right);
    let phase = |world: &World| {
        world
            .entity(gate)
            .and_then(|e| e.block.as_ref())
            .and_then(|b| b.as_gate())
            .map(|gate| gate.door.phase())
    };
    assert_ne!(phase(&world), Some(DoorPhase::Closed));

    for _ in 0..100 {
        world.tick(DT, &InputFrame::new());
    }
    assert_eq!(phase(&world), Some(DoorPhase::Closed));
}

#[test]
fn pushing_a_block_moves_block_and_actor() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, []).unwrap();
    let block = world.spawn_block(Cell::new(0, 1)).unwrap();

    let events = world.tick(DT, &hold(player, Direction::Forward));
    assert!(events.contains(&GameEvent::BlockPushed {
        block,
        to: Cell::new(0, 2),
    }));
    assert_eq!(world.cell_of(block), Some(Cell::new(0, 2)));

    settle(&mut world, player);
    settle(&mut world, block);
    assert_eq!(world.position(block), Some(Vec3::new(0.0, 0.0, 2.0)));
    assert_eq!(world.position(player), Some(Vec3::new(0.0, 0.0, 1.0)));

    // Once settled the block accepts further pushes.
    walk(&mut world, player, Direction::Forward);
    settle(&mut world, block);
    assert_eq!(world.position(block), Some(Vec3::new(0.0, 0.0, 3.0)));
}

#[test]
fn block_chains_fail_closed() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, []).unwrap();
    let first = world.spawn_block(Cell::new(0, 1)).unwrap();
    let second = world.spawn_block(Cell::new(0, 2)).unwrap();

    assert_eq!(
        world.resolve_step(player, Direction::Forward).unwrap(),
        StepOutcome::Rejected
    );
    for _ in 0..10 {
        world.tick(DT, &InputFrame::new());
    }

    assert_eq!(world.position(player), Some(Vec3::ZERO));
    assert_eq!(world.position(first), Some(Vec3::new(0.0, 0.0, 1.0)));
    assert_eq!(world.position(second), Some(Vec3::new(0.0, 0.0, 2.0)));
    assert_eq!(world.cell_of(first), Some(Cell::new(0, 1)));
    assert_eq!(world.cell_of(second), Some(Cell::new(0, 2)));
}

#[test]
fn animal_sharing_a_cell_does_not_hide_a_wall() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, [MaskType::Wolf]).unwrap();
    world.spawn_animal(Cell::new(0, 1)).unwrap();
    let wall = world.spawn_wall(Cell::new(0, 1)).unwrap();

    let events = walk(&mut world, player, Direction::Forward);
    assert!(events.contains(&GameEvent::MoveRejected {
        actor: player,
        direction: Direction::Forward,
    }));
    assert_eq!(world.cell_of(player), Some(Cell::ORIGIN));
    assert_eq!(world.cell_of(wall), Some(Cell::new(0, 1)));
}

#[test]
fn animal_sharing_a_cell_does_not_hide_a_block() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, [MaskType::Wolf]).unwrap();
    world.spawn_animal(Cell::new(0, 1)).unwrap();
    let block = world.spawn_block(Cell::new(0, 1)).unwrap();

    let events = walk(&mut world, player, Direction::Forward);
    assert!(events.contains(&GameEvent::BlockPushed {
        block,
        to: Cell::new(0, 2),
    }));
    assert_eq!(world.cell_of(player), Some(Cell::new(0, 1)));
    assert_eq!(world.cell_of(block), Some(Cell::new(0, 2)));
}

#[test]
fn refused_push_keeps_a_shared_gate_closed() {
    let table = MaskCompatibility::new().with(MaskType::Wolf, [MaskType::Sheep]);
    let mut world = world_with(table);
    let player = world
        .spawn_player(Cell::ORIGIN, [MaskType::Wolf, MaskType::Sheep])
        .unwrap();
    let gate = world.spawn_gate(Cell::new(0, 1), MaskType::Wolf).unwrap();
    world.spawn_block(Cell::new(0, 1)).unwrap();
    world.spawn_wall(Cell::new(0, 2)).unwrap();

    let events = walk(&mut world, player, Direction::Forward);
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, GameEvent::DoorUnlocked { .. }))
    );
    assert_eq!(world.cell_of(player), Some(Cell::ORIGIN));
    let door = world.entity(gate).and_then(|e| e.block.as_ref()).and_then(|b| b.as_gate());
    assert_eq!(door.map(|gate| gate.door.phase()), Some(DoorPhase::Closed));
}

#[test]
fn closed_gate_releases_a_block_that_accepted_the_push() {
    let table = MaskCompatibility::new().with(MaskType::Wolf, [MaskType::Sheep]);
    let mut world = world_with(table);
    let player = world
        .spawn_player(Cell::ORIGIN, [MaskType::Wolf, MaskType::Pig])
        .unwrap();
    world.spawn_gate(Cell::new(0, 1), MaskType::Wolf).unwrap();
    let block = world.spawn_block(Cell::new(0, 1)).unwrap();

    assert_eq!(
        world.resolve_step(player, Direction::Forward).unwrap(),
        StepOutcome::Rejected
    );
    assert_eq!(world.cell_of(block), Some(Cell::new(0, 1)));
    let in_flight = world
        .entity_mut(block)
        .and_then(|e| e.block.as_mut())
        .and_then(|b| b.as_movable_mut())
        .map(|b| b.is_in_flight());
    assert_eq!(in_flight, Some(false));
}

#[test]
fn dropped_mask_is_reequipped_after_leaving_and_returning() {
    let mut world = world();
    let player = world
        .spawn_player(Cell::ORIGIN, [MaskType::Wolf, MaskType::Sheep])
        .unwrap();

    let drop = InputFrame::from([(
        player,
        ActorInput {
            drop_mask: true,
            ..ActorInput::default()
        },
    )]);
    let events = world.tick(DT, &drop);
    let item = events
        .iter()
        .find_map(|event| match event {
            GameEvent::MaskDropped { item, mask, cell } => {
                assert_eq!(*mask, MaskType::Sheep);
                assert_eq!(*cell, Cell::ORIGIN);
                Some(*item)
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(world.masks(player).unwrap().as_slice(), &[MaskType::Wolf]);

    // Standing on the fresh drop does not pick it up.
    for _ in 0..10 {
        world.tick(DT, &InputFrame::new());
    }
    assert!(world.entity(item).is_some());
    assert_eq!(world.masks(player).unwrap().len(), 1);

    walk(&mut world, player, Direction::Forward);
    let mut events = walk(&mut world, player, Direction::Back);
    for _ in 0..10 {
        events.extend(world.tick(DT, &InputFrame::new()));
    }

    assert!(events.contains(&GameEvent::MaskReequipped {
        actor: player,
        mask: MaskType::Sheep,
    }));
    assert_eq!(
        world.masks(player).unwrap().as_slice(),
        &[MaskType::Wolf, MaskType::Sheep]
    );
    assert!(world.entity(item).is_none());
}

#[test]
fn last_mask_cannot_be_dropped() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, [MaskType::Wolf]).unwrap();

    assert_eq!(world.pop_mask(player).unwrap(), None);
    assert_eq!(world.masks(player).unwrap().as_slice(), &[MaskType::Wolf]);
    assert_eq!(world.entities().count(), 1);
}

#[test]
fn dropping_into_a_full_cell_keeps_the_mask() {
    let mut world = world();
    let player = world
        .spawn_player(Cell::ORIGIN, [MaskType::Wolf, MaskType::Sheep])
        .unwrap();
    for _ in 1..GameConfig::MAX_OCCUPANTS_PER_CELL {
        world.spawn_trigger(Cell::ORIGIN, Layers::ACTOR, false).unwrap();
    }

    let err = world.pop_mask(player).unwrap_err();
    assert!(matches!(err, SetupError::CellFull(cell, _) if cell == Cell::ORIGIN));
    assert_eq!(
        world.masks(player).unwrap().as_slice(),
        &[MaskType::Wolf, MaskType::Sheep]
    );
    let events = world.drain_events();
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, GameEvent::MaskPopped { .. }))
    );
}

#[test]
fn pressure_plate_toggles_bound_entities() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, []).unwrap();
    let wall = world.spawn_wall(Cell::new(1, 0)).unwrap();
    let plate = world
        .spawn_trigger(Cell::new(0, 1), Layers::SOLID, false)
        .unwrap();
    world
        .bind_effect(TriggerEffect {
            trigger: plate,
            enable: Vec::new(),
            disable: vec![wall],
            revert_on_release: true,
        })
        .unwrap();

    assert_eq!(
        world.resolve_step(player, Direction::Right).unwrap(),
        StepOutcome::Rejected
    );

    let events = walk(&mut world, player, Direction::Forward);
    assert!(events.contains(&GameEvent::TriggerActivated { trigger: plate }));
    assert!(world.trigger(plate).unwrap().is_pressed());
    assert!(!world.occupancy().contains(wall));

    let events = walk(&mut world, player, Direction::Back);
    assert!(events.contains(&GameEvent::TriggerDeactivated { trigger: plate }));
    assert_eq!(world.cell_of(wall), Some(Cell::new(1, 0)));
    assert_eq!(
        world.resolve_step(player, Direction::Right).unwrap(),
        StepOutcome::Rejected
    );
}

#[test]
fn bind_effect_rejects_unknown_targets() {
    let mut world = world();
    let plate = world
        .spawn_trigger(Cell::new(0, 1), Layers::SOLID, true)
        .unwrap();
    let err = world
        .bind_effect(TriggerEffect {
            trigger: plate,
            enable: vec![EntityId(42)],
            disable: Vec::new(),
            revert_on_release: false,
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "entity #42 not found");
}

#[test]
fn eating_every_animal_completes_the_level_once() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, []).unwrap();
    let first = world.spawn_animal(Cell::new(0, 1)).unwrap();
    let second = world.spawn_animal(Cell::new(0, 2)).unwrap();

    let mut events = walk(&mut world, player, Direction::Forward);
    events.extend(walk(&mut world, player, Direction::Forward));
    events.extend(walk(&mut world, player, Direction::Back));
    for _ in 0..20 {
        events.extend(world.tick(DT, &InputFrame::new()));
    }

    let eliminated: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            GameEvent::TargetEliminated { target, by } => {
                assert_eq!(*by, player);
                Some(*target)
            }
            _ => None,
        })
        .collect();
    assert_eq!(eliminated, vec![first, second]);
    assert_eq!(
        events
            .iter()
            .filter(|event| **event == GameEvent::AllTargetsEliminated)
            .count(),
        1
    );
    assert!(world.tally().is_complete());
    assert!(world.entity(first).is_none());
    assert!(world.entity(second).is_none());
}

#[test]
fn hazards_defeat_the_player_once_per_contact() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, []).unwrap();
    let hazard = world.spawn_hazard(Cell::new(1, 0)).unwrap();

    let mut events = walk(&mut world, player, Direction::Right);
    for _ in 0..10 {
        events.extend(world.tick(DT, &InputFrame::new()));
    }
    let defeats = events
        .iter()
        .filter(|event| {
            **event
                == GameEvent::ActorDefeated {
                    actor: player,
                    hazard,
                }
        })
        .count();
    assert_eq!(defeats, 1);
}

#[test]
fn misconfigured_guard_disables_itself() {
    let mut world = world();
    let player = world.spawn_player(Cell::new(3, 3), []).unwrap();
    let guard = world.spawn_guard(Vec::new(), PatrolSettings::default()).unwrap();

    let events = world.tick(DT, &InputFrame::new());
    assert!(events.iter().any(|event| matches!(
        event,
        GameEvent::BehaviorDisabled { actor, .. } if *actor == guard
    )));

    // The rest of the world keeps running.
    walk(&mut world, player, Direction::Left);
    assert_eq!(world.position(player), Some(Vec3::new(2.0, 0.0, 3.0)));
    let events = world.tick(DT, &InputFrame::new());
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, GameEvent::BehaviorDisabled { .. }))
    );
}

#[test]
fn patrolling_guard_occupies_its_current_cell() {
    let mut world = world();
    let guard = world
        .spawn_guard(
            vec![Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 3.0)],
            PatrolSettings::default(),
        )
        .unwrap();

    for _ in 0..200 {
        world.tick(DT, &InputFrame::new());
        let position = world.position(guard).unwrap();
        assert_eq!(world.cell_of(guard), Some(Cell::from_world(position, 1.0)));
    }
}

#[test]
fn wandering_is_reproducible_for_a_seed() {
    let run = || {
        let mut world = world();
        let animal = world.spawn_animal(Cell::ORIGIN).unwrap();
        world
            .attach_wander(
                animal,
                vec![Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 3.0)],
                WanderSettings::default(),
            )
            .unwrap();
        let mut trail = Vec::new();
        for _ in 0..400 {
            world.tick(DT, &InputFrame::new());
            trail.push(world.position(animal).unwrap());
        }
        trail
    };
    assert_eq!(run(), run());
}

#[test]
fn subscribers_observe_tick_events_until_removed() {
    let mut world = world();
    let player = world.spawn_player(Cell::ORIGIN, []).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = world.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    let events = world.tick(DT, &hold(player, Direction::Forward));
    assert_eq!(*seen.lock().unwrap(), events);

    assert!(world.unsubscribe(id));
    settle(&mut world, player);
    assert_eq!(seen.lock().unwrap().len(), events.len());
}
