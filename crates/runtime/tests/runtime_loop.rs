use maskgrid_core::{
    Cell, Direction, EntityId, GameConfig, GameEvent, MaskCompatibility, MaskType, MoveState,
    World,
};
use maskgrid_runtime::{
    IdleInput, Runtime, RuntimeConfig, RuntimeError, ScriptStep, ScriptedInput, Topic,
};

fn config() -> RuntimeConfig {
    RuntimeConfig {
        tick_hz: 20,
        ..RuntimeConfig::default()
    }
}

/// Player at the origin, one sheep two cells ahead.
fn pasture() -> (World, EntityId, EntityId) {
    let mut world = World::new(GameConfig::default(), MaskCompatibility::new(), 5).unwrap();
    world.add_ground_rect(Cell::new(-3, -3), Cell::new(3, 3));
    let player = world
        .spawn_player(Cell::ORIGIN, [MaskType::Wolf, MaskType::Sheep])
        .unwrap();
    let sheep = world.spawn_animal(Cell::new(0, 2)).unwrap();
    (world, player, sheep)
}

#[tokio::test]
async fn scripted_run_clears_the_level() {
    let (world, player, sheep) = pasture();
    let mut runtime = Runtime::builder()
        .config(config())
        .world(world)
        .input_provider(ScriptedInput::new(vec![ScriptStep::hold(
            Direction::Forward,
            16,
        )]))
        .build()
        .await
        .unwrap();
    let mut gameplay = runtime.handle().subscribe(Topic::Gameplay);

    let summary = runtime.run_until_complete(200).await.unwrap();
    assert!(summary.completed);
    assert!(summary.ticks < 200);

    let event = gameplay.recv().await.unwrap();
    assert_eq!(
        event.event,
        GameEvent::TargetEliminated {
            target: sheep,
            by: player,
        }
    );

    let snapshot = runtime.snapshot().await.unwrap();
    assert!(snapshot.is_complete());
    assert_eq!(snapshot.entity(player).unwrap().cell, Some(Cell::new(0, 2)));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn run_for_advances_exact_tick_count() {
    let (world, player, _) = pasture();
    let mut runtime = Runtime::builder()
        .config(config())
        .world(world)
        .input_provider(IdleInput)
        .build()
        .await
        .unwrap();

    let summary = runtime.run_for(5).await.unwrap();
    assert_eq!(summary.ticks, 5);
    assert!(!summary.completed);

    let snapshot = runtime.snapshot().await.unwrap();
    assert_eq!(snapshot.tick, 5);
    let view = snapshot.entity(player).unwrap();
    assert_eq!(view.move_state, Some(MoveState::Idle));
    assert_eq!(view.masks, vec![MaskType::Sheep, MaskType::Wolf]);
}

#[tokio::test]
async fn mask_changes_are_published_between_ticks() {
    let (world, player, _) = pasture();
    let runtime = Runtime::builder().world(world).build().await.unwrap();
    let handle = runtime.handle();
    let mut masks = handle.subscribe(Topic::Masks);

    assert!(handle.push_mask(player, MaskType::Pig).await.unwrap());
    assert!(!handle.push_mask(player, MaskType::Pig).await.unwrap());

    let event = masks.recv().await.unwrap();
    assert_eq!(
        event.event,
        GameEvent::MaskPushed {
            actor: player,
            mask: MaskType::Pig,
        }
    );

    let err = handle
        .push_mask(EntityId(99), MaskType::Pig)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Setup(_)));
}

#[tokio::test]
async fn stepping_requires_a_provider() {
    let (world, _, _) = pasture();
    let mut runtime = Runtime::builder().world(world).build().await.unwrap();
    assert!(matches!(
        runtime.step().await,
        Err(RuntimeError::ProviderNotSet)
    ));

    runtime.set_input_provider(IdleInput);
    assert_eq!(runtime.step().await.unwrap().tick, 1);
}

#[tokio::test]
async fn building_without_a_world_fails() {
    assert!(matches!(
        Runtime::builder().build().await,
        Err(RuntimeError::MissingWorld)
    ));
}

#[tokio::test]
async fn script_file_drives_the_run() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("forward.ron");
    std::fs::write(&path, "[(direction: Some(Forward), ticks: 16)]").unwrap();

    let script = ScriptedInput::load(&path).unwrap();
    assert_eq!(script.len_ticks(), 16);

    let (world, player, _) = pasture();
    let mut runtime = Runtime::builder()
        .config(config())
        .world(world)
        .input_provider(script)
        .build()
        .await
        .unwrap();

    let summary = runtime.run_until_complete(200).await.unwrap();
    assert!(summary.completed);
    let snapshot = runtime.snapshot().await.unwrap();
    assert_eq!(snapshot.entity(player).unwrap().cell, Some(Cell::new(0, 2)));

    runtime.shutdown().await.unwrap();
}

#[test]
fn missing_script_file_is_an_io_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = ScriptedInput::load(&dir.path().join("absent.ron")).unwrap_err();
    assert!(matches!(err, RuntimeError::ScriptIo(_)));
}
