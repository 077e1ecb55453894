//! Level layout loader.
//!
//! A level file lists ground, the player, every other entity, and the
//! trigger effects that wire them together. Entities may carry a name so
//! effects can refer to them.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec3;
use maskgrid_core::{
    Cell, EntityId, GameConfig, Layers, MaskCompatibility, MaskType, PatrolSettings, SetupError,
    TriggerEffect, WanderSettings, World,
};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

/// Ground description.
#[derive(Clone, Debug, Deserialize)]
pub enum GroundSpec {
    /// Inclusive rectangle of ground cells.
    Rect { min: Cell, max: Cell },
    Cells(Vec<Cell>),
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlayerSpec {
    pub cell: Cell,
    /// Initial stack, bottom first. Empty falls back to the bare mask.
    #[serde(default)]
    pub masks: Vec<MaskType>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WanderSpec {
    pub waypoints: Vec<Cell>,
    #[serde(default)]
    pub settings: WanderSettings,
}

#[derive(Clone, Debug, Deserialize)]
pub enum EntityKindSpec {
    Wall,
    Block,
    Gate {
        required: MaskType,
    },
    Animal {
        #[serde(default)]
        wander: Option<WanderSpec>,
    },
    Hazard,
    /// Guards start on their first waypoint; the entity cell is ignored.
    Guard {
        waypoints: Vec<Cell>,
        #[serde(default)]
        settings: PatrolSettings,
    },
    Trigger {
        #[serde(default)]
        one_shot: bool,
        #[serde(default = "default_trigger_filter")]
        filter: Layers,
    },
}

fn default_trigger_filter() -> Layers {
    Layers::SOLID
}

#[derive(Clone, Debug, Deserialize)]
pub struct EntitySpec {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: EntityKindSpec,
    #[serde(default)]
    pub cell: Cell,
}

/// Trigger effect referring to entities by name.
#[derive(Clone, Debug, Deserialize)]
pub struct EffectSpec {
    pub trigger: String,
    #[serde(default)]
    pub enable: Vec<String>,
    #[serde(default)]
    pub disable: Vec<String>,
    #[serde(default)]
    pub revert_on_release: bool,
}

/// Parsed level file.
#[derive(Clone, Debug, Deserialize)]
pub struct LevelSpec {
    /// Seed for randomized waits and durations.
    #[serde(default)]
    pub seed: u64,
    pub ground: Vec<GroundSpec>,
    pub player: PlayerSpec,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

/// A built level: the world plus handles into it.
#[derive(Debug)]
pub struct Level {
    pub world: World,
    pub player: EntityId,
    pub names: BTreeMap<String, EntityId>,
}

impl Level {
    pub fn id(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }
}

impl LevelSpec {
    /// Spawns every entity in file order and binds the effects.
    pub fn build(&self, config: GameConfig, table: MaskCompatibility) -> Result<Level, SetupError> {
        let unit = config.grid_unit;
        let mut world = World::new(config, table, self.seed)?;

        for ground in &self.ground {
            match ground {
                GroundSpec::Rect { min, max } => world.add_ground_rect(*min, *max),
                GroundSpec::Cells(cells) => cells.iter().for_each(|cell| world.add_ground(*cell)),
            }
        }

        let player = world.spawn_player(self.player.cell, self.player.masks.iter().copied())?;

        let mut names = BTreeMap::new();
        for spec in &self.entities {
            let id = spawn_entity(&mut world, spec, unit)?;
            if let Some(name) = &spec.name
                && names.insert(name.clone(), id).is_some()
            {
                return Err(SetupError::DuplicateName(name.clone()));
            }
        }

        for effect in &self.effects {
            let lookup = |name: &String| {
                names
                    .get(name)
                    .copied()
                    .ok_or_else(|| SetupError::UnknownName(name.clone()))
            };
            world.bind_effect(TriggerEffect {
                trigger: lookup(&effect.trigger)?,
                enable: effect.enable.iter().map(lookup).collect::<Result<_, _>>()?,
                disable: effect.disable.iter().map(lookup).collect::<Result<_, _>>()?,
                revert_on_release: effect.revert_on_release,
            })?;
        }

        tracing::info!(
            entities = self.entities.len(),
            effects = self.effects.len(),
            targets = world.tally().total(),
            "level built"
        );

        Ok(Level {
            world,
            player,
            names,
        })
    }
}

fn spawn_entity(world: &mut World, spec: &EntitySpec, unit: f32) -> Result<EntityId, SetupError> {
    let waypoints = |cells: &[Cell]| -> Vec<Vec3> {
        cells.iter().map(|cell| cell.to_world(unit, 0.0)).collect()
    };

    match &spec.kind {
        EntityKindSpec::Wall => world.spawn_wall(spec.cell),
        EntityKindSpec::Block => world.spawn_block(spec.cell),
        EntityKindSpec::Gate { required } => world.spawn_gate(spec.cell, *required),
        EntityKindSpec::Animal { wander } => {
            let id = world.spawn_animal(spec.cell)?;
            if let Some(wander) = wander {
                world.attach_wander(id, waypoints(&wander.waypoints), wander.settings)?;
            }
            Ok(id)
        }
        EntityKindSpec::Hazard => world.spawn_hazard(spec.cell),
        EntityKindSpec::Guard {
            waypoints: cells,
            settings,
        } => world.spawn_guard(waypoints(cells), *settings),
        EntityKindSpec::Trigger { one_shot, filter } => {
            world.spawn_trigger(spec.cell, *filter, *one_shot)
        }
    }
}

/// Loader for level layouts in RON.
///
/// Example:
/// ```text
/// (
///     seed: 7,
///     ground: [Rect(min: (x: -2, z: -2), max: (x: 2, z: 4))],
///     player: (cell: (x: 0, z: 0), masks: [Wolf, Sheep]),
///     entities: [
///         (kind: Gate(required: Wolf), cell: (x: 0, z: 2)),
///         (name: Some("plate"), kind: Trigger(one_shot: false), cell: (x: 1, z: 0)),
///     ],
/// )
/// ```
pub struct LevelLoader;

impl LevelLoader {
    pub fn load(path: &Path) -> LoadResult<LevelSpec> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load level {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<LevelSpec> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse level RON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use maskgrid_core::EntityKind;

    use super::*;

    const LEVEL: &str = r#"
        (
            seed: 3,
            ground: [Rect(min: (x: -2, z: -2), max: (x: 2, z: 4)), Cells([(x: 5, z: 5)])],
            player: (cell: (x: 0, z: 0), masks: [Wolf, Sheep]),
            entities: [
                (kind: Wall, cell: (x: -1, z: 0)),
                (name: Some("door"), kind: Gate(required: Wolf), cell: (x: 0, z: 2)),
                (name: Some("sheep"), kind: Animal(wander: None), cell: (x: 2, z: 2)),
                (kind: Guard(waypoints: [(x: -2, z: 3), (x: 2, z: 3)])),
                (name: Some("plate"), kind: Trigger(one_shot: true, filter: "ACTOR"), cell: (x: 1, z: 0)),
            ],
            effects: [(trigger: "plate", disable: ["door"])],
        )
    "#;

    fn table() -> MaskCompatibility {
        MaskCompatibility::new()
    }

    #[test]
    fn parses_every_section() {
        let spec = LevelLoader::parse(LEVEL).unwrap();
        assert_eq!(spec.seed, 3);
        assert_eq!(spec.ground.len(), 2);
        assert_eq!(spec.player.masks, vec![MaskType::Wolf, MaskType::Sheep]);
        assert_eq!(spec.entities.len(), 5);
        assert!(matches!(
            spec.entities[4].kind,
            EntityKindSpec::Trigger { one_shot: true, filter } if filter == Layers::ACTOR
        ));
        assert_eq!(spec.effects[0].disable, vec!["door".to_string()]);
    }

    #[test]
    fn builds_named_entities() {
        let level = LevelLoader::parse(LEVEL)
            .unwrap()
            .build(GameConfig::default(), table())
            .unwrap();

        let door = level.id("door").unwrap();
        assert_eq!(level.world.entity(door).unwrap().kind, EntityKind::Gate);
        assert_eq!(level.world.cell_of(door), Some(Cell::new(0, 2)));
        assert_eq!(level.world.tally().total(), 1);
        assert_eq!(
            level.world.masks(level.player).unwrap().top(),
            MaskType::Sheep
        );
        assert!(level.world.occupancy().has_ground(Cell::new(5, 5)));
        assert!(level.id("missing").is_none());
    }

    #[test]
    fn guards_start_on_their_first_waypoint() {
        let level = LevelLoader::parse(LEVEL)
            .unwrap()
            .build(GameConfig::default(), table())
            .unwrap();

        let guard = level
            .world
            .entities()
            .find(|entity| entity.kind == EntityKind::Guard)
            .unwrap();
        assert_eq!(level.world.cell_of(guard.id), Some(Cell::new(-2, 3)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let spec = LevelLoader::parse(
            r#"(
                ground: [],
                player: (cell: (x: 0, z: 0)),
                entities: [
                    (name: Some("a"), kind: Wall, cell: (x: 1, z: 0)),
                    (name: Some("a"), kind: Wall, cell: (x: 2, z: 0)),
                ],
            )"#,
        )
        .unwrap();

        let err = spec.build(GameConfig::default(), table()).unwrap_err();
        assert!(matches!(err, SetupError::DuplicateName(name) if name == "a"));
    }

    #[test]
    fn effects_must_name_known_entities() {
        let spec = LevelLoader::parse(
            r#"(
                ground: [],
                player: (cell: (x: 0, z: 0)),
                entities: [(name: Some("plate"), kind: Trigger(one_shot: false), cell: (x: 1, z: 0))],
                effects: [(trigger: "plate", enable: ["ghost"])],
            )"#,
        )
        .unwrap();

        let err = spec.build(GameConfig::default(), table()).unwrap_err();
        assert!(matches!(err, SetupError::UnknownName(name) if name == "ghost"));
    }
}
