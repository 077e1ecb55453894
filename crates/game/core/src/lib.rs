//! Deterministic grid-puzzle simulation shared by every host.
//!
//! `maskgrid-core` defines the rules (grid steps, interactables, mask stacks,
//! patrols, triggers) and exposes pure APIs that hosts drive one tick at a
//! time. All world mutation flows through [`world::World`], and supporting
//! crates depend on the types re-exported here.
pub mod behavior;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod interact;
pub mod mask;
pub mod motion;
pub mod movement;
pub mod occupancy;
pub mod tally;
pub mod trigger;
pub mod world;

pub use behavior::{
    AnimTrigger, AnimalWander, AnimatorParams, Behavior, GuardPatrol, PatrolPhase, PatrolSettings,
    WanderPhase, WanderSettings,
};
pub use config::GameConfig;
pub use error::{ErrorContext, ErrorSeverity, GameError, SetupError};
pub use events::{EventKind, GameEvent, Subscribers, SubscriptionId};
pub use grid::{Cell, Direction, MoveInput};
pub use interact::{
    Block, Door, DoorPhase, Immovable, InteractionContext, InteractionRequest, Interactable,
    MaskGate, MovableBlock, PassiveKind, PassiveTarget,
};
pub use mask::{MaskChange, MaskCompatibility, MaskStack, MaskType, MaskVisual, MaskVisualLayout};
pub use motion::{Facing, Tween, TweenSample};
pub use movement::{MoveState, Mover, StepOutcome};
pub use occupancy::{CellQuery, Layers, Occupant, OccupancyIndex};
pub use tally::TargetTally;
pub use trigger::{Trigger, TriggerEffect, TriggerSignal};
pub use world::{ActorInput, Entity, EntityId, EntityKind, InputFrame, MaskItem, World};
