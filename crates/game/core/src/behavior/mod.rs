//! Autonomous actor schedulers: guard patrols and animal wandering.
//!
//! Each behavior is an explicit state object advanced once per tick with the
//! elapsed time. Behaviors validate their setup on the first tick and switch
//! themselves off (reporting a [`SetupError`]) instead of failing the world.
mod guard;
mod wander;

pub use guard::{GuardPatrol, PatrolPhase, PatrolSettings};
pub use wander::{AnimalWander, WanderPhase, WanderSettings};

use glam::Vec3;
use rand::Rng;
use rand::rngs::StdRng;

use crate::error::SetupError;
use crate::world::EntityId;

/// One-shot animation trigger published for the host animator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimTrigger {
    Walk,
    Idle,
}

/// Animation parameters driven by the state machines.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimatorParams {
    pub is_moving: bool,
    pub is_walking: bool,
    pub move_speed: f32,
    triggers: Vec<AnimTrigger>,
}

impl AnimatorParams {
    pub fn fire(&mut self, trigger: AnimTrigger) {
        self.triggers.push(trigger);
    }

    pub fn pending_triggers(&self) -> &[AnimTrigger] {
        &self.triggers
    }

    /// Hands pending triggers to the host and clears them.
    pub fn drain_triggers(&mut self) -> Vec<AnimTrigger> {
        std::mem::take(&mut self.triggers)
    }
}

/// Autonomous behavior attached to a non-player actor.
#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    Guard(GuardPatrol),
    Wander(AnimalWander),
}

impl Behavior {
    pub fn is_started(&self) -> bool {
        match self {
            Behavior::Guard(guard) => guard.is_started(),
            Behavior::Wander(wander) => wander.is_started(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        match self {
            Behavior::Guard(guard) => guard.is_disabled(),
            Behavior::Wander(wander) => wander.is_disabled(),
        }
    }

    /// Validates setup and places the actor on its first waypoint.
    pub fn start(&mut self, id: EntityId, position: &mut Vec3) -> Result<(), SetupError> {
        match self {
            Behavior::Guard(guard) => guard.start(id, position),
            Behavior::Wander(wander) => wander.start(id, position),
        }
    }

    pub fn advance(
        &mut self,
        dt: f32,
        position: &mut Vec3,
        rng: &mut StdRng,
        anim: &mut AnimatorParams,
    ) {
        match self {
            Behavior::Guard(guard) => guard.advance(dt, position, rng, anim),
            Behavior::Wander(wander) => wander.advance(dt, position, rng, anim),
        }
    }

    /// Current heading as a yaw about +Y.
    pub fn yaw(&self) -> f32 {
        match self {
            Behavior::Guard(guard) => guard.yaw(),
            Behavior::Wander(wander) => wander.yaw(),
        }
    }
}

/// Uniform sample in `[min, max)`; degenerate ranges yield `min`.
pub(crate) fn sample_range(rng: &mut StdRng, min: f32, max: f32) -> f32 {
    if max > min { rng.gen_range(min..max) } else { min }
}

/// Horizontal component of `v`.
pub(crate) fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
