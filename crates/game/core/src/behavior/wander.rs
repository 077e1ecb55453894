use glam::Vec3;
use rand::Rng;
use rand::rngs::StdRng;

use crate::error::SetupError;
use crate::motion::{forward_of, wrap_angle, yaw_of};
use crate::world::EntityId;

use super::{AnimTrigger, AnimatorParams, flat, sample_range};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WanderSettings {
    pub walk_speed: f32,
    /// Fraction of the remaining turn covered per second.
    pub rotation_speed: f32,
    pub min_wait: f32,
    pub max_wait: f32,
    pub min_walk: f32,
    pub max_walk: f32,
    pub arrive_distance: f32,
}

impl Default for WanderSettings {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            rotation_speed: 5.0,
            min_wait: 1.0,
            max_wait: 3.0,
            min_walk: 2.0,
            max_walk: 5.0,
            arrive_distance: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WanderPhase {
    Deciding,
    Walking,
    Resting,
}

/// Randomized walk/idle cycle along a waypoint loop.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimalWander {
    waypoints: Vec<Vec3>,
    settings: WanderSettings,
    index: usize,
    yaw: f32,
    phase: Option<WanderPhase>,
    remaining: f32,
    disabled: bool,
}

impl AnimalWander {
    pub fn new(waypoints: Vec<Vec3>, settings: WanderSettings) -> Self {
        Self {
            waypoints,
            settings,
            index: 0,
            yaw: 0.0,
            phase: None,
            remaining: 0.0,
            disabled: false,
        }
    }

    pub fn phase(&self) -> Option<WanderPhase> {
        self.phase
    }

    pub fn current_waypoint(&self) -> usize {
        self.index
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn is_started(&self) -> bool {
        self.phase.is_some() || self.disabled
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub(super) fn start(&mut self, id: EntityId, position: &mut Vec3) -> Result<(), SetupError> {
        let Some(first) = self.waypoints.first().copied() else {
            self.disabled = true;
            return Err(SetupError::NoWaypoints(id));
        };
        *position = first;
        self.index = 0;

        let next = self.waypoints[1 % self.waypoints.len()];
        let heading = flat(next - first);
        if heading.length_squared() > 0.0 {
            self.yaw = yaw_of(heading);
        }
        self.phase = Some(WanderPhase::Deciding);
        Ok(())
    }

    pub(super) fn advance(
        &mut self,
        dt: f32,
        position: &mut Vec3,
        rng: &mut StdRng,
        anim: &mut AnimatorParams,
    ) {
        if self.disabled {
            return;
        }
        let Some(phase) = self.phase else {
            return;
        };

        match phase {
            WanderPhase::Deciding => {
                let walk = rng.gen_bool(0.5);
                self.decide(walk, rng, anim);
            }
            WanderPhase::Walking => {
                self.walk_toward_next(dt, position);
                self.remaining -= dt;
                if self.remaining <= 0.0 {
                    self.rest(rng, anim);
                }
            }
            WanderPhase::Resting => {
                self.remaining -= dt;
                if self.remaining <= 0.0 {
                    self.index = (self.index + 1) % self.waypoints.len();
                    self.phase = Some(WanderPhase::Deciding);
                }
            }
        }
    }

    fn decide(&mut self, walk: bool, rng: &mut StdRng, anim: &mut AnimatorParams) {
        if walk {
            anim.fire(AnimTrigger::Walk);
            anim.is_walking = true;
            self.remaining = sample_range(rng, self.settings.min_walk, self.settings.max_walk);
            self.phase = Some(WanderPhase::Walking);
        } else {
            self.rest(rng, anim);
        }
    }

    fn rest(&mut self, rng: &mut StdRng, anim: &mut AnimatorParams) {
        anim.fire(AnimTrigger::Idle);
        anim.is_walking = false;
        self.remaining = sample_range(rng, self.settings.min_wait, self.settings.max_wait);
        self.phase = Some(WanderPhase::Resting);
    }

    fn walk_toward_next(&mut self, dt: f32, position: &mut Vec3) {
        let next = (self.index + 1) % self.waypoints.len();
        let target = self.waypoints[next];
        let to = flat(target - *position);
        let distance = to.length();

        if distance <= self.settings.arrive_distance {
            self.index = next;
            *position = target;
            return;
        }

        let desired = yaw_of(to);
        let blend = (self.settings.rotation_speed * dt).min(1.0);
        self.yaw = wrap_angle(self.yaw + wrap_angle(desired - self.yaw) * blend);

        let step = (self.settings.walk_speed * dt).min(distance);
        *position += forward_of(self.yaw) * step;
    }
}
