use glam::Vec3;
use rand::rngs::StdRng;

use crate::error::SetupError;
use crate::motion::{wrap_angle, yaw_of};
use crate::world::EntityId;

use super::{AnimatorParams, flat, sample_range};

/// Tuning for [`GuardPatrol`]. Angles in radians, speeds per second.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PatrolSettings {
    pub move_speed: f32,
    pub rotation_speed: f32,
    pub wait_time: f32,
    pub randomize_wait: bool,
    pub min_wait: f32,
    pub max_wait: f32,
    pub facing_tolerance: f32,
    pub drift_tolerance: f32,
    pub stop_distance: f32,
}

impl PatrolSettings {
    /// Speed mapped onto the animator's 0..1 blend range.
    pub fn normalized_speed(&self) -> f32 {
        (self.move_speed / 5.0).clamp(0.0, 1.0)
    }
}

impl Default for PatrolSettings {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            rotation_speed: 8.0,
            wait_time: 1.0,
            randomize_wait: false,
            min_wait: 0.5,
            max_wait: 2.0,
            facing_tolerance: 1.0_f32.to_radians(),
            drift_tolerance: 10.0_f32.to_radians(),
            stop_distance: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatrolPhase {
    Rotating,
    Moving,
    Waiting,
}

/// Rotate, move, wait over a looping list of waypoints.
#[derive(Clone, Debug, PartialEq)]
pub struct GuardPatrol {
    waypoints: Vec<Vec3>,
    settings: PatrolSettings,
    index: usize,
    yaw: f32,
    phase: Option<PatrolPhase>,
    wait_remaining: f32,
    disabled: bool,
}

impl GuardPatrol {
    pub fn new(waypoints: Vec<Vec3>, settings: PatrolSettings) -> Self {
        Self {
            waypoints,
            settings,
            index: 0,
            yaw: 0.0,
            phase: None,
            wait_remaining: 0.0,
            disabled: false,
        }
    }

    pub fn phase(&self) -> Option<PatrolPhase> {
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
        self.phase = Some(PatrolPhase::Rotating);
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
        let target = self.waypoints[self.index];

        match phase {
            PatrolPhase::Rotating => {
                let to = flat(target - *position);
                if to.length() <= self.settings.stop_distance {
                    self.arrive(target, position, rng, anim);
                    return;
                }

                let desired = yaw_of(to);
                let diff = wrap_angle(desired - self.yaw);
                let step = self.settings.rotation_speed * dt;
                self.yaw = if diff.abs() <= step {
                    desired
                } else {
                    wrap_angle(self.yaw + step * diff.signum())
                };

                if wrap_angle(desired - self.yaw).abs() <= self.settings.facing_tolerance {
                    self.enter(PatrolPhase::Moving, anim);
                }
            }
            PatrolPhase::Moving => {
                let to = flat(target - *position);
                let distance = to.length();
                if distance <= self.settings.stop_distance {
                    self.arrive(target, position, rng, anim);
                    return;
                }

                let desired = yaw_of(to);
                if wrap_angle(desired - self.yaw).abs() > self.settings.drift_tolerance {
                    self.enter(PatrolPhase::Rotating, anim);
                    return;
                }

                self.yaw = desired;
                let step = (self.settings.move_speed * dt).min(distance);
                *position += to / distance * step;
            }
            PatrolPhase::Waiting => {
                self.wait_remaining -= dt;
                if self.wait_remaining <= 0.0 {
                    self.index = (self.index + 1) % self.waypoints.len();
                    self.enter(PatrolPhase::Rotating, anim);
                }
            }
        }
    }

    fn arrive(
        &mut self,
        target: Vec3,
        position: &mut Vec3,
        rng: &mut StdRng,
        anim: &mut AnimatorParams,
    ) {
        *position = target;
        self.wait_remaining = if self.settings.randomize_wait {
            sample_range(rng, self.settings.min_wait, self.settings.max_wait)
        } else {
            self.settings.wait_time
        };
        self.enter(PatrolPhase::Waiting, anim);
    }

    fn enter(&mut self, phase: PatrolPhase, anim: &mut AnimatorParams) {
        tracing::trace!("guard {:?} -> {}", self.phase, phase);
        self.phase = Some(phase);
        let moving = phase == PatrolPhase::Moving;
        anim.is_moving = moving;
        anim.move_speed = if moving {
            self.settings.normalized_speed()
        } else {
            0.0
        };
    }
}
