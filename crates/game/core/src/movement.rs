//! Per-actor grid step state machine.
//!
//! `Idle -> Resolving -> (Committing | Rejected) -> Idle`. `Resolving` and
//! `Rejected` are transient: they are entered and left inside a single
//! resolution call. `Committing` persists until the step's tween finishes.
//!
//! The world performs the occupancy check between [`Mover::begin`] and
//! [`Mover::commit`] / [`Mover::reject`]; this type only owns the state,
//! the in-flight tween, and the visual sub-element (hop and facing).
use glam::Vec3;

use crate::grid::Direction;
use crate::motion::{Facing, Tween, TweenSample};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveState {
    #[default]
    Idle,
    Resolving,
    Committing,
    Rejected,
}

/// Outcome of one resolution attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepOutcome {
    Committed,
    Rejected,
    /// A step was already in flight; the input was dropped.
    Busy,
}

/// Movement driver for one actor or movable block.
#[derive(Clone, Debug)]
pub struct Mover {
    state: MoveState,
    motion: Option<Tween>,
    duration: f32,
    hop_height: f32,
    /// Facing of the visual sub-element.
    pub facing: Facing,
    /// Offset of the visual sub-element from the logical position.
    pub visual_offset: Vec3,
    last_direction: Option<Direction>,
}

impl Mover {
    pub fn new(duration: f32, hop_height: f32) -> Self {
        Self {
            state: MoveState::Idle,
            motion: None,
            duration,
            hop_height,
            facing: Facing::default(),
            visual_offset: Vec3::ZERO,
            last_direction: None,
        }
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == MoveState::Idle
    }

    pub fn is_moving(&self) -> bool {
        self.state == MoveState::Committing
    }

    pub fn last_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    pub fn motion(&self) -> Option<&Tween> {
        self.motion.as_ref()
    }

    /// Enters `Resolving` for `direction`. Returns false when not idle.
    ///
    /// The visual facing turns toward `direction` regardless of the outcome.
    pub fn begin(&mut self, direction: Direction) -> bool {
        if self.state != MoveState::Idle {
            return false;
        }
        self.state = MoveState::Resolving;
        self.last_direction = Some(direction);
        self.facing.look(direction);
        true
    }

    /// Starts the step tween, replacing any transition still in flight.
    pub fn commit(&mut self, from: Vec3, to: Vec3) {
        if let Some(previous) = self.motion.take() {
            tracing::debug!(
                "replacing in-flight motion toward {:?} with {:?}",
                previous.end(),
                to
            );
        }
        self.motion = Some(Tween::new(from, to, self.duration, self.hop_height));
        self.state = MoveState::Committing;
    }

    /// Passes through `Rejected` back to `Idle`. The input is dropped.
    pub fn reject(&mut self) {
        self.state = MoveState::Rejected;
        tracing::trace!(state = %self.state, direction = ?self.last_direction, "step rejected");
        self.state = MoveState::Idle;
    }

    /// Advances the in-flight tween and returns its sample.
    ///
    /// When the tween finishes the mover returns to `Idle` and the sample
    /// carries the exact target position.
    pub fn advance(&mut self, dt: f32, facing_rate: f32) -> Option<TweenSample> {
        self.facing.advance(dt, facing_rate);

        let tween = self.motion.as_mut()?;
        let sample = tween.advance(dt);
        self.visual_offset = Vec3::new(0.0, sample.hop, 0.0);

        if sample.finished {
            self.motion = None;
            self.state = MoveState::Idle;
            self.visual_offset = Vec3::ZERO;
        }
        Some(sample)
    }

    /// Drops any in-flight transition and returns to `Idle`.
    pub fn cancel(&mut self) -> Option<Tween> {
        self.state = MoveState::Idle;
        self.visual_offset = Vec3::ZERO;
        self.motion.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_step_runs_to_completion() {
        let mut mover = Mover::new(0.3, 0.5);
        assert!(mover.begin(Direction::Forward));
        assert_eq!(mover.state(), MoveState::Resolving);

        mover.commit(Vec3::ZERO, Vec3::Z);
        assert_eq!(mover.state(), MoveState::Committing);
        assert!(!mover.begin(Direction::Left));

        let mut last = None;
        while mover.is_moving() {
            last = mover.advance(0.05, 12.0);
        }
        let sample = last.unwrap();
        assert!(sample.finished);
        assert_eq!(sample.position, Vec3::Z);
        assert_eq!(mover.state(), MoveState::Idle);
        assert_eq!(mover.visual_offset, Vec3::ZERO);
    }

    #[test]
    fn rejected_step_returns_to_idle() {
        let mut mover = Mover::new(0.3, 0.5);
        assert!(mover.begin(Direction::Back));
        mover.reject();
        assert!(mover.is_idle());
        assert!(mover.motion().is_none());
        assert_eq!(mover.last_direction(), Some(Direction::Back));
    }

    #[test]
    fn hop_only_touches_visual_offset() {
        let mut mover = Mover::new(1.0, 2.0);
        mover.begin(Direction::Right);
        mover.commit(Vec3::ZERO, Vec3::X);

        let sample = mover.advance(0.5, 0.0).unwrap();
        assert_eq!(sample.position.y, 0.0);
        assert!(mover.visual_offset.y > 1.9);
    }

    #[test]
    fn cancel_discards_in_flight_motion() {
        let mut mover = Mover::new(1.0, 0.0);
        mover.begin(Direction::Right);
        mover.commit(Vec3::ZERO, Vec3::X);
        assert!(mover.cancel().is_some());
        assert!(mover.is_idle());
        assert!(mover.advance(0.1, 0.0).is_none());
    }
}
