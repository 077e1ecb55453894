use crate::events::GameEvent;
use crate::mask::MaskType;

use super::{InteractionContext, InteractionRequest, Interactable};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DoorPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

/// Timed door animation. Purely visual: passability is decided per request.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Door {
    phase: DoorPhase,
    timer: f32,
}

impl Door {
    pub fn phase(&self) -> DoorPhase {
        self.phase
    }

    /// Starts (or keeps) the door opening. An open door restarts its dwell.
    pub fn unlock(&mut self, open_duration: f32) {
        match self.phase {
            DoorPhase::Closed => {
                self.phase = DoorPhase::Opening;
                self.timer = 0.0;
            }
            DoorPhase::Opening => {}
            DoorPhase::Open => self.timer = 0.0,
            DoorPhase::Closing => {
                // Reverse from the current openness.
                let closed_fraction = if open_duration > 0.0 {
                    (self.timer / open_duration).min(1.0)
                } else {
                    1.0
                };
                self.phase = DoorPhase::Opening;
                self.timer = (1.0 - closed_fraction) * open_duration;
            }
        }
    }

    /// Advances the animation. Returns the new phase on a transition.
    pub fn advance(&mut self, dt: f32, open_duration: f32, dwell: f32) -> Option<DoorPhase> {
        if self.phase == DoorPhase::Closed {
            return None;
        }

        self.timer += dt;
        let limit = match self.phase {
            DoorPhase::Opening | DoorPhase::Closing => open_duration,
            DoorPhase::Open => dwell,
            DoorPhase::Closed => return None,
        };
        if self.timer < limit {
            return None;
        }

        self.timer = 0.0;
        self.phase = match self.phase {
            DoorPhase::Opening => DoorPhase::Open,
            DoorPhase::Open => DoorPhase::Closing,
            DoorPhase::Closing | DoorPhase::Closed => DoorPhase::Closed,
        };
        Some(self.phase)
    }

    /// Openness in `[0, 1]` for hosts driving the door visual.
    pub fn openness(&self, open_duration: f32) -> f32 {
        let ramp = if open_duration > 0.0 {
            (self.timer / open_duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        match self.phase {
            DoorPhase::Closed => 0.0,
            DoorPhase::Opening => ramp,
            DoorPhase::Open => 1.0,
            DoorPhase::Closing => 1.0 - ramp,
        }
    }
}

/// Door that only opens for a compatible active mask.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskGate {
    pub required: MaskType,
    pub door: Door,
}

impl MaskGate {
    pub fn new(required: MaskType) -> Self {
        Self {
            required,
            door: Door::default(),
        }
    }
}

impl Interactable for MaskGate {
    fn can_enter(
        &mut self,
        request: &InteractionRequest,
        ctx: &mut InteractionContext<'_>,
    ) -> bool {
        if !ctx.table.matches(self.required, request.active_mask) {
            return false;
        }

        self.door.unlock(ctx.config.door_open_duration);
        tracing::info!(
            "door {} unlocked by {} wearing {}",
            ctx.self_id,
            request.actor,
            request.active_mask
        );
        ctx.events.push(GameEvent::DoorUnlocked {
            door: ctx.self_id,
            by: request.actor,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::grid::Direction;
    use crate::interact::test_support::{ask, request};
    use crate::mask::MaskCompatibility;
    use crate::occupancy::OccupancyIndex;
    use crate::world::EntityId;

    fn table() -> MaskCompatibility {
        MaskCompatibility::new().with(MaskType::Wolf, [MaskType::Sheep])
    }

    #[test]
    fn compatible_mask_opens_the_gate() {
        let index = OccupancyIndex::new(1.0);
        let mut gate = MaskGate::new(MaskType::Wolf);

        let (allowed, events) = ask(
            &mut gate,
            &request(Direction::Forward, MaskType::Sheep),
            &index,
            &table(),
            Vec3::Z,
        );
        assert!(allowed);
        assert_eq!(gate.door.phase(), DoorPhase::Opening);
        assert_eq!(
            events,
            vec![GameEvent::DoorUnlocked {
                door: EntityId(1),
                by: EntityId(0)
            }]
        );
    }

    #[test]
    fn incompatible_mask_has_no_side_effects() {
        let index = OccupancyIndex::new(1.0);
        let mut gate = MaskGate::new(MaskType::Wolf);
        let before = gate;

        let (allowed, events) = ask(
            &mut gate,
            &request(Direction::Forward, MaskType::Pig),
            &index,
            &table(),
            Vec3::Z,
        );
        assert!(!allowed);
        assert!(events.is_empty());
        assert_eq!(gate, before);
    }

    #[test]
    fn door_cycles_through_phases() {
        let mut door = Door::default();
        door.unlock(0.4);

        assert_eq!(door.advance(0.2, 0.4, 1.0), None);
        assert!((door.openness(0.4) - 0.5).abs() < 1e-6);
        assert_eq!(door.advance(0.2, 0.4, 1.0), Some(DoorPhase::Open));
        assert_eq!(door.advance(1.0, 0.4, 1.0), Some(DoorPhase::Closing));
        assert_eq!(door.advance(0.4, 0.4, 1.0), Some(DoorPhase::Closed));
        assert_eq!(door.advance(5.0, 0.4, 1.0), None);
        assert_eq!(door.openness(0.4), 0.0);
    }

    #[test]
    fn unlocking_an_open_door_restarts_dwell() {
        let mut door = Door::default();
        door.unlock(0.0);
        assert_eq!(door.advance(0.0, 0.0, 1.0), Some(DoorPhase::Open));
        door.advance(0.9, 0.0, 1.0);
        door.unlock(0.0);
        assert_eq!(door.advance(0.9, 0.0, 1.0), None);
        assert_eq!(door.phase(), DoorPhase::Open);
    }

    #[test]
    fn closing_door_reverses_from_current_openness() {
        let mut door = Door::default();
        door.unlock(1.0);
        door.advance(1.0, 1.0, 0.5);
        door.advance(0.5, 1.0, 0.5);
        assert_eq!(door.phase(), DoorPhase::Closing);
        door.advance(0.25, 1.0, 0.5);
        door.unlock(1.0);
        assert_eq!(door.phase(), DoorPhase::Opening);
        assert!((door.openness(1.0) - 0.75).abs() < 1e-6);
    }
}
