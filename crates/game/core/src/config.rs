use crate::error::SetupError;
use crate::mask::MaskType;

/// Simulation configuration constants and tunable parameters.
///
/// Durations are in seconds, distances in world units, angular rates in
/// radians per second unless noted otherwise.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// World distance of one discrete movement step.
    pub grid_unit: f32,
    /// Input magnitudes at or below this value are ignored.
    pub input_deadzone: f32,

    pub player_move_duration: f32,
    pub player_hop_height: f32,
    pub block_move_duration: f32,
    pub block_hop_height: f32,
    /// Slerp rate of the visual facing toward the last requested direction.
    pub facing_speed: f32,

    /// Reject steps into cells without ground.
    pub require_ground: bool,

    pub door_open_duration: f32,
    /// Time a door stays open before closing again.
    pub door_dwell: f32,

    pub target_despawn_delay: f32,
    pub mask_equip_duration: f32,

    /// Mask without a visual layer (the actor's bare identity).
    pub bare_mask: MaskType,
    pub mask_layer_offset: [f32; 3],
    pub mask_scale_increment: f32,
    pub mask_max_scale: f32,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_OCCUPANTS_PER_CELL: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_GRID_UNIT: f32 = 1.0;
    pub const DEFAULT_DEADZONE: f32 = 0.1;
    pub const DEFAULT_PLAYER_MOVE_DURATION: f32 = 0.3;
    pub const DEFAULT_PLAYER_HOP_HEIGHT: f32 = 0.5;
    pub const DEFAULT_BLOCK_MOVE_DURATION: f32 = 0.5;
    pub const DEFAULT_BLOCK_HOP_HEIGHT: f32 = 0.3;

    pub fn new() -> Self {
        Self {
            grid_unit: Self::DEFAULT_GRID_UNIT,
            input_deadzone: Self::DEFAULT_DEADZONE,
            player_move_duration: Self::DEFAULT_PLAYER_MOVE_DURATION,
            player_hop_height: Self::DEFAULT_PLAYER_HOP_HEIGHT,
            block_move_duration: Self::DEFAULT_BLOCK_MOVE_DURATION,
            block_hop_height: Self::DEFAULT_BLOCK_HOP_HEIGHT,
            facing_speed: 12.0,
            require_ground: true,
            door_open_duration: 0.4,
            door_dwell: 1.5,
            target_despawn_delay: 0.3,
            mask_equip_duration: 0.15,
            bare_mask: MaskType::Wolf,
            mask_layer_offset: [0.0, 0.15, 0.0],
            mask_scale_increment: 0.05,
            mask_max_scale: 2.0,
        }
    }

    pub fn with_grid_unit(grid_unit: f32) -> Self {
        Self {
            grid_unit,
            ..Self::new()
        }
    }

    /// Checks values that would break lattice arithmetic.
    pub fn validate(&self) -> Result<(), SetupError> {
        if !(self.grid_unit.is_finite() && self.grid_unit > 0.0) {
            return Err(SetupError::InvalidGridUnit(self.grid_unit));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
