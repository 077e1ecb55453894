use std::fmt;

use glam::{Quat, Vec3};

use crate::behavior::{AnimatorParams, Behavior};
use crate::interact::Block;
use crate::mask::{MaskStack, MaskType, MaskVisual};
use crate::movement::Mover;
use crate::occupancy::Layers;
use crate::trigger::Trigger;

/// Stable entity handle. Ids are assigned in spawn order and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    Player,
    Wall,
    Block,
    Gate,
    Animal,
    Hazard,
    Guard,
    Trigger,
    MaskItem,
}

/// Physical mask dropped into the world after a pop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskItem {
    pub mask: MaskType,
    pub owner: EntityId,
    /// Visual layer the mask had on its owner when it was removed.
    pub visual: MaskVisual,
    /// False until the owner has left the drop cell once.
    pub equippable: bool,
    pub(crate) owner_inside: bool,
    pub(crate) equip_timer: Option<f32>,
}

impl MaskItem {
    pub(crate) fn dropped(mask: MaskType, owner: EntityId, visual: MaskVisual) -> Self {
        Self {
            mask,
            owner,
            visual,
            equippable: false,
            owner_inside: true,
            equip_timer: None,
        }
    }

    pub fn is_equipping(&self) -> bool {
        self.equip_timer.is_some()
    }
}

/// World entity with optional capability components.
#[derive(Debug)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Logical world position.
    pub position: Vec3,
    pub facing: Quat,
    pub layers: Layers,
    /// Disabled entities are absent from the occupancy index and skip ticks.
    pub enabled: bool,
    /// Driven by per-tick input.
    pub controlled: bool,
    pub block: Option<Block>,
    pub mover: Option<Mover>,
    pub masks: Option<MaskStack>,
    pub behavior: Option<Behavior>,
    pub trigger: Option<Trigger>,
    pub item: Option<MaskItem>,
    pub animator: AnimatorParams,
    /// Seconds until removal from the world.
    pub despawn_in: Option<f32>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, kind: EntityKind, position: Vec3, layers: Layers) -> Self {
        Self {
            id,
            kind,
            position,
            facing: Quat::IDENTITY,
            layers,
            enabled: true,
            controlled: false,
            block: None,
            mover: None,
            masks: None,
            behavior: None,
            trigger: None,
            item: None,
            animator: AnimatorParams::default(),
            despawn_in: None,
        }
    }

    /// Active mask, if the entity wears any.
    pub fn active_mask(&self) -> Option<MaskType> {
        self.masks.as_ref().map(MaskStack::top)
    }

    /// Position of the visual sub-element (logical position plus hop).
    pub fn visual_position(&self) -> Vec3 {
        self.position
            + self
                .mover
                .as_ref()
                .map_or(Vec3::ZERO, |mover| mover.visual_offset)
    }
}
