//! Spatial index answering "what occupies the cell ahead".
//!
//! Occupancy is tracked per lattice cell. Each occupant carries a [`Layers`]
//! set; occupants whose layers are only [`Layers::ITEM`] and/or
//! [`Layers::TRIGGER`] are non-physical and never returned by probes.
use std::collections::{BTreeMap, BTreeSet};

use arrayvec::ArrayVec;
use bitflags::bitflags;
use glam::Vec3;

use crate::config::GameConfig;
use crate::error::SetupError;
use crate::grid::{Cell, Direction};
use crate::world::EntityId;

bitflags! {
    /// Collision layers of an occupant.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Layers: u8 {
        const OBSTACLE = 1 << 0;
        const ACTOR    = 1 << 1;
        const ITEM     = 1 << 2;
        const TRIGGER  = 1 << 3;
    }
}

impl Layers {
    /// Filter used by movers probing the cell ahead.
    pub const SOLID: Self = Self::OBSTACLE.union(Self::ACTOR);

    /// True when the occupant can block movement.
    pub fn is_solid(self) -> bool {
        self.intersects(Self::SOLID)
    }
}

/// Result of a probe: the nearest matching occupant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Occupant {
    pub id: EntityId,
    pub cell: Cell,
    pub layers: Layers,
    /// Distance from the probe origin's cell along the cast direction.
    pub distance: f32,
}

/// Read-only world queries consumed by the movement resolver.
pub trait CellQuery {
    /// Nearest solid occupant within `max_distance` of `origin` along
    /// `direction`, restricted to occupants whose layers intersect `filter`.
    ///
    /// The origin cell itself is never inspected.
    fn query_occupant(
        &self,
        origin: Vec3,
        direction: Direction,
        max_distance: f32,
        filter: Layers,
    ) -> Option<Occupant>;

    /// Whether the cell containing `position` has ground.
    fn query_ground(&self, position: Vec3) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    id: EntityId,
    layers: Layers,
    seq: u64,
}

type CellSlots = ArrayVec<Slot, { GameConfig::MAX_OCCUPANTS_PER_CELL }>;

/// Cell-keyed occupancy index plus the set of cells that have ground.
#[derive(Clone, Debug, Default)]
pub struct OccupancyIndex {
    grid_unit: f32,
    cells: BTreeMap<Cell, CellSlots>,
    locations: BTreeMap<EntityId, Cell>,
    ground: BTreeSet<Cell>,
    next_seq: u64,
}

impl OccupancyIndex {
    pub fn new(grid_unit: f32) -> Self {
        Self {
            grid_unit,
            ..Self::default()
        }
    }

    pub fn grid_unit(&self) -> f32 {
        self.grid_unit
    }

    pub fn add_ground(&mut self, cell: Cell) {
        self.ground.insert(cell);
    }

    pub fn remove_ground(&mut self, cell: Cell) -> bool {
        self.ground.remove(&cell)
    }

    pub fn has_ground(&self, cell: Cell) -> bool {
        self.ground.contains(&cell)
    }

    pub fn ground_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.ground.iter().copied()
    }

    /// Registers `id` in `cell`. An entity already present is moved instead.
    pub fn insert(&mut self, id: EntityId, cell: Cell, layers: Layers) -> Result<(), SetupError> {
        if self.locations.contains_key(&id) {
            return self.relocate(id, cell);
        }

        let seq = self.next_seq;
        self.push_slot(cell, Slot { id, layers, seq })?;
        self.next_seq += 1;
        self.locations.insert(id, cell);
        Ok(())
    }

    /// Removes `id`, returning the cell it occupied.
    pub fn remove(&mut self, id: EntityId) -> Option<Cell> {
        let cell = self.locations.remove(&id)?;
        self.take_slot(cell, id);
        Some(cell)
    }

    /// Moves `id` to `to`, preserving its insertion order.
    pub fn relocate(&mut self, id: EntityId, to: Cell) -> Result<(), SetupError> {
        let from = *self
            .locations
            .get(&id)
            .ok_or(SetupError::IndexDesync(id))?;
        if from == to {
            return Ok(());
        }

        let slot = self.take_slot(from, id).ok_or(SetupError::IndexDesync(id))?;
        if let Err(err) = self.push_slot(to, slot) {
            // Put it back so the index stays consistent.
            let _ = self.push_slot(from, slot);
            return Err(err);
        }
        self.locations.insert(id, to);
        Ok(())
    }

    pub fn cell_of(&self, id: EntityId) -> Option<Cell> {
        self.locations.get(&id).copied()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.locations.contains_key(&id)
    }

    /// Occupants of `cell` in insertion order.
    pub fn occupants_at(&self, cell: Cell) -> impl Iterator<Item = (EntityId, Layers)> + '_ {
        self.cells
            .get(&cell)
            .into_iter()
            .flat_map(|slots| {
                let mut ordered: Vec<_> = slots.iter().copied().collect();
                ordered.sort_by_key(|slot| slot.seq);
                ordered
            })
            .map(|slot| (slot.id, slot.layers))
    }

    /// Whether any solid occupant matching `filter` sits in `cell`.
    pub fn is_blocked(&self, cell: Cell, filter: Layers) -> bool {
        self.occupants_at(cell)
            .any(|(_, layers)| layers.is_solid() && layers.intersects(filter))
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    fn push_slot(&mut self, cell: Cell, slot: Slot) -> Result<(), SetupError> {
        let slots = self.cells.entry(cell).or_default();
        slots
            .try_push(slot)
            .map_err(|_| SetupError::CellFull(cell, GameConfig::MAX_OCCUPANTS_PER_CELL))
    }

    fn take_slot(&mut self, cell: Cell, id: EntityId) -> Option<Slot> {
        let slots = self.cells.get_mut(&cell)?;
        let index = slots.iter().position(|slot| slot.id == id)?;
        let slot = slots.remove(index);
        if slots.is_empty() {
            self.cells.remove(&cell);
        }
        Some(slot)
    }
}

impl CellQuery for OccupancyIndex {
    fn query_occupant(
        &self,
        origin: Vec3,
        direction: Direction,
        max_distance: f32,
        filter: Layers,
    ) -> Option<Occupant> {
        let start = Cell::from_world(origin, self.grid_unit);
        let steps = (max_distance / self.grid_unit).round().max(1.0) as i32;

        let mut cell = start;
        for step in 1..=steps {
            cell = cell.step(direction);
            let hit = self
                .cells
                .get(&cell)
                .into_iter()
                .flatten()
                .filter(|slot| slot.layers.is_solid() && slot.layers.intersects(filter))
                .min_by_key(|slot| slot.seq);

            if let Some(slot) = hit {
                return Some(Occupant {
                    id: slot.id,
                    cell,
                    layers: slot.layers,
                    distance: step as f32 * self.grid_unit,
                });
            }
        }
        None
    }

    fn query_ground(&self, position: Vec3) -> bool {
        self.has_ground(Cell::from_world(position, self.grid_unit))
    }
}
