//! Lattice coordinates, cardinal directions, and input mapping.
//!
//! World positions are continuous [`Vec3`] values. Horizontal axes are X and
//! Z; Y is the vertical axis and is never constrained by the lattice. A
//! [`Cell`] is the integer lattice coordinate a position rounds to.
use std::fmt;

use glam::Vec3;

/// Integer lattice coordinate on the horizontal plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub const ORIGIN: Self = Self { x: 0, z: 0 };

    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Rounds a world position onto the lattice of the given unit.
    pub fn from_world(position: Vec3, unit: f32) -> Self {
        Self {
            x: (position.x / unit).round() as i32,
            z: (position.z / unit).round() as i32,
        }
    }

    /// Exact lattice point for this cell at the given height.
    pub fn to_world(self, unit: f32, y: f32) -> Vec3 {
        Vec3::new(self.x as f32 * unit, y, self.z as f32 * unit)
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dz) = direction.delta();
        Self::new(self.x + dx, self.z + dz)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Snaps the horizontal components of `position` onto the lattice, keeping Y.
pub fn snap_to_lattice(position: Vec3, unit: f32) -> Vec3 {
    Cell::from_world(position, unit).to_world(unit, position.y)
}

/// One of the four world-space cardinal directions. Diagonals do not exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// +Z
    Forward,
    /// -Z
    Back,
    /// -X
    Left,
    /// +X
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Forward => (0, 1),
            Direction::Back => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Unit vector in world space.
    pub fn vector(self) -> Vec3 {
        let (dx, dz) = self.delta();
        Vec3::new(dx as f32, 0.0, dz as f32)
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Back,
            Direction::Back => Direction::Forward,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Raw two-axis movement input (stick or keyboard composite).
///
/// `x` maps to the X axis (right positive) and `y` to the Z axis (forward
/// positive).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveInput {
    pub x: f32,
    pub y: f32,
}

impl MoveInput {
    pub const NONE: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn magnitude(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Maps the input to a cardinal direction.
    ///
    /// Returns `None` when the magnitude does not exceed `deadzone`. The
    /// dominant axis wins; an exact tie resolves to the vertical axis.
    pub fn direction(self, deadzone: f32) -> Option<Direction> {
        if self.magnitude() <= deadzone {
            return None;
        }

        if self.x.abs() > self.y.abs() {
            if self.x > 0.0 {
                Some(Direction::Right)
            } else {
                Some(Direction::Left)
            }
        } else if self.y > 0.0 {
            Some(Direction::Forward)
        } else if self.y < 0.0 {
            Some(Direction::Back)
        } else {
            None
        }
    }
}

impl From<Direction> for MoveInput {
    fn from(direction: Direction) -> Self {
        let (dx, dz) = direction.delta();
        Self::new(dx as f32, dz as f32)
    }
}
