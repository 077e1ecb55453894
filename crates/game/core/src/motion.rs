//! Timed transitions: eased lattice steps with a visual hop, and facing.
use std::f32::consts::PI;

use glam::{Quat, Vec3};

use crate::grid::Direction;

/// Cubic ease-in-out over `t` in `[0, 1]`.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Sinusoidal arc height for an eased progress value.
pub fn hop_offset(eased: f32, height: f32) -> f32 {
    (eased * PI).sin() * height
}

/// Yaw (rotation about +Y) that makes +Z face along `heading`.
pub fn yaw_of(heading: Vec3) -> f32 {
    heading.x.atan2(heading.z)
}

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

/// Forward (+Z rotated by `yaw`) on the horizontal plane.
pub fn forward_of(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Single sample of a tween.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenSample {
    /// Logical position along the eased path.
    pub position: Vec3,
    /// Vertical offset of the visual sub-element only.
    pub hop: f32,
    pub finished: bool,
}

/// Eased transition between two points with an optional hop arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    start: Vec3,
    end: Vec3,
    duration: f32,
    elapsed: f32,
    hop_height: f32,
}

impl Tween {
    pub fn new(start: Vec3, end: Vec3, duration: f32, hop_height: f32) -> Self {
        Self {
            start,
            end,
            duration: duration.max(0.0),
            elapsed: 0.0,
            hop_height,
        }
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= f32::EPSILON {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advances by `dt` seconds. The final sample lands exactly on `end`.
    pub fn advance(&mut self, dt: f32) -> TweenSample {
        self.elapsed += dt.max(0.0);
        self.sample()
    }

    pub fn sample(&self) -> TweenSample {
        let t = self.progress();
        if t >= 1.0 {
            return TweenSample {
                position: self.end,
                hop: 0.0,
                finished: true,
            };
        }

        let eased = ease_in_out_cubic(t);
        TweenSample {
            position: self.start.lerp(self.end, eased),
            hop: hop_offset(eased, self.hop_height),
            finished: false,
        }
    }
}

/// Visual orientation that slerps toward the last requested direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Facing {
    pub current: Quat,
    pub target: Quat,
}

impl Facing {
    pub fn new(rotation: Quat) -> Self {
        Self {
            current: rotation,
            target: rotation,
        }
    }

    pub fn look(&mut self, direction: Direction) {
        self.target = Quat::from_rotation_y(yaw_of(direction.vector()));
    }

    pub fn advance(&mut self, dt: f32, rate: f32) {
        let t = (rate * dt).clamp(0.0, 1.0);
        self.current = self.current.slerp(self.target, t).normalize();
    }
}

impl Default for Facing {
    fn default() -> Self {
        Self::new(Quat::IDENTITY)
    }
}
