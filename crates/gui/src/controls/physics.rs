//! Walking physics: planar friction, gravity, jump and ground clamp.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::viewport::camera::CameraRig;

/// Movement constants. Defaults give the classic walk feel: strong friction,
/// gravity scaled by a mass factor of 100, and a jump that clears ~60 units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementParams {
    /// Horizontal velocity decay per second
    pub damping: f32,
    pub gravity: f32,
    pub mass: f32,
    pub acceleration: f32,
    pub jump_impulse: f32,
    /// Eye height the rig rests at
    pub floor_height: f32,
    /// Frame deltas above this (seconds) are clamped
    pub max_frame_delta: f32,
    /// Multiplier on look sensitivity
    pub pointer_speed: f32,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            damping: 10.0,
            gravity: 9.8,
            mass: 100.0,
            acceleration: 400.0,
            jump_impulse: 350.0,
            floor_height: 10.0,
            max_frame_delta: 0.1,
            pointer_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerState {
    pub velocity: Vec3,
    pub look_locked: bool,
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub can_jump: bool,
}

impl PlayerState {
    pub fn set_latch(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Forward => self.move_forward = held,
            Direction::Backward => self.move_backward = held,
            Direction::Left => self.move_left = held,
            Direction::Right => self.move_right = held,
        }
    }

    /// Normalized input direction; x is right, z is forward
    pub fn direction(&self) -> Vec3 {
        let x = f32::from(u8::from(self.move_right)) - f32::from(u8::from(self.move_left));
        let z = f32::from(u8::from(self.move_forward)) - f32::from(u8::from(self.move_backward));
        Vec3::new(x, 0.0, z).normalize_or_zero()
    }

    /// Add an upward impulse if grounded. Jumping is disarmed either way
    /// until the next landing.
    pub fn jump(&mut self, impulse: f32) -> bool {
        let applied = self.can_jump;
        if applied {
            self.velocity.y += impulse;
        }
        self.can_jump = false;
        applied
    }

    pub fn any_latch(&self) -> bool {
        self.move_forward || self.move_backward || self.move_left || self.move_right
    }
}

/// Advance one frame of `dt` seconds. Does nothing while the look is
/// unlocked.
pub fn integrate(
    state: &mut PlayerState,
    rig: &mut dyn CameraRig,
    params: &MovementParams,
    dt: f32,
) {
    if !state.look_locked || dt.is_nan() || dt <= 0.0 {
        return;
    }
    let dt = dt.min(params.max_frame_delta);
    let dir = state.direction();
    let (walk_z, walk_x) = (
        state.move_forward || state.move_backward,
        state.move_left || state.move_right,
    );
    let v = &mut state.velocity;

    v.x -= v.x * params.damping * dt;
    v.z -= v.z * params.damping * dt;
    v.y -= params.gravity * params.mass * dt;

    if walk_z {
        v.z -= dir.z * params.acceleration * dt;
    }
    if walk_x {
        v.x -= dir.x * params.acceleration * dt;
    }

    rig.move_right(-v.x * dt);
    rig.move_forward(-v.z * dt);

    let y = rig.height() + v.y * dt;
    if y < params.floor_height {
        v.y = 0.0;
        rig.set_height(params.floor_height);
        state.can_jump = true;
    } else {
        rig.set_height(y);
    }
}
