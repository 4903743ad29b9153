//! Kinematic first-person controller with mouse look and head sway

use std::f32::consts::TAU;

use glam::{EulerRot, Quat, Vec3};

use crate::input::{InputAction, RoutedInput};

use super::{MovementConfig, PlayerControl};

/// Player controller handling walking, look and sway
#[derive(Debug, Clone)]
pub struct PlayerController {
    /// Movement configuration
    pub config: MovementConfig,
    /// Feet position
    position: Vec3,
    /// Yaw rotation in radians (horizontal)
    yaw: f32,
    /// Pitch rotation in radians (vertical)
    pitch: f32,
    /// Head sway phase in radians
    sway_phase: f32,
    movement_enabled: bool,
    look_enabled: bool,
    sway_enabled: bool,
}

impl PlayerController {
    /// Create a new player controller
    pub fn new() -> Self {
        Self::with_config(MovementConfig::default())
    }

    /// Create a player controller with custom config
    pub fn with_config(config: MovementConfig) -> Self {
        Self {
            config,
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            sway_phase: 0.0,
            movement_enabled: true,
            look_enabled: true,
            sway_enabled: true,
        }
    }

    /// Get the player's feet position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Get the player's eye position, including head sway
    pub fn eye_position(&self) -> Vec3 {
        let sway = if self.sway_enabled {
            self.sway_phase.sin() * self.config.sway_amplitude
        } else {
            0.0
        };
        self.position + Vec3::Y * (self.config.eye_height + sway)
    }

    /// Look rotation
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, -self.yaw, self.pitch, 0.0)
    }

    /// View direction (yaw 0 looks down negative Z)
    pub fn forward(&self) -> Vec3 {
        let cos_pitch = self.pitch.cos();
        Vec3::new(
            self.yaw.sin() * cos_pitch,
            self.pitch.sin(),
            -self.yaw.cos() * cos_pitch,
        )
    }

    /// Update the player (fixed timestep)
    pub fn fixed_update(&mut self, input: &RoutedInput<'_>, dt: f32) {
        if self.look_enabled {
            let delta = input.mouse_delta() * self.config.look_sensitivity;
            let (min, max) = self.config.pitch_range();
            self.yaw += delta.x;
            self.pitch = (self.pitch - delta.y).clamp(min, max);
        }

        if !self.movement_enabled {
            return;
        }

        let mut move_dir = Vec3::ZERO;
        if input.is_held(InputAction::MoveForward) {
            move_dir.z -= 1.0;
        }
        if input.is_held(InputAction::MoveBackward) {
            move_dir.z += 1.0;
        }
        if input.is_held(InputAction::MoveLeft) {
            move_dir.x -= 1.0;
        }
        if input.is_held(InputAction::MoveRight) {
            move_dir.x += 1.0;
        }
        if move_dir.length_squared() == 0.0 {
            return;
        }

        // Rotate movement by yaw
        let move_dir = move_dir.normalize();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let world = Vec3::new(
            move_dir.x * cos_yaw - move_dir.z * sin_yaw,
            0.0,
            move_dir.x * sin_yaw + move_dir.z * cos_yaw,
        );

        let step = self.config.walk_speed * dt;
        self.position += world * step;
        if self.sway_enabled {
            self.sway_phase = (self.sway_phase + step * self.config.sway_frequency * TAU) % TAU;
        }
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerControl for PlayerController {
    fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }

    fn movement_enabled(&self) -> bool {
        self.movement_enabled
    }

    fn set_look_enabled(&mut self, enabled: bool) {
        self.look_enabled = enabled;
    }

    fn look_enabled(&self) -> bool {
        self.look_enabled
    }

    fn set_camera_sway_enabled(&mut self, enabled: bool) {
        self.sway_enabled = enabled;
    }

    fn camera_sway_enabled(&self) -> bool {
        self.sway_enabled
    }
}
