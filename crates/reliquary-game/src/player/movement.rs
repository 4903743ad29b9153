//! Movement configuration and constants

use serde::{Deserialize, Serialize};

/// Movement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Walking speed in meters per second
    pub walk_speed: f32,
    /// Mouse sensitivity (radians per pixel)
    pub look_sensitivity: f32,
    /// Minimum pitch angle in degrees
    pub pitch_min: f32,
    /// Maximum pitch angle in degrees
    pub pitch_max: f32,
    /// Eye height above the feet
    pub eye_height: f32,
    /// Vertical head sway amplitude in meters
    pub sway_amplitude: f32,
    /// Head sway cycles per meter walked
    pub sway_frequency: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 3.0,
            look_sensitivity: 0.003,
            pitch_min: -85.0,
            pitch_max: 85.0,
            eye_height: 1.6,
            sway_amplitude: 0.03,
            sway_frequency: 0.9,
        }
    }
}

impl MovementConfig {
    /// Pitch limits in radians
    pub fn pitch_range(&self) -> (f32, f32) {
        (self.pitch_min.to_radians(), self.pitch_max.to_radians())
    }
}
