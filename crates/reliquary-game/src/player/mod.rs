//! First-person player rig
//!
//! Provides walking, mouse look and head sway, plus the suspension switch
//! a modal session uses to take control away from the player.

mod controller;
mod movement;

pub use controller::PlayerController;
pub use movement::MovementConfig;

/// Player-control suspension switch
pub trait PlayerControl {
    fn set_movement_enabled(&mut self, enabled: bool);
    fn movement_enabled(&self) -> bool;
    fn set_look_enabled(&mut self, enabled: bool);
    fn look_enabled(&self) -> bool;
    fn set_camera_sway_enabled(&mut self, enabled: bool);
    fn camera_sway_enabled(&self) -> bool;
}
