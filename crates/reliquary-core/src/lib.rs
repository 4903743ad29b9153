//! Reliquary Core - Shared primitives for the Reliquary puzzle game
//!
//! This crate provides the foundational types used by the other crates:
//! - Mathematical primitives (re-exported from glam)
//! - Transform for placing objects and presentation instances
//! - Era, the category every collectible artifact belongs to
//! - Fixed-tick clock driving the simulation

pub mod era;
pub mod time;
pub mod types;

pub use era::Era;
pub use glam::{Mat4, Quat, Vec2, Vec3};
pub use time::{TickClock, TickConfig, TickConfigError};
pub use types::Transform;
