//! Collectible artifact records
//!
//! Items are authored as static data and never mutated at runtime. Every
//! holder references the same record through an [`ItemHandle`], and two
//! handles are the same item exactly when their ids match.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use glam::{EulerRot, Quat, Vec3};
use reliquary_core::{Era, Transform};
use serde::{Deserialize, Serialize};

/// Unique item identifier, stable for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Placement of a presentation instance relative to the anchor it is shown at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOffset {
    /// Local translation from the anchor
    pub position: Vec3,
    /// Local rotation as XYZ euler angles in degrees
    pub rotation_degrees: Vec3,
    /// Uniform scale
    pub scale: f32,
}

impl Default for DisplayOffset {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_degrees: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl DisplayOffset {
    /// Local transform described by this offset
    pub fn to_transform(&self) -> Transform {
        let r = self.rotation_degrees;
        Transform {
            position: self.position,
            rotation: Quat::from_euler(
                EulerRot::XYZ,
                r.x.to_radians(),
                r.y.to_radians(),
                r.z.to_radians(),
            ),
            scale: Vec3::splat(self.scale),
        }
    }
}

/// An authored collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub display_name: String,
    pub era: Era,
    /// Puzzle instance this item belongs to
    pub puzzle_group: i32,
    /// World prefab the presentation layer instantiates
    pub prefab: String,
    #[serde(default)]
    pub display_offset: DisplayOffset,
}

/// Shared reference to an authored item
#[derive(Debug, Clone)]
pub struct ItemHandle(Arc<Item>);

impl ItemHandle {
    pub fn new(item: Item) -> Self {
        Self(Arc::new(item))
    }

    pub fn id(&self) -> ItemId {
        self.0.id
    }
}

impl Deref for ItemHandle {
    type Target = Item;

    fn deref(&self) -> &Item {
        &self.0
    }
}

impl PartialEq for ItemHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for ItemHandle {}

impl fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0.display_name, self.0.id)
    }
}

#[cfg(test)]
pub(crate) mod test_items {
    use super::*;

    /// Build a handle with the given identity, era and group
    pub fn artifact(id: u32, era: Era, group: i32) -> ItemHandle {
        ItemHandle::new(Item {
            id: ItemId(id),
            display_name: format!("Artifact {}", id),
            era,
            puzzle_group: group,
            prefab: format!("artifact_{}", id),
            display_offset: DisplayOffset::default(),
        })
    }
}
