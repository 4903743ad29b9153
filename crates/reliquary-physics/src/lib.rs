//! Reliquary Physics - Raycast world using rapier3d
//!
//! Holds the static colliders of scene objects that can be aimed at and
//! answers nearest-hit ray queries filtered by layer. Every collider carries
//! the id of the scene object that owns it in its user data.

use std::collections::HashMap;

use glam::Vec3;
use nalgebra::{Isometry3, Vector3};
use rapier3d::prelude::*;
use reliquary_core::Transform;
use tracing::debug;

/// Bitmask of collision layers a collider lives on or a query accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    /// Plain level geometry that blocks rays
    pub const WORLD: LayerMask = LayerMask(1 << 0);
    /// Objects the player can aim at and interact with
    pub const INTERACTABLE: LayerMask = LayerMask(1 << 1);

    /// Whether the two masks share at least one layer
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    fn group(self) -> Group {
        Group::from_bits_truncate(self.0)
    }
}

/// Nearest hit returned by a ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Scene object that owns the collider
    pub owner: u64,
    /// Distance along the ray to the hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Static collision world used for aiming queries
pub struct PhysicsWorld {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    island_manager: IslandManager,
    query_pipeline: QueryPipeline,
    /// Owner id to collider, so colliders can be dropped with their object
    owners: HashMap<u64, ColliderHandle>,
}

impl PhysicsWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
            owners: HashMap::new(),
        }
    }

    /// Add a box collider for a scene object. Replaces any collider the
    /// owner already had.
    pub fn insert_box(
        &mut self,
        owner: u64,
        half_extents: Vec3,
        transform: &Transform,
        layers: LayerMask,
    ) -> ColliderHandle {
        self.remove_owner(owner);

        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .position(to_isometry(transform))
            .collision_groups(InteractionGroups::new(layers.group(), Group::ALL))
            .user_data(owner as u128)
            .build();

        let handle = self.collider_set.insert(collider);
        self.owners.insert(owner, handle);
        self.query_pipeline.update(&self.collider_set);
        debug!("Collider added for object {}", owner);
        handle
    }

    /// Remove the collider belonging to a scene object, if any
    pub fn remove_owner(&mut self, owner: u64) -> bool {
        let Some(handle) = self.owners.remove(&owner) else {
            return false;
        };
        self.collider_set
            .remove(handle, &mut self.island_manager, &mut self.rigid_body_set, true);
        self.query_pipeline.update(&self.collider_set);
        true
    }

    /// Number of colliders in the world
    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }

    /// Cast a ray and return the nearest hit on any of the given layers.
    ///
    /// Geometry on other layers is ignored entirely, so a wall only blocks
    /// the ray when `layers` includes [`LayerMask::WORLD`].
    pub fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );
        let filter =
            QueryFilter::default().groups(InteractionGroups::new(Group::ALL, layers.group()));

        let (handle, toi) = self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true,
            filter,
        )?;

        let collider = self.collider_set.get(handle)?;
        Some(RayHit {
            owner: collider.user_data as u64,
            distance: toi,
            point: origin + direction * toi,
        })
    }
}

fn to_isometry(transform: &Transform) -> Isometry3<f32> {
    let (axis, angle) = transform.rotation.to_axis_angle();
    let p = transform.position;
    Isometry3::new(Vector3::new(p.x, p.y, p.z), Vector3::new(axis.x, axis.y, axis.z) * angle)
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
