//! Modal item inspection
//!
//! A session holds one item up close in front of the camera. While active
//! it owns input: the player cannot walk, look around or change the
//! inventory selection. The session is advanced once per tick by the
//! driver and always ends within the tick its exit input arrives.
//!
//! Control state is captured on entry and restored on every exit path, so
//! leaving a session never leaves the player in a different state than it
//! found them.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use reliquary_core::Transform;

use crate::events::EventChannel;
use crate::input::{InputAction, InputRoute, RoutedInput};
use crate::inventory::Inventory;
use crate::item::ItemHandle;
use crate::player::PlayerControl;
use crate::presentation::{InstanceHandle, PresentationSpawner};
use crate::scene::ObjectId;

/// Where the inspected item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionSource {
    /// Picked up from a world object
    World { object: ObjectId },
    /// Opened from the inventory
    InventoryBrowse,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionOutcome {
    /// A world item was grabbed into the inventory
    AddedToInventory,
    /// The item was put back
    Cancelled,
    /// An inventory inspection was closed with grab; nothing changed
    ClosedFromInventory,
}

/// Notifications raised by the session
#[derive(Debug, Clone, PartialEq)]
pub enum InspectionEvent {
    Started {
        item: ItemHandle,
        source: InspectionSource,
    },
    ItemAddedToInventory {
        item: ItemHandle,
    },
    /// Raised exactly once per session
    Ended {
        item: ItemHandle,
        source: InspectionSource,
        outcome: InspectionOutcome,
    },
}

/// Inspection view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionConfig {
    /// Distance from the eye to the inspected item
    pub base_distance: f32,
    /// Closest zoom offset (negative moves the item closer)
    pub min_zoom_offset: f32,
    /// Farthest zoom offset
    pub max_zoom_offset: f32,
    /// Offset change per scroll notch
    pub zoom_speed: f32,
    /// Rotation per pixel of mouse movement, in radians
    pub rotate_speed: f32,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            base_distance: 0.6,
            min_zoom_offset: -0.3,
            max_zoom_offset: 0.4,
            zoom_speed: 0.05,
            rotate_speed: 0.01,
        }
    }
}

/// Collaborators the session drives while active
pub struct InspectionContext<'a> {
    pub inventory: &'a mut Inventory,
    pub player: &'a mut dyn PlayerControl,
    pub spawner: &'a mut dyn PresentationSpawner,
    pub route: &'a mut InputRoute,
    /// Eye position and look rotation
    pub view: Transform,
}

/// Control state captured when a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ControlSnapshot {
    movement: bool,
    look: bool,
    sway: bool,
    selection_locked: bool,
    route: InputRoute,
}

impl ControlSnapshot {
    fn capture(ctx: &InspectionContext<'_>) -> Self {
        Self {
            movement: ctx.player.movement_enabled(),
            look: ctx.player.look_enabled(),
            sway: ctx.player.camera_sway_enabled(),
            selection_locked: ctx.inventory.is_selection_locked(),
            route: *ctx.route,
        }
    }

    fn restore(self, ctx: &mut InspectionContext<'_>) {
        ctx.player.set_movement_enabled(self.movement);
        ctx.player.set_look_enabled(self.look);
        ctx.player.set_camera_sway_enabled(self.sway);
        ctx.inventory.set_selection_locked(self.selection_locked);
        *ctx.route = self.route;
    }
}

#[derive(Debug, Clone)]
struct ActiveInspection {
    item: ItemHandle,
    source: InspectionSource,
    returnable: bool,
    instance: InstanceHandle,
    /// World-space orientation of the held item
    rotation: Quat,
    scale: Vec3,
    zoom_offset: f32,
    snapshot: ControlSnapshot,
}

/// Inspection state machine: idle, or active with one item
#[derive(Debug, Default)]
pub struct InspectionSession {
    pub config: InspectionConfig,
    active: Option<ActiveInspection>,
    pub events: EventChannel<InspectionEvent>,
}

impl InspectionSession {
    pub fn new(config: InspectionConfig) -> Self {
        Self {
            config,
            active: None,
            events: EventChannel::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_item(&self) -> Option<&ItemHandle> {
        self.active.as_ref().map(|a| &a.item)
    }

    pub fn source(&self) -> Option<InspectionSource> {
        self.active.as_ref().map(|a| a.source)
    }

    /// Whether grabbing moves the item into the inventory
    pub fn is_returnable(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.returnable)
    }

    pub fn zoom_offset(&self) -> f32 {
        self.active.as_ref().map_or(0.0, |a| a.zoom_offset)
    }

    /// Orientation of the held item
    pub fn item_rotation(&self) -> Option<Quat> {
        self.active.as_ref().map(|a| a.rotation)
    }

    /// Begin inspecting an item. Rejected while a session is active.
    pub fn start(
        &mut self,
        item: ItemHandle,
        returnable: bool,
        source: InspectionSource,
        ctx: &mut InspectionContext<'_>,
    ) -> bool {
        if let Some(active) = &self.active {
            debug!(
                "Inspection of {} rejected; already inspecting {}",
                item, active.item
            );
            return false;
        }

        let snapshot = ControlSnapshot::capture(ctx);
        let offset = item.display_offset.to_transform();
        let mut active = ActiveInspection {
            item: item.clone(),
            source,
            returnable,
            instance: InstanceHandle(0),
            rotation: (ctx.view.rotation * offset.rotation).normalize(),
            scale: offset.scale,
            zoom_offset: 0.0,
            snapshot,
        };
        active.instance = ctx
            .spawner
            .spawn(&item, self.held_transform(&active, &ctx.view));

        ctx.inventory.set_selection_locked(true);
        ctx.player.set_movement_enabled(false);
        ctx.player.set_look_enabled(false);
        ctx.player.set_camera_sway_enabled(false);
        *ctx.route = InputRoute::Inspection;

        info!("Inspection started: {} ({:?})", item, source);
        self.active = Some(active);
        self.events.emit(&InspectionEvent::Started { item, source });
        true
    }

    /// Advance an active session by one tick. Returns the outcome when the
    /// session ended during this tick.
    pub fn tick(
        &mut self,
        input: &RoutedInput<'_>,
        ctx: &mut InspectionContext<'_>,
    ) -> Option<InspectionOutcome> {
        let config = &self.config;
        let active = self.active.as_mut()?;

        let mut zoom = input.scroll_delta();
        if zoom == 0.0 {
            if input.is_just_pressed(InputAction::ZoomIn) {
                zoom += 1.0;
            }
            if input.is_just_pressed(InputAction::ZoomOut) {
                zoom -= 1.0;
            }
        }
        if zoom != 0.0 {
            active.zoom_offset = (active.zoom_offset - zoom * config.zoom_speed)
                .clamp(config.min_zoom_offset, config.max_zoom_offset);
        }

        if input.is_held(InputAction::Rotate) {
            let delta = input.mouse_delta() * config.rotate_speed;
            if delta != glam::Vec2::ZERO {
                let yaw = Quat::from_axis_angle(Vec3::Y, delta.x);
                let pitch = Quat::from_axis_angle(ctx.view.right(), delta.y);
                active.rotation = (yaw * pitch * active.rotation).normalize();
            }
        }

        let outcome = if input.is_just_pressed(InputAction::Grab) {
            match active.source {
                InspectionSource::InventoryBrowse => Some(InspectionOutcome::ClosedFromInventory),
                InspectionSource::World { .. } if active.returnable => {
                    Some(InspectionOutcome::AddedToInventory)
                }
                InspectionSource::World { .. } => None,
            }
        } else {
            None
        };
        let outcome = outcome.or_else(|| {
            input
                .is_just_pressed(InputAction::Return)
                .then_some(InspectionOutcome::Cancelled)
        });

        match outcome {
            Some(outcome) => Some(self.finish(outcome, ctx)),
            None => {
                let active = self.active.as_ref()?;
                let transform = self.held_transform(active, &ctx.view);
                ctx.spawner.set_transform(active.instance, transform);
                None
            }
        }
    }

    fn finish(
        &mut self,
        outcome: InspectionOutcome,
        ctx: &mut InspectionContext<'_>,
    ) -> InspectionOutcome {
        let Some(active) = self.active.take() else {
            return outcome;
        };

        if outcome == InspectionOutcome::AddedToInventory {
            ctx.inventory.add(active.item.clone());
            self.events.emit(&InspectionEvent::ItemAddedToInventory {
                item: active.item.clone(),
            });
        }

        ctx.spawner.despawn(active.instance);
        active.snapshot.restore(ctx);

        info!("Inspection of {} ended: {:?}", active.item, outcome);
        self.events.emit(&InspectionEvent::Ended {
            item: active.item,
            source: active.source,
            outcome,
        });
        outcome
    }

    fn held_transform(&self, active: &ActiveInspection, view: &Transform) -> Transform {
        let distance = self.config.base_distance + active.zoom_offset;
        Transform {
            position: view.position + view.forward() * distance,
            rotation: active.rotation,
            scale: active.scale,
        }
    }
}
