//! Per-tick interaction targeting
//!
//! Casts a ray along the view axis, resolves the hit to a scene object and
//! decides whether that object may be interacted with right now. Targeting
//! only reports; the caller applies the trigger after the pass so that
//! mutations caused by the trigger are never observed by the pass that
//! caused them.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use reliquary_physics::{LayerMask, PhysicsWorld};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::events::EventChannel;
use crate::input::{InputAction, RoutedInput};
use crate::inventory::Inventory;
use crate::scene::{ObjectId, Scene, WorldObject};

/// Raycast provider
pub trait Raycaster {
    /// Nearest object hit within `max_distance`, if any
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<ObjectId>;

    /// Drop whatever the provider holds for a removed object
    fn forget(&mut self, _object: ObjectId) {}
}

impl Raycaster for PhysicsWorld {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<ObjectId> {
        self.cast_ray(origin, direction, max_distance, layers)
            .map(|hit| ObjectId(hit.owner))
    }

    fn forget(&mut self, object: ObjectId) {
        self.remove_owner(object.0);
    }
}

/// Shared provider, for callers that keep adding colliders after handing it over
impl<R: Raycaster> Raycaster for Rc<RefCell<R>> {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<ObjectId> {
        self.borrow().cast(origin, direction, max_distance, layers)
    }

    fn forget(&mut self, object: ObjectId) {
        self.borrow_mut().forget(object);
    }
}

/// Targeting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Maximum aiming distance in meters
    pub ray_length: f32,
    /// Layers the aiming ray tests against
    pub layer_mask: u32,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            ray_length: 2.5,
            layer_mask: LayerMask::INTERACTABLE.0 | LayerMask::WORLD.0,
        }
    }
}

/// What the crosshair should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reticle {
    /// Nothing interactable under the crosshair
    #[default]
    NotTargetable,
    /// An interactable is aimed at but cannot be used right now
    Blocked,
    CanInteract,
}

/// Raised when the aimed object or its reticle state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetChanged {
    pub target: Option<ObjectId>,
    pub reticle: Reticle,
}

/// Outcome of one targeting pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetingReport {
    pub target: Option<ObjectId>,
    pub reticle: Reticle,
    /// The interact edge arrived while the target was usable
    pub trigger: bool,
}

/// Raycast-driven selection of the aimed object
pub struct InteractionTargeting {
    pub config: TargetingConfig,
    raycaster: Option<Box<dyn Raycaster>>,
    enabled: bool,
    last: TargetChanged,
    pub events: EventChannel<TargetChanged>,
}

impl InteractionTargeting {
    /// Without a raycast provider targeting stays disabled for good
    pub fn new(config: TargetingConfig, raycaster: Option<Box<dyn Raycaster>>) -> Self {
        if raycaster.is_none() {
            warn!("No raycast provider; interaction targeting disabled");
        }
        Self {
            config,
            enabled: raycaster.is_some(),
            raycaster,
            last: TargetChanged {
                target: None,
                reticle: Reticle::NotTargetable,
            },
            events: EventChannel::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the per-tick pass. Disabling clears the target.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.raycaster.is_none() {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.publish(None, Reticle::NotTargetable);
        }
    }

    pub fn raycaster_mut(&mut self) -> Option<&mut (dyn Raycaster + 'static)> {
        self.raycaster.as_deref_mut()
    }

    /// Currently aimed object
    pub fn current_target(&self) -> Option<ObjectId> {
        self.last.target
    }

    pub fn reticle(&self) -> Reticle {
        self.last.reticle
    }

    /// Run one targeting pass from the given eye position
    pub fn update(
        &mut self,
        origin: Vec3,
        forward: Vec3,
        scene: &Scene,
        inventory: &Inventory,
        input: &RoutedInput<'_>,
    ) -> TargetingReport {
        let Some(raycaster) = self.raycaster.as_deref().filter(|_| self.enabled) else {
            return TargetingReport::default();
        };

        let hit = raycaster.cast(
            origin,
            forward,
            self.config.ray_length,
            LayerMask(self.config.layer_mask),
        );
        let target = hit.and_then(|id| scene.get(id).map(|object| (id, object)));

        let (target, reticle) = match target {
            Some((id, object)) if object.interactable.is_some() => {
                let reticle = if Self::is_usable(object, inventory) {
                    Reticle::CanInteract
                } else {
                    Reticle::Blocked
                };
                (Some(id), reticle)
            }
            _ => (None, Reticle::NotTargetable),
        };

        self.publish(target, reticle);

        let trigger =
            reticle == Reticle::CanInteract && input.is_just_pressed(InputAction::Interact);
        TargetingReport {
            target,
            reticle,
            trigger,
        }
    }

    /// Whether the object may be triggered with the current selection
    pub fn is_usable(object: &WorldObject, inventory: &Inventory) -> bool {
        let can_interact = object
            .interactable
            .as_ref()
            .is_some_and(|i| i.can_interact());
        can_interact && Self::selection_valid(object, inventory)
    }

    fn selection_valid(object: &WorldObject, inventory: &Inventory) -> bool {
        if object.pedestal.as_ref().is_some_and(|p| p.is_occupied()) {
            return true;
        }
        let Some(matcher) = &object.matcher else {
            return true;
        };
        if object.displayer.as_ref().is_some_and(|d| d.is_occupied()) {
            return true;
        }
        match inventory.selected() {
            None => false,
            Some(selected) => matcher.would_accept(selected),
        }
    }

    fn publish(&mut self, target: Option<ObjectId>, reticle: Reticle) {
        let next = TargetChanged { target, reticle };
        if next != self.last {
            debug!("Target {:?} ({:?})", target, reticle);
            self.last = next;
            self.events.emit(&next);
        }
    }
}

impl std::fmt::Debug for InteractionTargeting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionTargeting")
            .field("config", &self.config)
            .field("has_raycaster", &self.raycaster.is_some())
            .field("enabled", &self.enabled)
            .field("last", &self.last)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputRoute, InputState};
    use crate::interactable::Interactable;
    use crate::item::test_items::artifact;
    use crate::item::ItemId;
    use crate::matcher::ItemMatcher;
    use crate::presentation::InstanceLedger;
    use reliquary_core::{Era, Transform};
    use std::cell::Cell;

    struct Aim(Rc<Cell<Option<ObjectId>>>);

    impl Raycaster for Aim {
        fn cast(&self, _: Vec3, _: Vec3, _: f32, _: LayerMask) -> Option<ObjectId> {
            self.0.get()
        }
    }

    fn targeting() -> (InteractionTargeting, Rc<Cell<Option<ObjectId>>>) {
        let aim = Rc::new(Cell::new(None));
        let targeting = InteractionTargeting::new(
            TargetingConfig::default(),
            Some(Box::new(Aim(Rc::clone(&aim)))),
        );
        (targeting, aim)
    }

    fn run(
        targeting: &mut InteractionTargeting,
        scene: &Scene,
        inventory: &Inventory,
        interact: bool,
    ) -> TargetingReport {
        let mut state = InputState::new();
        if interact {
            state.tap(InputAction::Interact);
        }
        targeting.update(
            Vec3::ZERO,
            Vec3::NEG_Z,
            scene,
            inventory,
            &state.routed(InputRoute::Gameplay),
        )
    }

    fn slot(scene: &mut Scene) -> ObjectId {
        scene.insert(
            WorldObject::new("slot", Transform::default())
                .with_interactable(Interactable::new())
                .with_matcher(ItemMatcher::exact(ItemId(1)))
                .with_displayer(),
        )
    }

    #[test]
    fn test_miss_is_not_targetable() {
        let (mut targeting, _) = targeting();
        let report = run(&mut targeting, &Scene::new(), &Inventory::new(), true);
        assert_eq!(report, TargetingReport::default());
    }

    #[test]
    fn test_hit_without_interactable() {
        let (mut targeting, aim) = targeting();
        let mut scene = Scene::new();
        let wall = scene.insert(WorldObject::new("wall", Transform::default()));
        aim.set(Some(wall));

        let report = run(&mut targeting, &scene, &Inventory::new(), true);
        assert_eq!(report.reticle, Reticle::NotTargetable);
        assert!(!report.trigger);
    }

    #[test]
    fn test_plain_interactable_triggers_on_edge() {
        let (mut targeting, aim) = targeting();
        let mut scene = Scene::new();
        let lever = scene.insert(
            WorldObject::new("lever", Transform::default()).with_interactable(Interactable::new()),
        );
        aim.set(Some(lever));

        let idle = run(&mut targeting, &scene, &Inventory::new(), false);
        assert_eq!(idle.reticle, Reticle::CanInteract);
        assert!(!idle.trigger);
        assert!(run(&mut targeting, &scene, &Inventory::new(), true).trigger);
    }

    #[test]
    fn test_disabled_interactable_is_blocked() {
        let (mut targeting, aim) = targeting();
        let mut scene = Scene::new();
        let mut door = Interactable::new();
        door.set_can_interact(false);
        let id = scene.insert(WorldObject::new("door", Transform::default()).with_interactable(door));
        aim.set(Some(id));

        let report = run(&mut targeting, &scene, &Inventory::new(), true);
        assert_eq!(report.reticle, Reticle::Blocked);
        assert!(!report.trigger);
    }

    #[test]
    fn test_matcher_needs_selection() {
        let (mut targeting, aim) = targeting();
        let mut scene = Scene::new();
        let id = slot(&mut scene);
        aim.set(Some(id));
        let mut inventory = Inventory::new();

        assert_eq!(run(&mut targeting, &scene, &inventory, true).reticle, Reticle::Blocked);

        inventory.add(artifact(2, Era::Ancient, 0));
        assert_eq!(run(&mut targeting, &scene, &inventory, true).reticle, Reticle::Blocked);

        inventory.add(artifact(1, Era::Ancient, 0));
        assert!(run(&mut targeting, &scene, &inventory, true).trigger);
    }

    #[test]
    fn test_occupied_displayer_short_circuits() {
        let (mut targeting, aim) = targeting();
        let mut scene = Scene::new();
        let id = slot(&mut scene);
        aim.set(Some(id));

        let shown = artifact(1, Era::Ancient, 0);
        let mut ledger = InstanceLedger::new();
        let mut events = EventChannel::new();
        scene
            .get_mut(id)
            .unwrap()
            .displayer
            .as_mut()
            .unwrap()
            .display(id, Some(&shown), &mut ledger, &mut events);

        let report = run(&mut targeting, &scene, &Inventory::new(), true);
        assert_eq!(report.reticle, Reticle::CanInteract);
        assert!(report.trigger);
    }

    #[test]
    fn test_category_matcher_compares_group() {
        let (mut targeting, aim) = targeting();
        let mut scene = Scene::new();
        let id = scene.insert(
            WorldObject::new("shelf", Transform::default())
                .with_interactable(Interactable::new())
                .with_matcher(ItemMatcher::category(Era::Medieval, 3)),
        );
        aim.set(Some(id));

        let mut inventory = Inventory::new();
        inventory.add(artifact(7, Era::Medieval, 4));
        assert_eq!(run(&mut targeting, &scene, &inventory, false).reticle, Reticle::Blocked);
        inventory.add(artifact(8, Era::Medieval, 3));
        assert_eq!(run(&mut targeting, &scene, &inventory, false).reticle, Reticle::CanInteract);
    }

    #[test]
    fn test_occupied_pedestal_ignores_matcher() {
        let (mut targeting, aim) = targeting();
        let mut scene = Scene::new();
        let id = scene.insert(
            WorldObject::new("pedestal", Transform::default())
                .with_interactable(Interactable::new())
                .with_matcher(ItemMatcher::exact(ItemId(9)))
                .with_pedestal(),
        );
        aim.set(Some(id));
        assert_eq!(run(&mut targeting, &scene, &Inventory::new(), false).reticle, Reticle::Blocked);

        scene
            .get_mut(id)
            .unwrap()
            .pedestal
            .as_mut()
            .unwrap()
            .place(artifact(9, Era::Future, 0));
        assert_eq!(run(&mut targeting, &scene, &Inventory::new(), false).reticle, Reticle::CanInteract);
    }

    #[test]
    fn test_target_changes_reported_once() {
        let (mut targeting, aim) = targeting();
        let log = targeting.events.record();
        let mut scene = Scene::new();
        let lever = scene.insert(
            WorldObject::new("lever", Transform::default()).with_interactable(Interactable::new()),
        );

        aim.set(Some(lever));
        run(&mut targeting, &scene, &Inventory::new(), false);
        run(&mut targeting, &scene, &Inventory::new(), false);
        aim.set(None);
        run(&mut targeting, &scene, &Inventory::new(), false);

        assert_eq!(log.borrow().len(), 2);
        assert_eq!(log.borrow()[0].target, Some(lever));
        assert_eq!(log.borrow()[1].target, None);
    }

    #[test]
    fn test_physics_world_as_provider() {
        let physics = Rc::new(RefCell::new(PhysicsWorld::new()));
        let mut targeting = InteractionTargeting::new(
            TargetingConfig::default(),
            Some(Box::new(Rc::clone(&physics))),
        );
        let mut scene = Scene::new();
        let lever = scene.insert(
            WorldObject::new("lever", Transform::default()).with_interactable(Interactable::new()),
        );
        physics.borrow_mut().insert_box(
            lever.0,
            Vec3::splat(0.2),
            &Transform::from_position(Vec3::new(0.0, 0.0, -1.5)),
            LayerMask::INTERACTABLE,
        );

        let report = run(&mut targeting, &scene, &Inventory::new(), true);
        assert_eq!(report.target, Some(lever));
        assert!(report.trigger);

        if let Some(raycaster) = targeting.raycaster_mut() {
            raycaster.forget(lever);
        }
        assert_eq!(physics.borrow().collider_count(), 0);
        assert_eq!(run(&mut targeting, &scene, &Inventory::new(), true).target, None);
    }

    #[test]
    fn test_missing_raycaster_stays_disabled() {
        let mut targeting = InteractionTargeting::new(TargetingConfig::default(), None);
        targeting.set_enabled(true);
        assert!(!targeting.is_enabled());
        let report = run(&mut targeting, &Scene::new(), &Inventory::new(), true);
        assert!(!report.trigger);
    }
}
