//! Per-tick driver of the interaction core
//!
//! [`InteractionCore`] owns the scene, the inventory, targeting, the
//! inspection session and the player rig, and receives its external
//! collaborators (raycast provider, presentation spawner) at construction.
//!
//! Each tick runs in a fixed order:
//!
//! 1. the player rig moves and looks, subject to its suspension switches;
//! 2. while an inspection is active it alone consumes input;
//! 3. otherwise targeting runs against the state as it stood at the start
//!    of the tick, then the trigger it reports is applied;
//! 4. inventory selection input and the inspect action are handled last.

use tracing::{debug, info, warn};

use reliquary_core::Transform;

use crate::config::CoreConfig;
use crate::input::{InputAction, InputRoute, InputState, RoutedInput};
use crate::inspection::{InspectionContext, InspectionOutcome, InspectionSession, InspectionSource};
use crate::interactable::{InteractionTriggered, TriggerBehavior};
use crate::inventory::{Inventory, SelectionDirection};
use crate::item::ItemHandle;
use crate::player::PlayerController;
use crate::presentation::PresentationSpawner;
use crate::scene::{ObjectId, Scene};
use crate::targeting::{InteractionTargeting, Raycaster, TargetingReport};

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Targeting result; default while inspecting
    pub targeting: TargetingReport,
    /// Interaction fired this tick
    pub triggered: Option<InteractionTriggered>,
    /// Inspection session that ended this tick
    pub inspection_ended: Option<InspectionOutcome>,
}

/// The interaction, inventory and inspection core
pub struct InteractionCore {
    pub scene: Scene,
    pub inventory: Inventory,
    pub targeting: InteractionTargeting,
    pub inspection: InspectionSession,
    pub player: PlayerController,
    spawner: Option<Box<dyn PresentationSpawner>>,
    route: InputRoute,
    /// World pickup under inspection and its interactable state to restore on cancel
    pickup_restore: Option<(ObjectId, bool)>,
    dt: f32,
    tick_count: u64,
}

impl InteractionCore {
    /// Build the core. Missing collaborators are reported once here; the
    /// features depending on them stay disabled.
    pub fn new(
        config: CoreConfig,
        raycaster: Option<Box<dyn Raycaster>>,
        spawner: Option<Box<dyn PresentationSpawner>>,
    ) -> Self {
        if spawner.is_none() {
            warn!("No presentation spawner; inspection and item display disabled");
        }
        let dt = config.tick.fixed_timestep;
        Self {
            scene: Scene::new(),
            inventory: Inventory::new(),
            targeting: InteractionTargeting::new(config.targeting, raycaster),
            inspection: InspectionSession::new(config.inspection),
            player: PlayerController::with_config(config.movement),
            spawner,
            route: InputRoute::Gameplay,
            pickup_restore: None,
            dt,
            tick_count: 0,
        }
    }

    /// Current owner of input
    pub fn route(&self) -> InputRoute {
        self.route
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn spawner_mut(&mut self) -> Option<&mut (dyn PresentationSpawner + 'static)> {
        self.spawner.as_deref_mut()
    }

    /// Advance the core by one fixed tick
    pub fn tick(&mut self, input: &InputState) -> TickReport {
        self.tick_count += 1;
        let routed = input.routed(self.route);
        self.player.fixed_update(&routed, self.dt);

        let mut report = TickReport::default();
        if self.inspection.is_active() {
            report.inspection_ended = self.tick_inspection(&routed);
            return report;
        }

        report.targeting = self.targeting.update(
            self.player.eye_position(),
            self.player.forward(),
            &self.scene,
            &self.inventory,
            &routed,
        );
        if report.targeting.trigger {
            if let Some(target) = report.targeting.target {
                report.triggered = self.apply_trigger(target);
            }
        }

        if routed.is_just_pressed(InputAction::SelectPrevious) {
            self.inventory.advance_selection(SelectionDirection::Previous);
        }
        if routed.is_just_pressed(InputAction::SelectNext) {
            self.inventory.advance_selection(SelectionDirection::Next);
        }
        if routed.is_just_pressed(InputAction::Inspect) {
            if let Some(item) = self.inventory.selected().cloned() {
                self.start_inspection(item, false, InspectionSource::InventoryBrowse);
            }
        }

        report
    }

    /// Start an inspection session. Rejected while one is active or when
    /// no presentation spawner was provided.
    pub fn start_inspection(
        &mut self,
        item: ItemHandle,
        returnable: bool,
        source: InspectionSource,
    ) -> bool {
        let view = self.view();
        let Some(spawner) = self.spawner.as_deref_mut() else {
            debug!("Inspection of {} skipped; no spawner", item);
            return false;
        };
        let mut ctx = InspectionContext {
            inventory: &mut self.inventory,
            player: &mut self.player,
            spawner,
            route: &mut self.route,
            view,
        };
        let started = self.inspection.start(item, returnable, source, &mut ctx);
        if started {
            self.targeting.set_enabled(false);
        }
        started
    }

    fn tick_inspection(&mut self, input: &RoutedInput<'_>) -> Option<InspectionOutcome> {
        let source = self.inspection.source()?;
        let view = self.view();
        let spawner = self.spawner.as_deref_mut()?;
        let mut ctx = InspectionContext {
            inventory: &mut self.inventory,
            player: &mut self.player,
            spawner,
            route: &mut self.route,
            view,
        };
        let outcome = self.inspection.tick(input, &mut ctx)?;
        let restore = self.pickup_restore.take();

        if let InspectionSource::World { object } = source {
            match outcome {
                InspectionOutcome::AddedToInventory => {
                    let removed = self.scene.subtree(object);
                    self.scene.despawn(object);
                    if let Some(raycaster) = self.targeting.raycaster_mut() {
                        for id in removed {
                            raycaster.forget(id);
                        }
                    }
                }
                InspectionOutcome::Cancelled => {
                    if let Some((_, can_interact)) = restore.filter(|(id, _)| *id == object) {
                        if let Some(interactable) = self
                            .scene
                            .get_mut(object)
                            .and_then(|o| o.interactable.as_mut())
                        {
                            interactable.set_can_interact(can_interact);
                        }
                    }
                }
                InspectionOutcome::ClosedFromInventory => {}
            }
        }

        self.targeting.set_enabled(true);
        Some(outcome)
    }

    /// Fire the target's interactable and run its behavior
    fn apply_trigger(&mut self, target: ObjectId) -> Option<InteractionTriggered> {
        let fired = self.scene.trigger(target)?;
        if let Some(cue) = &fired.feedback {
            debug!("Feedback cue '{}' on {:?}", cue, target);
        }
        if let Some(item) = &fired.granted {
            self.inventory.add(item.clone());
        }

        let behavior = self.scene.get(target).and_then(|o| o.behavior.clone());
        match behavior {
            Some(TriggerBehavior::InspectPickup { item }) => {
                let source = InspectionSource::World { object: target };
                if self.start_inspection(item, true, source) {
                    if let Some(interactable) = self
                        .scene
                        .get_mut(target)
                        .and_then(|o| o.interactable.as_mut())
                    {
                        // Single-use pickups are already disabled for good
                        self.pickup_restore = Some((target, interactable.can_interact()));
                        interactable.set_can_interact(false);
                    }
                }
            }
            Some(TriggerBehavior::Displayer) => self.use_displayer(target),
            Some(TriggerBehavior::Pedestal) => self.use_pedestal(target),
            Some(TriggerBehavior::Notify { tag }) => {
                debug!("Object {:?} notified '{}'", target, tag);
            }
            None => {}
        }

        Some(fired)
    }

    fn use_displayer(&mut self, slot: ObjectId) {
        let Some(occupied) = self
            .scene
            .get(slot)
            .and_then(|o| o.displayer.as_ref())
            .map(|d| d.is_occupied())
        else {
            return;
        };
        let Some(spawner) = self.spawner.as_deref_mut() else {
            return;
        };

        let selected = self.inventory.selected().cloned();
        if !occupied && self.scene.display_selected(slot, selected.as_ref(), spawner) {
            if let Some(matcher) = self.scene.get_mut(slot).and_then(|o| o.matcher.as_mut()) {
                matcher.evaluate(selected.as_ref());
            }
        } else {
            // Taking an item back or finding the slot empty clears the latch
            self.scene.take_displayed(slot, spawner);
            if let Some(matcher) = self.scene.get_mut(slot).and_then(|o| o.matcher.as_mut()) {
                matcher.reset();
            }
        }

        self.recheck_parent(slot);
    }

    fn use_pedestal(&mut self, pedestal: ObjectId) {
        let Some(occupied) = self
            .scene
            .get(pedestal)
            .and_then(|o| o.pedestal.as_ref())
            .map(|p| p.is_occupied())
        else {
            return;
        };
        if occupied {
            self.scene.activate_pedestal(pedestal);
            return;
        }

        let Some(selected) = self.inventory.selected().cloned() else {
            return;
        };
        // The matcher reads the selection before the artifact leaves the inventory
        let accepted = self
            .scene
            .get_mut(pedestal)
            .and_then(|o| o.matcher.as_mut())
            .map_or(true, |m| m.evaluate(Some(&selected)));
        if !accepted {
            debug!("{} rejected by pedestal {:?}", selected, pedestal);
            return;
        }

        if self.scene.place_artifact(pedestal, selected.clone()) {
            self.inventory.remove(&selected);
            self.recheck_parent(pedestal);
        }
    }

    fn recheck_parent(&mut self, child: ObjectId) {
        if let Some(validator) = self.scene.validator_of(child) {
            if self.scene.recheck_puzzle(validator).is_some() {
                info!("Puzzle {:?} solved", validator);
            }
        }
    }

    fn view(&self) -> Transform {
        Transform::from_position_rotation(self.player.eye_position(), self.player.rotation())
    }
}

impl std::fmt::Debug for InteractionCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionCore")
            .field("objects", &self.scene.len())
            .field("inventory", &self.inventory.len())
            .field("inspecting", &self.inspection.is_active())
            .field("route", &self.route)
            .field("tick_count", &self.tick_count)
            .finish()
    }
}
