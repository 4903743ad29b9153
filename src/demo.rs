//! Headless observatory room
//!
//! Builds a small puzzle room around the player and replays a scripted
//! input timeline through the real input handler, physics raycasts and
//! interaction core.
//!
//! Layout, by bearing from the player (0 degrees is straight ahead):
//! - 0: Sun Disc on a table, picked up by inspecting it
//! - 90: Moon Disc on a shelf, same
//! - 160 / 200: the altar's two disc slots
//! - 270: a chest holding the Brass Gear
//! - 315: a pedestal accepting industrial artifacts of group 2

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec3;
use reliquary_core::{Era, TickClock, Transform};
use reliquary_game::{
    CoreConfig, InputHandler, InspectionEvent, InspectionOutcome, InstanceLedger, Interactable,
    InteractionCore, InventoryEvent, ItemCatalog, ItemId, ItemMatcher, ObjectId, PedestalEvent,
    PuzzleCompleted, TriggerBehavior, WorldObject,
};
use reliquary_physics::{LayerMask, PhysicsWorld};
use tracing::info;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Wall-clock length of one simulated frame
const FRAME_TIME: f32 = 1.0 / 50.0;
/// Distance of props from the player
const PROP_DISTANCE: f32 = 1.6;
const PROP_HALF_EXTENTS: Vec3 = Vec3::splat(0.2);

/// One scripted player action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Press and release a key within one tick
    Key(KeyCode),
    /// Turn to face an absolute bearing in degrees
    Face(f32),
    /// Hold the left mouse button and drag horizontally for some ticks
    Drag { dx: f64, ticks: u32 },
    /// Do nothing for some ticks
    Wait(u32),
}

/// Raw input applied during a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
enum TickInput {
    Key(KeyCode),
    Face(f32),
    Drag(f64),
    Release,
    Idle,
}

/// The full walkthrough of the room
pub fn walkthrough() -> Vec<Step> {
    vec![
        Step::Face(0.0),
        Step::Key(KeyCode::KeyE),
        Step::Drag { dx: 30.0, ticks: 10 },
        Step::Key(KeyCode::KeyF),
        Step::Face(90.0),
        Step::Key(KeyCode::KeyE),
        Step::Key(KeyCode::Backspace),
        Step::Wait(2),
        Step::Key(KeyCode::KeyE),
        Step::Key(KeyCode::KeyF),
        Step::Face(160.0),
        Step::Key(KeyCode::KeyQ),
        Step::Key(KeyCode::KeyE),
        Step::Face(200.0),
        Step::Key(KeyCode::KeyR),
        Step::Key(KeyCode::KeyE),
        Step::Face(270.0),
        Step::Key(KeyCode::KeyE),
        Step::Face(315.0),
        Step::Key(KeyCode::KeyE),
        Step::Wait(1),
        Step::Key(KeyCode::KeyE),
        Step::Key(KeyCode::Tab),
        Step::Drag { dx: -15.0, ticks: 5 },
        Step::Key(KeyCode::KeyF),
    ]
}

/// What the walkthrough achieved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoSummary {
    pub ticks: u64,
    pub puzzles_completed: usize,
    pub pedestal_stage: u32,
    pub inspections: Vec<InspectionOutcome>,
    pub inventory: Vec<String>,
    pub live_instances: usize,
}

/// The demo room and its collaborators
pub struct DemoRoom {
    pub core: InteractionCore,
    pub altar: ObjectId,
    pub pedestal: ObjectId,
    physics: Rc<RefCell<PhysicsWorld>>,
    ledger: Rc<RefCell<InstanceLedger>>,
    completions: Rc<RefCell<Vec<PuzzleCompleted>>>,
    inspections: Rc<RefCell<Vec<InspectionEvent>>>,
}

impl DemoRoom {
    /// Build the room from the catalog
    pub fn build(catalog: &ItemCatalog, config: CoreConfig) -> anyhow::Result<Self> {
        let physics = Rc::new(RefCell::new(PhysicsWorld::new()));
        let ledger = Rc::new(RefCell::new(InstanceLedger::new()));
        let eye_height = config.movement.eye_height;
        let mut core = InteractionCore::new(
            config,
            Some(Box::new(Rc::clone(&physics))),
            Some(Box::new(Rc::clone(&ledger))),
        );

        let sun = catalog.require(ItemId(1))?;
        let moon = catalog.require(ItemId(2))?;
        let gear = catalog.require(ItemId(3))?;

        let mut room = RoomBuilder {
            core: &mut core,
            physics: &physics,
            eye_height,
        };

        room.prop(
            0.0,
            WorldObject::new("table", Transform::default())
                .with_interactable(Interactable::new().with_feedback("pickup"))
                .with_behavior(TriggerBehavior::InspectPickup { item: sun.clone() }),
        );
        room.prop(
            90.0,
            WorldObject::new("shelf", Transform::default())
                .with_interactable(Interactable::new().with_feedback("pickup"))
                .with_behavior(TriggerBehavior::InspectPickup { item: moon.clone() }),
        );

        let altar = room.core.scene.insert(
            WorldObject::new("altar", Transform::from_position(Vec3::new(0.0, 0.0, 1.5)))
                .with_validator(),
        );
        for (bearing, item) in [(160.0, sun.id()), (200.0, moon.id())] {
            let slot = room.prop(
                bearing,
                WorldObject::new(format!("altar slot {}", item), Transform::default())
                    .with_interactable(Interactable::new().with_feedback("stone_click"))
                    .with_behavior(TriggerBehavior::Displayer)
                    .with_matcher(ItemMatcher::exact(item))
                    .with_displayer(),
            );
            room.core.scene.set_parent(slot, altar);
        }

        room.prop(
            270.0,
            WorldObject::new("chest", Transform::default()).with_interactable(
                Interactable::new()
                    .single_use()
                    .granting(gear)
                    .with_feedback("chest_open"),
            ),
        );
        let pedestal = room.prop(
            315.0,
            WorldObject::new("pedestal", Transform::default())
                .with_interactable(Interactable::new().with_feedback("stone_grind"))
                .with_behavior(TriggerBehavior::Pedestal)
                .with_matcher(ItemMatcher::category(Era::Industrial, 2))
                .with_pedestal(),
        );

        info!(
            "Demo room built: {} objects, {} colliders",
            core.scene.len(),
            physics.borrow().collider_count()
        );

        let completions = core.scene.events.puzzle.record();
        let inspections = core.inspection.events.record();
        subscribe_logging(&mut core);

        Ok(Self {
            core,
            altar,
            pedestal,
            physics,
            ledger,
            completions,
            inspections,
        })
    }

    /// Replay a script and summarize the result
    pub fn run(
        &mut self,
        script: &[Step],
        handler: &mut InputHandler,
        clock: &mut TickClock,
    ) -> DemoSummary {
        let mut queue: VecDeque<TickInput> = script.iter().flat_map(|s| expand(*s)).collect();
        handler.set_cursor_captured(true);

        while !queue.is_empty() {
            for _ in 0..clock.advance(FRAME_TIME) {
                let Some(input) = queue.pop_front() else {
                    break;
                };
                self.apply(input, handler);
                self.core.tick(&handler.state);
                handler.end_frame();
            }
        }

        self.summary()
    }

    fn apply(&self, input: TickInput, handler: &mut InputHandler) {
        match input {
            TickInput::Key(key) => {
                handler.handle_keyboard(PhysicalKey::Code(key), ElementState::Pressed);
                handler.handle_keyboard(PhysicalKey::Code(key), ElementState::Released);
            }
            TickInput::Face(bearing) => {
                let player = &self.core.player;
                let per_pixel = player.config.look_sensitivity * handler.mouse_sensitivity;
                let delta = bearing.to_radians() - player.yaw();
                handler.handle_mouse_motion(((delta / per_pixel) as f64, 0.0));
            }
            TickInput::Drag(dx) => {
                handler.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
                handler.handle_mouse_motion((dx, 0.0));
            }
            TickInput::Release => {
                handler.handle_mouse_button(MouseButton::Left, ElementState::Released);
            }
            TickInput::Idle => {}
        }
    }

    pub fn summary(&self) -> DemoSummary {
        let inspections = self
            .inspections
            .borrow()
            .iter()
            .filter_map(|event| match event {
                InspectionEvent::Ended { outcome, .. } => Some(*outcome),
                _ => None,
            })
            .collect();

        DemoSummary {
            ticks: self.core.tick_count(),
            puzzles_completed: self.completions.borrow().len(),
            pedestal_stage: self
                .core
                .scene
                .get(self.pedestal)
                .and_then(|o| o.pedestal.as_ref())
                .map_or(0, |p| p.stage()),
            inspections,
            inventory: self
                .core
                .inventory
                .items()
                .iter()
                .map(|item| item.display_name.clone())
                .collect(),
            live_instances: self.ledger.borrow().live_count(),
        }
    }

    /// Colliders still in the raycast world
    pub fn collider_count(&self) -> usize {
        self.physics.borrow().collider_count()
    }
}

struct RoomBuilder<'a> {
    core: &'a mut InteractionCore,
    physics: &'a Rc<RefCell<PhysicsWorld>>,
    eye_height: f32,
}

impl RoomBuilder<'_> {
    /// Place an object at eye height on a bearing and give it a collider
    fn prop(&mut self, bearing_degrees: f32, mut object: WorldObject) -> ObjectId {
        let (sin, cos) = bearing_degrees.to_radians().sin_cos();
        let position = Vec3::new(sin, 0.0, -cos) * PROP_DISTANCE + Vec3::Y * self.eye_height;
        object.transform = Transform::from_position(position);
        if let Some(displayer) = object.displayer.as_mut() {
            displayer.anchor = object.transform;
        }

        let id = self.core.scene.insert(object);
        self.physics.borrow_mut().insert_box(
            id.0,
            PROP_HALF_EXTENTS,
            &Transform::from_position(position),
            LayerMask::INTERACTABLE,
        );
        id
    }
}

fn expand(step: Step) -> Vec<TickInput> {
    match step {
        Step::Key(key) => vec![TickInput::Key(key)],
        Step::Face(bearing) => vec![TickInput::Face(bearing)],
        Step::Drag { dx, ticks } => {
            let mut inputs = vec![TickInput::Drag(dx); ticks as usize];
            inputs.push(TickInput::Release);
            inputs
        }
        Step::Wait(ticks) => vec![TickInput::Idle; ticks as usize],
    }
}

fn subscribe_logging(core: &mut InteractionCore) {
    core.inventory.events.subscribe(|event| match event {
        InventoryEvent::ItemAdded(item) => info!("Inventory + {}", item),
        InventoryEvent::ItemRemoved(item) => info!("Inventory - {}", item),
        InventoryEvent::SelectionChanged(Some(item)) => info!("Selected {}", item),
        InventoryEvent::SelectionChanged(None) => info!("Selection cleared"),
    });
    core.scene.events.interaction.subscribe(|event| {
        info!(
            "Interacted with {:?} (cue: {})",
            event.object,
            event.feedback.as_deref().unwrap_or("none")
        );
    });
    core.scene.events.display.subscribe(|event| info!("Display: {:?}", event));
    core.scene.events.pedestal.subscribe(|event| match event {
        PedestalEvent::ArtifactPlaced { item, .. } => info!("{} placed on the pedestal", item),
        PedestalEvent::Activated { stage, .. } => info!("Pedestal stage {}", stage),
    });
    core.scene
        .events
        .puzzle
        .subscribe(|event| info!("Puzzle {:?} complete", event.validator));
    core.inspection.events.subscribe(|event| match event {
        InspectionEvent::Started { item, .. } => info!("Inspecting {}", item),
        InspectionEvent::ItemAddedToInventory { item } => info!("Took {}", item),
        InspectionEvent::Ended { outcome, .. } => info!("Inspection ended: {:?}", outcome),
    });
    core.targeting
        .events
        .subscribe(|event| tracing::debug!("Crosshair {:?} on {:?}", event.reticle, event.target));
}

#[cfg(test)]
mod tests {
    use super::*;
    use reliquary_game::PlayerControl;

    const CATALOG: &str = include_str!("../assets/items.toml");

    fn room() -> DemoRoom {
        let catalog = ItemCatalog::from_toml_str(CATALOG).unwrap();
        DemoRoom::build(&catalog, CoreConfig::default()).unwrap()
    }

    #[test]
    fn test_walkthrough_solves_the_room() {
        let mut room = room();
        let mut handler = InputHandler::new();
        let mut clock = TickClock::default();

        let summary = room.run(&walkthrough(), &mut handler, &mut clock);

        assert_eq!(summary.puzzles_completed, 1);
        assert_eq!(summary.pedestal_stage, 1);
        assert_eq!(
            summary.inspections,
            vec![
                InspectionOutcome::AddedToInventory,
                InspectionOutcome::Cancelled,
                InspectionOutcome::AddedToInventory,
                InspectionOutcome::ClosedFromInventory,
            ]
        );
        assert_eq!(summary.inventory, vec!["Sun Disc", "Moon Disc"]);
        // Two discs remain on display
        assert_eq!(summary.live_instances, 2);
        assert!(room.core.player.movement_enabled());
        assert!(!room.core.inspection.is_active());
    }

    #[test]
    fn test_collected_pickups_leave_the_physics_world() {
        let mut room = room();
        assert_eq!(room.collider_count(), 6);
        room.run(&walkthrough()[..10], &mut InputHandler::new(), &mut TickClock::default());
        assert_eq!(room.collider_count(), 4);
    }

    #[test]
    fn test_wrong_disc_is_rejected() {
        let mut room = room();
        let script = [
            Step::Face(0.0),
            Step::Key(KeyCode::KeyE),
            Step::Key(KeyCode::KeyF),
            Step::Face(200.0),
            Step::Key(KeyCode::KeyE),
        ];
        let summary = room.run(&script, &mut InputHandler::new(), &mut TickClock::default());

        assert_eq!(summary.live_instances, 0);
        assert_eq!(summary.puzzles_completed, 0);
        assert!(room.core.scene.recheck_puzzle(room.altar).is_none());
    }

    #[test]
    fn test_expand_drag() {
        assert_eq!(
            expand(Step::Drag { dx: 1.0, ticks: 2 }),
            vec![TickInput::Drag(1.0), TickInput::Drag(1.0), TickInput::Release]
        );
    }
}
