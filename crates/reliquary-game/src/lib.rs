//! Reliquary Game - interaction, inventory and inspection core
//!
//! Decides what the player is aiming at, whether it can be used, and how
//! the single selected inventory item moves between the world, display
//! slots, pedestals and the inspection view. Puzzle validators aggregate
//! slot matchers and completion flags into puzzle completion events.

pub mod catalog;
pub mod config;
pub mod displayer;
pub mod driver;
pub mod events;
pub mod input;
pub mod inspection;
pub mod interactable;
pub mod inventory;
pub mod item;
pub mod matcher;
pub mod pedestal;
pub mod player;
pub mod presentation;
pub mod scene;
pub mod targeting;
pub mod validator;

pub use catalog::{CatalogError, ItemCatalog};
pub use config::{ConfigError, CoreConfig};
pub use displayer::{DisplayEvent, ItemDisplayer};
pub use driver::{InteractionCore, TickReport};
pub use events::{EventChannel, SubscriptionId};
pub use input::{
    InputAction, InputBinding, InputBindings, InputHandler, InputRoute, InputState, RoutedInput,
};
pub use inspection::{
    InspectionConfig, InspectionContext, InspectionEvent, InspectionOutcome, InspectionSession,
    InspectionSource,
};
pub use interactable::{Interactable, InteractionTriggered, TriggerBehavior};
pub use inventory::{Inventory, InventoryEvent, SelectionDirection};
pub use item::{DisplayOffset, Item, ItemHandle, ItemId};
pub use matcher::{ItemMatcher, MatchRequirement};
pub use pedestal::{Pedestal, PedestalEvent};
pub use player::{MovementConfig, PlayerControl, PlayerController};
pub use presentation::{InstanceHandle, InstanceLedger, LedgerEntry, PresentationSpawner};
pub use scene::{ObjectId, Scene, SceneEvents, WorldObject};
pub use targeting::{
    InteractionTargeting, Raycaster, Reticle, TargetChanged, TargetingConfig, TargetingReport,
};
pub use validator::{PuzzleCompleted, PuzzleValidator, ValidatorTally};
