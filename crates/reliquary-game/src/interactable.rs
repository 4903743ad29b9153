//! Interactable capability and per-object trigger behaviors
//!
//! Whether an object *can* be triggered lives in [`Interactable`]; what
//! happens afterwards is chosen by its [`TriggerBehavior`]. The two are
//! attached to a scene object independently.

use tracing::debug;

use crate::events::EventChannel;
use crate::item::ItemHandle;
use crate::scene::ObjectId;

/// Raised every time an interactable fires
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionTriggered {
    pub object: ObjectId,
    /// Item handed to the player directly by this trigger
    pub granted: Option<ItemHandle>,
    /// Sound/animation cue for presentation collaborators
    pub feedback: Option<String>,
}

/// Trigger capability of a world object
#[derive(Debug, Clone)]
pub struct Interactable {
    can_interact: bool,
    single_use: bool,
    grants_item: Option<ItemHandle>,
    feedback: Option<String>,
}

impl Default for Interactable {
    fn default() -> Self {
        Self::new()
    }
}

impl Interactable {
    /// An enabled, reusable interactable
    pub fn new() -> Self {
        Self {
            can_interact: true,
            single_use: false,
            grants_item: None,
            feedback: None,
        }
    }

    /// Disable permanently after the first successful trigger
    pub fn single_use(mut self) -> Self {
        self.single_use = true;
        self
    }

    /// Hand this item to the player when triggered
    pub fn granting(mut self, item: ItemHandle) -> Self {
        self.grants_item = Some(item);
        self
    }

    /// Cue id carried on the trigger event
    pub fn with_feedback(mut self, cue: impl Into<String>) -> Self {
        self.feedback = Some(cue.into());
        self
    }

    pub fn can_interact(&self) -> bool {
        self.can_interact
    }

    pub fn set_can_interact(&mut self, can_interact: bool) {
        self.can_interact = can_interact;
    }

    pub fn is_single_use(&self) -> bool {
        self.single_use
    }

    pub fn grants_item(&self) -> Option<&ItemHandle> {
        self.grants_item.as_ref()
    }

    /// Fire the interaction. A disabled interactable does nothing.
    ///
    /// Subscribers observe the pre-trigger state: a single-use interactable
    /// is only disabled after the event has been delivered.
    pub fn trigger(
        &mut self,
        object: ObjectId,
        events: &mut EventChannel<InteractionTriggered>,
    ) -> Option<InteractionTriggered> {
        if !self.can_interact {
            return None;
        }

        let event = InteractionTriggered {
            object,
            granted: self.grants_item.clone(),
            feedback: self.feedback.clone(),
        };
        debug!("Interaction triggered on {:?}", object);
        events.emit(&event);

        if self.single_use {
            self.can_interact = false;
        }
        Some(event)
    }
}

/// What a triggered object does
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerBehavior {
    /// Puzzle-specific logic elsewhere listens for the trigger and the tag
    Notify { tag: String },
    /// A world artifact picked up by inspecting it
    InspectPickup { item: ItemHandle },
    /// Show the selected item on this object's displayer, or take it back
    Displayer,
    /// Place an artifact on this object's pedestal, then activate it
    Pedestal,
}
