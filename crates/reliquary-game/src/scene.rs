//! Scene object store
//!
//! Every world object the core cares about lives here, keyed by
//! [`ObjectId`]. Capabilities are attached by composition: an object may
//! carry any mix of interactable, trigger behavior, matcher, displayer,
//! pedestal, validator and completion flag. Parent/child links let a
//! validator find the slots it aggregates.

use std::collections::BTreeMap;

use reliquary_core::Transform;
use tracing::{debug, info, warn};

use crate::displayer::{DisplayEvent, ItemDisplayer};
use crate::events::EventChannel;
use crate::interactable::{Interactable, InteractionTriggered, TriggerBehavior};
use crate::item::ItemHandle;
use crate::matcher::ItemMatcher;
use crate::pedestal::{Pedestal, PedestalEvent};
use crate::presentation::PresentationSpawner;
use crate::validator::{PuzzleCompleted, PuzzleValidator, ValidatorTally};

/// Identifier of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// A world object and its attached capabilities
#[derive(Debug, Clone)]
pub struct WorldObject {
    pub name: String,
    pub transform: Transform,
    pub interactable: Option<Interactable>,
    pub behavior: Option<TriggerBehavior>,
    pub matcher: Option<ItemMatcher>,
    pub displayer: Option<ItemDisplayer>,
    pub pedestal: Option<Pedestal>,
    pub validator: Option<PuzzleValidator>,
    /// Solved flag driven by puzzle logic outside the core
    pub completion: Option<bool>,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
}

impl WorldObject {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            interactable: None,
            behavior: None,
            matcher: None,
            displayer: None,
            pedestal: None,
            validator: None,
            completion: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_interactable(mut self, interactable: Interactable) -> Self {
        self.interactable = Some(interactable);
        self
    }

    pub fn with_behavior(mut self, behavior: TriggerBehavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn with_matcher(mut self, matcher: ItemMatcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Attach a displayer anchored at the object's own transform
    pub fn with_displayer(mut self) -> Self {
        self.displayer = Some(ItemDisplayer::new(self.transform));
        self
    }

    pub fn with_pedestal(mut self) -> Self {
        self.pedestal = Some(Pedestal::new());
        self
    }

    pub fn with_validator(mut self) -> Self {
        self.validator = Some(PuzzleValidator::new());
        self
    }

    pub fn with_completion_flag(mut self) -> Self {
        self.completion = Some(false);
        self
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// Satisfaction signal this object feeds its parent validator, if any.
    /// A matcher takes precedence over a completion flag.
    pub fn completion_signal(&self) -> Option<bool> {
        match (&self.matcher, self.completion) {
            (Some(matcher), _) => Some(matcher.is_satisfied()),
            (None, flag) => flag,
        }
    }
}

/// Event channels of scene-owned components
#[derive(Debug, Default)]
pub struct SceneEvents {
    pub interaction: EventChannel<InteractionTriggered>,
    pub display: EventChannel<DisplayEvent>,
    pub pedestal: EventChannel<PedestalEvent>,
    pub puzzle: EventChannel<PuzzleCompleted>,
    pub removed: EventChannel<ObjectId>,
}

/// All scene objects
#[derive(Debug, Default)]
pub struct Scene {
    objects: BTreeMap<ObjectId, WorldObject>,
    next_id: u64,
    pub events: SceneEvents,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return its id
    pub fn insert(&mut self, object: WorldObject) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        debug!("Scene object {:?} '{}' added", id, object.name);
        self.objects.insert(id, object);
        id
    }

    /// Make `child` a direct child of `parent`, detaching it from any
    /// previous parent. Returns `false` if either id is unknown or the
    /// link would make an object its own ancestor.
    pub fn set_parent(&mut self, child: ObjectId, parent: ObjectId) -> bool {
        if !self.objects.contains_key(&child) || !self.objects.contains_key(&parent) {
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            return false;
        }

        self.detach(child);
        if let Some(object) = self.objects.get_mut(&child) {
            object.parent = Some(parent);
        }
        if let Some(object) = self.objects.get_mut(&parent) {
            object.children.push(child);
        }
        true
    }

    pub fn get(&self, id: ObjectId) -> Option<&WorldObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut WorldObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate objects in id order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &WorldObject)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    /// An object followed by all of its descendants
    pub fn subtree(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut ids = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(object) = self.objects.get(&next) {
                ids.push(next);
                pending.extend(object.children.iter().copied());
            }
        }
        ids
    }

    /// Remove an object and its descendants. Raises `removed` for each.
    pub fn despawn(&mut self, id: ObjectId) -> Option<WorldObject> {
        if !self.objects.contains_key(&id) {
            return None;
        }
        self.detach(id);

        let mut pending = vec![id];
        let mut root = None;
        while let Some(next) = pending.pop() {
            if let Some(object) = self.objects.remove(&next) {
                pending.extend(object.children.iter().copied());
                self.events.removed.emit(&next);
                if next == id {
                    root = Some(object);
                }
            }
        }
        debug!("Scene object {:?} removed", id);
        root
    }

    /// Parent of `id` when that parent carries a validator
    pub fn validator_of(&self, id: ObjectId) -> Option<ObjectId> {
        let parent = self.objects.get(&id)?.parent?;
        self.objects
            .get(&parent)?
            .validator
            .as_ref()
            .map(|_| parent)
    }

    /// Set the externally driven completion flag of an object
    pub fn set_completion(&mut self, id: ObjectId, solved: bool) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.completion = Some(solved);
                true
            }
            None => false,
        }
    }

    /// Fire an object's interactable
    pub fn trigger(&mut self, id: ObjectId) -> Option<InteractionTriggered> {
        let interactable = self.objects.get_mut(&id)?.interactable.as_mut()?;
        interactable.trigger(id, &mut self.events.interaction)
    }

    /// Show the selected item on an object's displayer
    pub fn display_selected(
        &mut self,
        id: ObjectId,
        selected: Option<&ItemHandle>,
        spawner: &mut dyn PresentationSpawner,
    ) -> bool {
        match self.objects.get_mut(&id).and_then(|o| o.displayer.as_mut()) {
            Some(displayer) => displayer.display(id, selected, spawner, &mut self.events.display),
            None => false,
        }
    }

    /// Take back or query an object's displayer
    pub fn take_displayed(
        &mut self,
        id: ObjectId,
        spawner: &mut dyn PresentationSpawner,
    ) -> Option<DisplayEvent> {
        let displayer = self.objects.get_mut(&id)?.displayer.as_mut()?;
        Some(displayer.take_or_query(id, spawner, &mut self.events.display))
    }

    /// Put an artifact on an object's empty pedestal
    pub fn place_artifact(&mut self, id: ObjectId, item: ItemHandle) -> bool {
        let Some(pedestal) = self.objects.get_mut(&id).and_then(|o| o.pedestal.as_mut()) else {
            return false;
        };
        if !pedestal.place(item.clone()) {
            return false;
        }
        info!("{} placed on pedestal {:?}", item, id);
        self.events
            .pedestal
            .emit(&PedestalEvent::ArtifactPlaced { pedestal: id, item });
        true
    }

    /// Advance an occupied pedestal to its next stage
    pub fn activate_pedestal(&mut self, id: ObjectId) -> Option<u32> {
        let stage = self.objects.get_mut(&id)?.pedestal.as_mut()?.activate()?;
        debug!("Pedestal {:?} stage {}", id, stage);
        self.events
            .pedestal
            .emit(&PedestalEvent::Activated { pedestal: id, stage });
        Some(stage)
    }

    /// Recount a validator's children and report completion.
    ///
    /// When every counted child is satisfied, all direct children's
    /// interactables are disabled and `PuzzleCompleted` is raised. Returns
    /// `None` for unknown objects, objects without a validator, and
    /// incomplete puzzles.
    pub fn recheck_puzzle(&mut self, id: ObjectId) -> Option<PuzzleCompleted> {
        let object = self.objects.get(&id)?;
        object.validator.as_ref()?;
        let children = object.children.clone();

        let tally = ValidatorTally::count(
            children
                .iter()
                .filter_map(|child| self.objects.get(child))
                .filter_map(WorldObject::completion_signal),
        );

        if tally.total == 0 {
            let first = self
                .objects
                .get_mut(&id)
                .and_then(|o| o.validator.as_mut())
                .map_or(false, PuzzleValidator::note_empty);
            if first {
                warn!("Validator {:?} has no matcher or completion children", id);
            }
            return None;
        }

        if !tally.is_complete() {
            debug!(
                "Validator {:?}: {}/{} satisfied",
                id, tally.satisfied, tally.total
            );
            return None;
        }

        for child in &children {
            if let Some(interactable) = self
                .objects
                .get_mut(child)
                .and_then(|o| o.interactable.as_mut())
            {
                interactable.set_can_interact(false);
            }
        }
        if let Some(validator) = self.objects.get_mut(&id).and_then(|o| o.validator.as_mut()) {
            validator.record_completion();
        }

        let event = PuzzleCompleted {
            validator: id,
            satisfied: tally.satisfied,
        };
        info!("Puzzle {:?} completed", id);
        self.events.puzzle.emit(&event);
        Some(event)
    }

    fn detach(&mut self, child: ObjectId) {
        let Some(parent) = self.objects.get_mut(&child).and_then(|o| o.parent.take()) else {
            return;
        };
        if let Some(object) = self.objects.get_mut(&parent) {
            object.children.retain(|c| *c != child);
        }
    }

    fn is_ancestor_or_self(&self, ancestor: ObjectId, mut id: ObjectId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.objects.get(&id).and_then(|o| o.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }
}
