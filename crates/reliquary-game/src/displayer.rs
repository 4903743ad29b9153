//! Item displayer slots
//!
//! A displayer shows a copy of the selected inventory item at its anchor.
//! The item stays in the inventory; the slot only owns the presentation
//! instance. A slot holds at most one item.

use reliquary_core::Transform;
use tracing::debug;

use crate::events::EventChannel;
use crate::item::ItemHandle;
use crate::presentation::{InstanceHandle, PresentationSpawner};
use crate::scene::ObjectId;

/// Notifications raised by displayer slots
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    ItemDisplayed { slot: ObjectId, item: ItemHandle },
    ItemTaken { slot: ObjectId, item: ItemHandle },
    /// The slot was queried while empty. Nothing changed.
    NoItemDisplayed { slot: ObjectId },
}

/// Exclusive single-item display slot
#[derive(Debug, Clone)]
pub struct ItemDisplayer {
    /// World-space anchor the item offset is applied to
    pub anchor: Transform,
    displayed: Option<(ItemHandle, InstanceHandle)>,
}

impl ItemDisplayer {
    pub fn new(anchor: Transform) -> Self {
        Self {
            anchor,
            displayed: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.displayed.is_some()
    }

    pub fn displayed_item(&self) -> Option<&ItemHandle> {
        self.displayed.as_ref().map(|(item, _)| item)
    }

    /// Show the selected item. No-op if the slot is occupied or nothing is
    /// selected.
    pub fn display(
        &mut self,
        slot: ObjectId,
        selected: Option<&ItemHandle>,
        spawner: &mut dyn PresentationSpawner,
        events: &mut EventChannel<DisplayEvent>,
    ) -> bool {
        if self.is_occupied() {
            return false;
        }
        let Some(item) = selected else {
            return false;
        };

        let transform = self.anchor.compose(&item.display_offset.to_transform());
        let instance = spawner.spawn(item, transform);
        self.displayed = Some((item.clone(), instance));

        debug!("Slot {:?} displays {}", slot, item);
        events.emit(&DisplayEvent::ItemDisplayed {
            slot,
            item: item.clone(),
        });
        true
    }

    /// Take the displayed item back, or report that the slot is empty
    pub fn take_or_query(
        &mut self,
        slot: ObjectId,
        spawner: &mut dyn PresentationSpawner,
        events: &mut EventChannel<DisplayEvent>,
    ) -> DisplayEvent {
        let event = match self.displayed.take() {
            Some((item, instance)) => {
                spawner.despawn(instance);
                debug!("Slot {:?} cleared of {}", slot, item);
                DisplayEvent::ItemTaken { slot, item }
            }
            None => DisplayEvent::NoItemDisplayed { slot },
        };
        events.emit(&event);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::test_items::artifact;
    use crate::presentation::InstanceLedger;
    use glam::Vec3;
    use reliquary_core::Era;

    const SLOT: ObjectId = ObjectId(10);

    #[test]
    fn test_display_then_take() {
        let mut ledger = InstanceLedger::new();
        let mut events = EventChannel::new();
        let log = events.record();
        let mut slot = ItemDisplayer::new(Transform::from_position(Vec3::new(1.0, 1.0, 0.0)));
        let idol = artifact(1, Era::Ancient, 2);

        assert!(slot.display(SLOT, Some(&idol), &mut ledger, &mut events));
        assert!(slot.is_occupied());
        assert_eq!(ledger.live_count(), 1);

        let taken = slot.take_or_query(SLOT, &mut ledger, &mut events);
        assert_eq!(taken, DisplayEvent::ItemTaken { slot: SLOT, item: idol.clone() });
        assert!(!slot.is_occupied());
        assert_eq!(ledger.live_count(), 0);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_display_is_exclusive() {
        let mut ledger = InstanceLedger::new();
        let mut events = EventChannel::new();
        let mut slot = ItemDisplayer::new(Transform::default());
        let first = artifact(1, Era::Ancient, 2);
        let second = artifact(2, Era::Ancient, 2);

        assert!(slot.display(SLOT, Some(&first), &mut ledger, &mut events));
        assert!(!slot.display(SLOT, Some(&second), &mut ledger, &mut events));
        assert_eq!(slot.displayed_item(), Some(&first));
        assert_eq!(ledger.spawned_total(), 1);
    }

    #[test]
    fn test_display_without_selection() {
        let mut ledger = InstanceLedger::new();
        let mut events = EventChannel::new();
        let mut slot = ItemDisplayer::new(Transform::default());
        assert!(!slot.display(SLOT, None, &mut ledger, &mut events));
        assert!(!slot.is_occupied());
    }

    #[test]
    fn test_query_empty_slot() {
        let mut ledger = InstanceLedger::new();
        let mut events = EventChannel::new();
        let log = events.record();
        let mut slot = ItemDisplayer::new(Transform::default());

        let event = slot.take_or_query(SLOT, &mut ledger, &mut events);
        assert_eq!(event, DisplayEvent::NoItemDisplayed { slot: SLOT });
        assert_eq!(*log.borrow(), vec![DisplayEvent::NoItemDisplayed { slot: SLOT }]);
    }
}
