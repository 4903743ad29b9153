//! Held items and the global selection cursor
//!
//! The inventory is the single owner of "which item is selected". Every
//! operation is total: adding a duplicate or removing an absent item is a
//! defined no-op, never an error.

use tracing::debug;

use crate::events::EventChannel;
use crate::item::{ItemHandle, ItemId};

/// Notifications raised by the inventory
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEvent {
    ItemAdded(ItemHandle),
    ItemRemoved(ItemHandle),
    /// The selected item changed identity (`None` when the inventory emptied)
    SelectionChanged(Option<ItemHandle>),
}

/// Direction of a selection-cursor step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDirection {
    Previous,
    Next,
}

impl SelectionDirection {
    fn offset(self) -> isize {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }
}

/// Ordered, duplicate-free collection of held items with one selection
#[derive(Debug, Default)]
pub struct Inventory {
    items: Vec<ItemHandle>,
    /// Always `Some` and in range while `items` is non-empty
    selected: Option<usize>,
    selection_locked: bool,
    pub events: EventChannel<InventoryEvent>,
}

impl Inventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item and select it. Returns `false` if it was already held.
    pub fn add(&mut self, item: ItemHandle) -> bool {
        if self.contains(&item) {
            return false;
        }

        debug!("Inventory add {}", item);
        self.items.push(item.clone());
        self.selected = Some(self.items.len() - 1);
        self.events.emit(&InventoryEvent::ItemAdded(item.clone()));
        self.events
            .emit(&InventoryEvent::SelectionChanged(Some(item)));
        true
    }

    /// Remove an item. Returns `false` if it was not held.
    ///
    /// Removing the selected item selects its predecessor (or the new first
    /// item when it was first); removing anything else keeps the selected
    /// item selected even though its index may shift.
    pub fn remove(&mut self, item: &ItemHandle) -> bool {
        let Some(index) = self.position(item.id()) else {
            return false;
        };

        let previous = self.selected().cloned();
        let removed = self.items.remove(index);

        self.selected = match self.selected {
            _ if self.items.is_empty() => None,
            Some(sel) if sel == index => Some(index.saturating_sub(1)),
            Some(sel) if sel > index => Some(sel - 1),
            other => other,
        };

        debug!("Inventory remove {}", removed);
        self.events.emit(&InventoryEvent::ItemRemoved(removed));

        let current = self.selected().cloned();
        if current != previous {
            self.events.emit(&InventoryEvent::SelectionChanged(current));
        }
        true
    }

    /// Step the selection cursor cyclically. Returns `true` if it moved.
    pub fn advance_selection(&mut self, direction: SelectionDirection) -> bool {
        if self.selection_locked {
            return false;
        }
        let Some(current) = self.selected else {
            return false;
        };

        let len = self.items.len() as isize;
        let next = (current as isize + direction.offset()).rem_euclid(len) as usize;
        if next == current {
            return false;
        }

        self.selected = Some(next);
        let item = self.items[next].clone();
        debug!("Inventory selected {}", item);
        self.events
            .emit(&InventoryEvent::SelectionChanged(Some(item)));
        true
    }

    /// The currently selected item, if any
    pub fn selected(&self) -> Option<&ItemHandle> {
        self.selected.and_then(|i| self.items.get(i))
    }

    /// Index of the selected item, `None` when empty
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Lock or unlock the selection cursor. A locked cursor ignores advance
    /// requests.
    pub fn set_selection_locked(&mut self, locked: bool) {
        self.selection_locked = locked;
    }

    pub fn is_selection_locked(&self) -> bool {
        self.selection_locked
    }

    pub fn contains(&self, item: &ItemHandle) -> bool {
        self.position(item.id()).is_some()
    }

    /// Held items in acquisition order
    pub fn items(&self) -> &[ItemHandle] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|held| held.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::test_items::artifact;
    use reliquary_core::Era;

    fn item(id: u32) -> ItemHandle {
        artifact(id, Era::Medieval, 1)
    }

    fn assert_selection_invariant(inv: &Inventory) {
        match inv.selected_index() {
            Some(i) => assert!(i < inv.len()),
            None => assert!(inv.is_empty()),
        }
    }

    #[test]
    fn test_new_inventory_empty() {
        let inv = Inventory::new();
        assert!(inv.is_empty());
        assert!(inv.selected().is_none());
        assert_eq!(inv.selected_index(), None);
    }

    #[test]
    fn test_add_selects_new_item() {
        let mut inv = Inventory::new();
        let log = inv.events.record();

        assert!(inv.add(item(1)));
        assert_eq!(inv.selected(), Some(&item(1)));
        assert_eq!(
            *log.borrow(),
            vec![
                InventoryEvent::ItemAdded(item(1)),
                InventoryEvent::SelectionChanged(Some(item(1))),
            ]
        );
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut inv = Inventory::new();
        inv.add(item(1));
        inv.add(item(2));
        let log = inv.events.record();

        assert!(!inv.add(item(1)));
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.selected(), Some(&item(2)));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut inv = Inventory::new();
        inv.add(item(1));
        let log = inv.events.record();
        assert!(!inv.remove(&item(9)));
        assert_eq!(inv.len(), 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_add_remove_scenario() {
        let mut inv = Inventory::new();
        inv.add(item(1));
        assert_eq!(inv.selected(), Some(&item(1)));

        inv.add(item(2));
        assert_eq!(inv.selected(), Some(&item(2)));
        assert_eq!(inv.len(), 2);

        let log = inv.events.record();
        inv.remove(&item(1));
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.selected(), Some(&item(2)));
        assert_eq!(inv.selected_index(), Some(0));
        assert_eq!(*log.borrow(), vec![InventoryEvent::ItemRemoved(item(1))]);

        inv.remove(&item(2));
        assert!(inv.is_empty());
        assert_eq!(inv.selected_index(), None);
        assert_eq!(
            log.borrow().last(),
            Some(&InventoryEvent::SelectionChanged(None))
        );
    }

    #[test]
    fn test_remove_selected_selects_predecessor() {
        let mut inv = Inventory::new();
        inv.add(item(1));
        inv.add(item(2));
        inv.add(item(3));
        inv.advance_selection(SelectionDirection::Previous);
        assert_eq!(inv.selected(), Some(&item(2)));

        let log = inv.events.record();
        inv.remove(&item(2));
        assert_eq!(inv.selected(), Some(&item(1)));
        assert_eq!(
            *log.borrow(),
            vec![
                InventoryEvent::ItemRemoved(item(2)),
                InventoryEvent::SelectionChanged(Some(item(1))),
            ]
        );
    }

    #[test]
    fn test_remove_selected_first_clamps_to_zero() {
        let mut inv = Inventory::new();
        inv.add(item(1));
        inv.add(item(2));
        inv.advance_selection(SelectionDirection::Next);
        assert_eq!(inv.selected(), Some(&item(1)));

        inv.remove(&item(1));
        assert_eq!(inv.selected_index(), Some(0));
        assert_eq!(inv.selected(), Some(&item(2)));
    }

    #[test]
    fn test_remove_after_selection_keeps_index() {
        let mut inv = Inventory::new();
        inv.add(item(1));
        inv.add(item(2));
        inv.advance_selection(SelectionDirection::Previous);
        let log = inv.events.record();

        inv.remove(&item(2));
        assert_eq!(inv.selected(), Some(&item(1)));
        assert_eq!(*log.borrow(), vec![InventoryEvent::ItemRemoved(item(2))]);
    }

    #[test]
    fn test_advance_wraps() {
        let mut inv = Inventory::new();
        inv.add(item(1));
        inv.add(item(2));
        inv.add(item(3));

        assert!(inv.advance_selection(SelectionDirection::Next));
        assert_eq!(inv.selected(), Some(&item(1)));
        assert!(inv.advance_selection(SelectionDirection::Previous));
        assert_eq!(inv.selected(), Some(&item(3)));
    }

    #[test]
    fn test_advance_single_item_raises_nothing() {
        let mut inv = Inventory::new();
        inv.add(item(1));
        let log = inv.events.record();

        assert!(!inv.advance_selection(SelectionDirection::Next));
        assert!(!inv.advance_selection(SelectionDirection::Previous));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_advance_empty_is_noop() {
        let mut inv = Inventory::new();
        assert!(!inv.advance_selection(SelectionDirection::Next));
    }

    #[test]
    fn test_locked_selection_ignores_advance() {
        let mut inv = Inventory::new();
        inv.add(item(1));
        inv.add(item(2));
        inv.set_selection_locked(true);

        assert!(!inv.advance_selection(SelectionDirection::Next));
        assert_eq!(inv.selected(), Some(&item(2)));

        inv.set_selection_locked(false);
        assert!(inv.advance_selection(SelectionDirection::Next));
    }

    #[test]
    fn test_invariant_holds_over_mixed_sequence() {
        let mut inv = Inventory::new();
        let ops: [(bool, u32); 14] = [
            (true, 1),
            (true, 2),
            (true, 3),
            (false, 2),
            (true, 4),
            (true, 2),
            (false, 1),
            (false, 9),
            (true, 3),
            (false, 4),
            (false, 3),
            (true, 5),
            (false, 2),
            (false, 5),
        ];
        for (step, (add, id)) in ops.into_iter().enumerate() {
            if add {
                inv.add(item(id));
            } else {
                inv.remove(&item(id));
            }
            if step % 3 == 0 {
                inv.advance_selection(SelectionDirection::Next);
            }
            assert_selection_invariant(&inv);
        }
        assert!(inv.is_empty());
    }
}
