//! Multistage pedestals
//!
//! The first successful trigger places the selected artifact on the
//! pedestal and consumes it from the inventory. Once an artifact sits on
//! it, every further trigger activates the next stage.

use crate::item::ItemHandle;
use crate::scene::ObjectId;

/// Notifications raised by pedestals
#[derive(Debug, Clone, PartialEq)]
pub enum PedestalEvent {
    ArtifactPlaced { pedestal: ObjectId, item: ItemHandle },
    /// `stage` counts activations since placement, starting at 1
    Activated { pedestal: ObjectId, stage: u32 },
}

#[derive(Debug, Clone, Default)]
pub struct Pedestal {
    placed: Option<ItemHandle>,
    stage: u32,
}

impl Pedestal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an artifact has been placed
    pub fn is_occupied(&self) -> bool {
        self.placed.is_some()
    }

    pub fn placed(&self) -> Option<&ItemHandle> {
        self.placed.as_ref()
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    /// Put an artifact on an empty pedestal. Returns `false` when occupied.
    pub fn place(&mut self, item: ItemHandle) -> bool {
        if self.placed.is_some() {
            return false;
        }
        self.placed = Some(item);
        true
    }

    /// Advance to the next stage; only meaningful once occupied
    pub fn activate(&mut self) -> Option<u32> {
        self.placed.as_ref()?;
        self.stage += 1;
        Some(self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::test_items::artifact;
    use reliquary_core::Era;

    #[test]
    fn test_place_then_activate() {
        let mut pedestal = Pedestal::new();
        assert_eq!(pedestal.activate(), None);

        assert!(pedestal.place(artifact(1, Era::Ancient, 0)));
        assert!(!pedestal.place(artifact(2, Era::Ancient, 0)));
        assert_eq!(pedestal.placed().map(|i| i.id()), Some(crate::item::ItemId(1)));

        assert_eq!(pedestal.activate(), Some(1));
        assert_eq!(pedestal.activate(), Some(2));
        assert_eq!(pedestal.stage(), 2);
    }
}
