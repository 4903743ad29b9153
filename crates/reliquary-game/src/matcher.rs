//! Item matching against a validation slot's requirement
//!
//! A matcher compares the inventory's selected item with what its slot
//! wants. A successful comparison latches: later comparisons with a wrong
//! or missing item leave it satisfied until [`ItemMatcher::reset`] is
//! called by whoever observes the slot being cleared.

use reliquary_core::Era;
use tracing::debug;

use crate::item::{Item, ItemHandle, ItemId};

/// What a slot accepts
#[derive(Debug, Clone, PartialEq)]
pub enum MatchRequirement {
    /// Exactly this item
    Exact(ItemId),
    /// Any item of this era and puzzle group, optionally narrowed to one
    /// expected item once era and group agree
    Category {
        era: Era,
        group: i32,
        expected: Option<ItemId>,
    },
}

/// Latched comparison of the selected item against a requirement
#[derive(Debug, Clone)]
pub struct ItemMatcher {
    requirement: MatchRequirement,
    last_check_satisfied: bool,
}

impl ItemMatcher {
    pub fn new(requirement: MatchRequirement) -> Self {
        Self {
            requirement,
            last_check_satisfied: false,
        }
    }

    /// Accept only the given item
    pub fn exact(item: ItemId) -> Self {
        Self::new(MatchRequirement::Exact(item))
    }

    /// Accept any item of an era and puzzle group
    pub fn category(era: Era, group: i32) -> Self {
        Self::new(MatchRequirement::Category {
            era,
            group,
            expected: None,
        })
    }

    pub fn requirement(&self) -> &MatchRequirement {
        &self.requirement
    }

    pub fn accepts_category_only(&self) -> bool {
        matches!(self.requirement, MatchRequirement::Category { .. })
    }

    /// Result of the last satisfied check, held until reset
    pub fn is_satisfied(&self) -> bool {
        self.last_check_satisfied
    }

    /// Compare the selected item and latch on success. Returns the latched
    /// state; an absent selection changes nothing.
    pub fn evaluate(&mut self, selected: Option<&ItemHandle>) -> bool {
        let Some(item) = selected else {
            return self.last_check_satisfied;
        };

        let matched = match &self.requirement {
            MatchRequirement::Exact(id) => item.id == *id,
            MatchRequirement::Category {
                era,
                group,
                expected,
            } => {
                if item.era != *era {
                    false
                } else if item.puzzle_group != *group {
                    debug!(
                        "{} is the right category, wrong group ({} != {})",
                        item, item.puzzle_group, group
                    );
                    false
                } else {
                    expected.map_or(true, |id| id == item.id)
                }
            }
        };

        if matched {
            self.last_check_satisfied = true;
        }
        self.last_check_satisfied
    }

    /// Clear the latch; called when the slot is observed empty
    pub fn reset(&mut self) {
        self.last_check_satisfied = false;
    }

    /// Whether aiming at this slot with `selected` should be allowed. Only
    /// the requirement is consulted, not the latch.
    pub fn would_accept(&self, selected: &Item) -> bool {
        match &self.requirement {
            MatchRequirement::Category { era, group, .. } => {
                selected.era == *era && selected.puzzle_group == *group
            }
            MatchRequirement::Exact(id) => selected.id == *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::test_items::artifact;

    #[test]
    fn test_exact_match_latches() {
        let mut matcher = ItemMatcher::exact(ItemId(1));
        let right = artifact(1, Era::Ancient, 0);
        let wrong = artifact(2, Era::Ancient, 0);

        assert!(!matcher.evaluate(Some(&wrong)));
        assert!(matcher.evaluate(Some(&right)));
        assert!(matcher.evaluate(Some(&wrong)));
        assert!(matcher.evaluate(None));
        assert!(matcher.is_satisfied());
    }

    #[test]
    fn test_absent_selection_changes_nothing() {
        let mut matcher = ItemMatcher::exact(ItemId(1));
        assert!(!matcher.evaluate(None));
        assert!(!matcher.is_satisfied());
    }

    #[test]
    fn test_category_requires_group() {
        let mut matcher = ItemMatcher::category(Era::Medieval, 3);
        assert!(matcher.accepts_category_only());

        assert!(!matcher.evaluate(Some(&artifact(7, Era::Medieval, 4))));
        assert!(!matcher.is_satisfied());

        assert!(matcher.evaluate(Some(&artifact(7, Era::Medieval, 3))));
        assert!(matcher.is_satisfied());
    }

    #[test]
    fn test_category_wrong_era() {
        let mut matcher = ItemMatcher::category(Era::Medieval, 3);
        assert!(!matcher.evaluate(Some(&artifact(7, Era::Ancient, 3))));
    }

    #[test]
    fn test_category_with_expected_item() {
        let mut matcher = ItemMatcher::new(MatchRequirement::Category {
            era: Era::Medieval,
            group: 3,
            expected: Some(ItemId(8)),
        });
        assert!(!matcher.evaluate(Some(&artifact(7, Era::Medieval, 3))));
        assert!(matcher.evaluate(Some(&artifact(8, Era::Medieval, 3))));
    }

    #[test]
    fn test_reset_clears_latch() {
        let mut matcher = ItemMatcher::exact(ItemId(1));
        matcher.evaluate(Some(&artifact(1, Era::Ancient, 0)));
        matcher.reset();
        assert!(!matcher.is_satisfied());
        assert!(!matcher.evaluate(Some(&artifact(2, Era::Ancient, 0))));
    }

    #[test]
    fn test_would_accept_ignores_expected() {
        let matcher = ItemMatcher::new(MatchRequirement::Category {
            era: Era::Future,
            group: 1,
            expected: Some(ItemId(8)),
        });
        assert!(matcher.would_accept(&artifact(3, Era::Future, 1)));
        assert!(!matcher.would_accept(&artifact(3, Era::Future, 2)));
    }
}
