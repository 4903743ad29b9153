//! Puzzle validation over child completion signals
//!
//! A validator sits on a parent object. On every recheck it recounts its
//! direct children from scratch; a child counts when it carries a matcher
//! or an externally driven completion flag. When every counted child is
//! satisfied the puzzle is complete.
//!
//! Recheck does not remember a previous completion. Calling it again while
//! the condition still holds reports completion again, and suppressing that
//! is left to the caller.

use crate::scene::ObjectId;

/// Raised when a recheck finds every counted child satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleCompleted {
    pub validator: ObjectId,
    pub satisfied: usize,
}

/// Result of counting a validator's children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidatorTally {
    pub satisfied: usize,
    pub total: usize,
}

impl ValidatorTally {
    /// Count per-child satisfaction signals
    pub fn count(signals: impl IntoIterator<Item = bool>) -> Self {
        signals.into_iter().fold(Self::default(), |mut tally, ok| {
            tally.total += 1;
            if ok {
                tally.satisfied += 1;
            }
            tally
        })
    }

    /// A validator with nothing to count never completes
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.satisfied == self.total
    }
}

/// Validator capability of a parent object
#[derive(Debug, Clone, Default)]
pub struct PuzzleValidator {
    completions: u32,
    warned_empty: bool,
}

impl PuzzleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many rechecks have reported completion
    pub fn completions(&self) -> u32 {
        self.completions
    }

    pub(crate) fn record_completion(&mut self) {
        self.completions += 1;
    }

    /// Returns `true` the first time an empty tally is seen, so the
    /// misconfiguration is reported once
    pub(crate) fn note_empty(&mut self) -> bool {
        !std::mem::replace(&mut self.warned_empty, true)
    }
}
