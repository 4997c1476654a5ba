//! Per-page navigation bookkeeping.

use tokio::time::Instant;

/// Process-local navigation state of one page instance. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Set once a proceed control was clicked on this page instance.
    pub attempted_advance: bool,
    pub last_advance_at: Option<Instant>,
    /// Set once the optional entry ("apply") control was clicked.
    pub attempted_entry: bool,
}

impl NavigationState {
    /// Record an advance. Returns `false` when one was already recorded for
    /// this page instance, in which case nothing changes.
    pub fn mark_advanced(&mut self, now: Instant) -> bool {
        if self.attempted_advance {
            return false;
        }
        self.attempted_advance = true;
        self.last_advance_at = Some(now);
        true
    }

    /// Record the entry click. Same at-most-once rule as advancing.
    pub fn mark_entered(&mut self) -> bool {
        if self.attempted_entry {
            return false;
        }
        self.attempted_entry = true;
        true
    }

    /// Forget everything; only called on a detected navigation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
