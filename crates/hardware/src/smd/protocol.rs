//! SMD coordination protocol: mode selection and the controller's belief
//! state about chip-autonomous maintenance.

use std::collections::HashMap;

use serde::Deserialize;

/// Which SMD coordination protocol a rank uses. Exactly one applies per
/// rank; mixing modes within a rank is a configuration error the caller
/// must reject before construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmdMode {
    /// The controller issues a `PRE_RSQ`/`RSQ` before trusting a bank is
    /// idle, learning about in-progress maintenance from the response.
    #[default]
    Rsq,
    /// A chip asserts an out-of-band alert when it starts maintenance; the
    /// controller treats the affected subarray as busy until it clears.
    Alert,
    /// A chip NACKs an ACT outright if it's mid-maintenance on that row;
    /// the controller must retry the request later.
    ActNack,
}

/// The result SMD coordination attaches to an ACT attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmdOutcome {
    /// Every chip accepted the ACT; the row is open rank-wide.
    Acked,
    /// Every chip NACK'd; the bank closes everywhere and the request retries.
    Nacked,
    /// Some chips NACK'd, some accepted; the bank is open on a strict
    /// subset of chips ([`crate::spec::State::PartiallyOpened`]).
    PartialNacked,
}

/// The controller's belief about which (bank, subarray) pairs are currently
/// under chip-autonomous maintenance, keyed by the bank's global id and the
/// subarray id within it.
///
/// This is populated differently per [`SmdMode`]: RSQ learns it from a
/// query response, Alert learns it from an asynchronous signal, ActNack
/// learns it only after a failed ACT (no advance warning).
#[derive(Debug, Clone, Default)]
pub struct SmdTracker {
    mode: SmdMode,
    busy_until: HashMap<(u32, u32), u64>,
}

impl SmdTracker {
    /// Builds a tracker for the given protocol mode.
    #[must_use]
    pub fn new(mode: SmdMode) -> Self {
        Self {
            mode,
            busy_until: HashMap::new(),
        }
    }

    /// The protocol this tracker is coordinating.
    #[must_use]
    pub const fn mode(&self) -> SmdMode {
        self.mode
    }

    /// Records that `(bank_id, subarray_id)` is under maintenance through
    /// `until_clk`, inclusive.
    pub fn mark_busy(&mut self, bank_id: u32, subarray_id: u32, until_clk: u64) {
        let slot = self.busy_until.entry((bank_id, subarray_id)).or_insert(0);
        *slot = (*slot).max(until_clk);
    }

    /// True if `(bank_id, subarray_id)` is currently believed busy at `clk`.
    #[must_use]
    pub fn is_busy(&self, bank_id: u32, subarray_id: u32, clk: u64) -> bool {
        self.busy_until
            .get(&(bank_id, subarray_id))
            .is_some_and(|&until| clk < until)
    }

    /// Drops entries whose busy window has elapsed, bounding the map's size.
    pub fn clear_expired(&mut self, clk: u64) {
        self.busy_until.retain(|_, &mut until| until > clk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_window_expires_at_its_clock() {
        let mut tracker = SmdTracker::new(SmdMode::Alert);
        tracker.mark_busy(3, 1, 100);
        assert!(tracker.is_busy(3, 1, 50));
        assert!(!tracker.is_busy(3, 1, 100));
        tracker.clear_expired(100);
        assert!(!tracker.is_busy(3, 1, 50));
    }

    #[test]
    fn marking_busy_again_extends_but_never_shrinks_the_window() {
        let mut tracker = SmdTracker::new(SmdMode::Rsq);
        tracker.mark_busy(0, 0, 50);
        tracker.mark_busy(0, 0, 10);
        assert!(tracker.is_busy(0, 0, 49));
    }
}
