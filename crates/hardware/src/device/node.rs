//! Recursive device-tree node.

use std::collections::HashMap;

use crate::common::addr::{Level, NUM_LEVELS};
use crate::spec::{Command, State, TimingEntry};

use super::history::CommandHistory;

/// One node in the device tree (a channel, rank, bank group, bank, subarray,
/// row, or column). Children form the tree; per the design notes, nodes do
/// not carry a parent back-pointer, since the core logic never needs upward
/// traversal (state changes that affect children are applied explicitly by
/// the [`crate::spec::DeviceSpec::lambda`] traversal).
#[derive(Debug, Clone)]
pub struct DeviceNode {
    level: Level,
    state: State,
    /// Which child index is open, if any (e.g. for a bank, which subarray).
    row_state: HashMap<u32, State>,
    history: CommandHistory,
    children: Vec<DeviceNode>,

    /// Cleared on the first column access after an ACT.
    pub just_opened: bool,
    /// Clock at which this node was last opened (ACT), for row-timeout policy.
    pub open_since_clk: Option<u64>,
    /// Running count of ACTs observed at this node since creation.
    pub cycles_since_last_act: u64,
}

impl DeviceNode {
    /// Builds a tree rooted at `level`, recursively sized from `counts`
    /// (indexed by [`Level::index`]), with every node starting in `start`.
    ///
    /// The tree bottoms out at [`Level::Subarray`]: individual rows and
    /// columns are never materialized as nodes (that would mean millions of
    /// objects per bank). A row's state lives in its subarray's
    /// `row_state` map, keyed by row id; columns carry no simulated state
    /// at all (per the data-model non-goal: addresses and timing only).
    #[must_use]
    pub fn build(level: Level, counts: &[u32; NUM_LEVELS], start: State) -> Self {
        let children = if level == Level::Subarray {
            Vec::new()
        } else {
            level.child().map_or_else(Vec::new, |child_level| {
                let n = counts[child_level.index()];
                (0..n)
                    .map(|_| Self::build(child_level, counts, start))
                    .collect()
            })
        };
        Self {
            level,
            state: start,
            row_state: HashMap::new(),
            history: CommandHistory::default(),
            children,
            just_opened: false,
            open_since_clk: None,
            cycles_since_last_act: 0,
        }
    }

    /// The level this node occupies.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Current state of this node.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Sets this node's state.
    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }

    /// Which child is recorded open (e.g. which subarray of a bank), if any.
    #[must_use]
    pub fn open_child(&self) -> Option<u32> {
        self.row_state
            .iter()
            .find(|(_, s)| matches!(s, State::Opened | State::PartiallyOpened))
            .map(|(id, _)| *id)
    }

    /// State recorded for a given child index.
    #[must_use]
    pub fn child_state(&self, id: u32) -> State {
        self.row_state.get(&id).copied().unwrap_or_default()
    }

    /// Records a child's state (e.g. "subarray 3 is Opened").
    pub fn set_child_state(&mut self, id: u32, state: State) {
        if matches!(state, State::Closed) {
            self.row_state.remove(&id);
        } else {
            self.row_state.insert(id, state);
        }
    }

    /// Clears every child's recorded state (used by PREA).
    pub fn clear_child_states(&mut self) {
        self.row_state.clear();
    }

    /// Immutable reference to the child at `id`, if any.
    #[must_use]
    pub fn child(&self, id: u32) -> Option<&Self> {
        self.children.get(id as usize)
    }

    /// Mutable reference to the child at `id`, if any.
    pub fn child_mut(&mut self, id: u32) -> Option<&mut Self> {
        self.children.get_mut(id as usize)
    }

    /// All children, for maintenance/scheduling code that must iterate a
    /// bank's subarrays or a rank's banks.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Mutable access to all children (e.g. PREA closing every bank of a rank).
    pub fn children_mut(&mut self) -> &mut [Self] {
        &mut self.children
    }

    /// The earliest clock at which `cmd` may be issued at this node.
    #[must_use]
    pub fn earliest_allowed(&self, cmd: Command) -> u64 {
        self.history.earliest_allowed(cmd)
    }

    /// Records that `cmd` was issued at `clk`, applying every timing `entries`
    /// carries at this node's level. Must be called exactly once per command
    /// issue (per level) — passing the full slice for that issue, not once
    /// per entry, since each call pushes one issue-clock onto `cmd`'s history.
    pub fn record_timing(&mut self, cmd: Command, entries: &[TimingEntry], clk: u64) {
        self.history.record(cmd, entries, clk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> [u32; NUM_LEVELS] {
        [1, 1, 1, 2, 2, 4, 8]
    }

    #[test]
    fn build_produces_expected_child_counts() {
        let root = DeviceNode::build(Level::Channel, &counts(), State::Closed);
        assert_eq!(root.children().len(), 1);
        let rank = &root.children()[0];
        assert_eq!(rank.children().len(), 1);
        let bg = &rank.children()[0];
        assert_eq!(bg.children().len(), 2);
        let bank = &bg.children()[0];
        assert_eq!(bank.children().len(), 2);
    }

    #[test]
    fn child_state_round_trips() {
        let mut bank = DeviceNode::build(Level::Bank, &counts(), State::Closed);
        assert_eq!(bank.open_child(), None);
        bank.set_child_state(1, State::Opened);
        assert_eq!(bank.open_child(), Some(1));
        assert_eq!(bank.child_state(1), State::Opened);
        bank.set_child_state(1, State::Closed);
        assert_eq!(bank.open_child(), None);
    }
}
