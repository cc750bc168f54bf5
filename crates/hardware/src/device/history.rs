//! Per-node command timing history.

use std::collections::{HashMap, VecDeque};

use crate::spec::{Command, TimingEntry};

/// Maximum history window kept per command (covers tFAW's `dist = 4`).
const MAX_WINDOW: usize = 4;

/// Tracks, for one [`crate::device::DeviceNode`], the earliest clock at
/// which each command may next be issued, plus a short deque of recent
/// issue clocks per command to support windowed constraints like tFAW.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    earliest_allowed: HashMap<Command, u64>,
    recent_issues: HashMap<Command, VecDeque<u64>>,
}

impl CommandHistory {
    /// The earliest clock at which `cmd` may be issued at this node, `0` if
    /// never constrained.
    #[must_use]
    pub fn earliest_allowed(&self, cmd: Command) -> u64 {
        self.earliest_allowed.get(&cmd).copied().unwrap_or(0)
    }

    /// Records that `cmd` was issued at `clk`, applying every timing entry
    /// `cmd` carries at this level: pushes `cmd`'s own issue history (for
    /// windowed entries) and raises `earliest_allowed[entry.next_cmd]`.
    pub fn record(&mut self, cmd: Command, entries: &[TimingEntry], clk: u64) {
        let issues = self.recent_issues.entry(cmd).or_default();
        issues.push_back(clk);
        while issues.len() > MAX_WINDOW {
            issues.pop_front();
        }
        let issues_snapshot: Vec<u64> = issues.iter().copied().collect();

        for entry in entries {
            let new_earliest = if entry.dist <= 1 {
                clk + entry.val
            } else {
                let window_len = issues_snapshot.len();
                if window_len < entry.dist as usize {
                    0
                } else {
                    issues_snapshot[window_len - entry.dist as usize] + entry.val
                }
            };
            let slot = self.earliest_allowed.entry(entry.next_cmd).or_insert(0);
            *slot = (*slot).max(new_earliest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_entry_sets_next_allowed_clock() {
        let mut hist = CommandHistory::default();
        hist.record(Command::Act, &[TimingEntry::simple(Command::Pre, 20)], 100);
        assert_eq!(hist.earliest_allowed(Command::Pre), 120);
    }

    #[test]
    fn windowed_entry_only_fires_after_enough_history() {
        let mut hist = CommandHistory::default();
        let faw = [TimingEntry::windowed(Command::Act, 4, 30)];
        hist.record(Command::Act, &faw, 0);
        assert_eq!(hist.earliest_allowed(Command::Act), 0);
        hist.record(Command::Act, &faw, 5);
        hist.record(Command::Act, &faw, 10);
        assert_eq!(hist.earliest_allowed(Command::Act), 0);
        hist.record(Command::Act, &faw, 15);
        // fourth ACT recorded at clk=15; window of 4 now full, constraining
        // the fifth ACT to wait until the *first* ACT (clk=0) + 30.
        assert_eq!(hist.earliest_allowed(Command::Act), 30);
    }
}
