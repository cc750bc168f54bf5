//! Row-buffer management policy: whether a RD/WR auto-precharges.

use crate::request::{Request, RequestQueues};
use crate::spec::Command;

/// How long a row stays open after the access that opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPolicy {
    /// Keep every row open until something else needs the bank
    /// ("open-page"): never auto-precharge.
    Opened,
    /// Auto-precharge every column access immediately ("closed-page"):
    /// maximizes row-conflict avoidance for streaming/random traffic.
    Closed,
    /// Keep a row open, but auto-precharge if no further access to it
    /// arrives within `idle_cycles` of the last one.
    Timeout { idle_cycles: u64 },
}

impl RowPolicy {
    /// Decides whether `cmd` (a plain RD/WR about to be issued) should be
    /// converted to its auto-precharging variant, given whether any other
    /// queued request still targets the same bank.
    #[must_use]
    pub fn should_auto_precharge(
        self,
        cmd: Command,
        bank_has_other_pending: bool,
        idle_since_last_access: u64,
    ) -> bool {
        if cmd.is_auto_precharge() || !matches!(cmd, Command::Rd | Command::Wr) {
            return false;
        }
        match self {
            Self::Closed => true,
            Self::Opened => false,
            Self::Timeout { idle_cycles } => {
                !bank_has_other_pending && idle_since_last_access >= idle_cycles
            }
        }
    }
}

/// True if any request still queued (besides `exclude`) targets the same
/// global bank id as `req`.
#[must_use]
pub fn bank_has_other_pending(queues: &RequestQueues, req: &Request, banks_per_bg: u32, exclude_idx: usize) -> bool {
    let bank_id = req.addr.global_bank_id(banks_per_bg);
    let same_bank = |r: &Request| r.targets_bank(banks_per_bg, bank_id);
    queues.readq.iter().any(same_bank)
        || queues.writeq.iter().any(same_bank)
        || queues
            .actq
            .iter()
            .enumerate()
            .any(|(i, r)| i != exclude_idx && same_bank(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_page_always_auto_precharges_column_commands() {
        let policy = RowPolicy::Closed;
        assert!(policy.should_auto_precharge(Command::Rd, false, 0));
        assert!(policy.should_auto_precharge(Command::Wr, true, 0));
    }

    #[test]
    fn open_page_never_auto_precharges() {
        let policy = RowPolicy::Opened;
        assert!(!policy.should_auto_precharge(Command::Rd, false, 1_000_000));
    }

    #[test]
    fn timeout_policy_precharges_only_once_idle_and_unclaimed() {
        let policy = RowPolicy::Timeout { idle_cycles: 100 };
        assert!(!policy.should_auto_precharge(Command::Rd, false, 50));
        assert!(!policy.should_auto_precharge(Command::Rd, true, 200));
        assert!(policy.should_auto_precharge(Command::Rd, false, 200));
    }
}
