//! Fatal-error representation for invariant violations.
//!
//! Per the error-handling design, the simulator distinguishes *fatal invariant
//! violations* (this type) from *expected runtime conditions* (queue full,
//! no ready request, NACKs, Bloom false positives), which are never errors
//! and are instead observable state or stats.

use crate::common::addr::AddrVec;
use thiserror::Error;

/// A fatal invariant violation. The simulator must abort on any of these;
/// none are recoverable and none should occur in a correctly driven
/// simulation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// `update` was called for a command whose `check` had not returned ready.
    #[error("update called for {cmd:?} at {addr} without a prior ready check at clk {clk}")]
    UpdateWithoutReadyCheck {
        /// The command that was updated.
        cmd: String,
        /// The address the command targeted.
        addr: AddrVec,
        /// The clock at which the violation was detected.
        clk: u64,
    },

    /// An SA lock was released that the caller did not hold.
    #[error("attempted to release a lock not held: chip {chip}, bank {bank}")]
    ReleaseUnheldLock {
        /// The chip whose lock table was targeted.
        chip: u32,
        /// The global bank id within that chip.
        bank: u32,
    },

    /// A maintenance counter accumulated more pending work than its policy limit.
    #[error(
        "maintenance backlog exceeded limit: chip {chip} bank {bank} pending={pending} limit={limit}"
    )]
    MaintenanceBacklogExceeded {
        /// The chip whose counter overflowed.
        chip: u32,
        /// The bank the counter tracks.
        bank: u32,
        /// The accumulated pending-maintenance count.
        pending: u64,
        /// The configured limit.
        limit: u64,
    },

    /// A request's first resolved command was not a valid device command.
    #[error("request at {addr} resolved to an impossible command")]
    ImpossibleCommand {
        /// The address the request targeted.
        addr: AddrVec,
    },

    /// More than one subarray was locked for the same (chip, bank) at once.
    #[error("lock exclusivity violated: chip {chip} bank {bank} already locks subarray {held_sa}, cannot also lock {requested_sa}")]
    LockExclusivityViolated {
        /// The chip that violated exclusivity.
        chip: u32,
        /// The bank that violated exclusivity.
        bank: u32,
        /// The subarray already locked.
        held_sa: u32,
        /// The subarray that was also requested.
        requested_sa: u32,
    },
}
