//! Inter-command timing-table entries.

use super::command::Command;

/// One timing constraint imposed by a command, recorded at a particular
/// tree level.
///
/// After issuing `cmd` at clock `issue_clk`, the earliest clock at which
/// `next_cmd` may be issued *at this same node* is `issue_clk + val`. `dist`
/// gives the history window: issuing `cmd` constrains the `dist`-th next
/// occurrence of `next_cmd` rather than the very next one, which is how
/// four-activate-window-style constraints (tFAW) are expressed with a
/// uniform table shape instead of a special case.
///
/// Cross-sibling constraints (tRRD, tCCD, tWTR, tFAW: one bank's command
/// constrains its siblings) need no special handling: a [`DeviceSpec`]
/// implementation simply attaches the entry at the ancestor level shared by
/// the siblings (e.g. Rank for tFAW) rather than at the command's own scope
/// level. [`DeviceSpec::check`] already walks every level on the path from
/// the root to the command's scope and takes the maximum wait, so history
/// recorded at an ancestor is automatically visible to every descendant.
///
/// [`DeviceSpec`]: super::DeviceSpec
/// [`DeviceSpec::check`]: super::DeviceSpec::check
#[derive(Debug, Clone, Copy)]
pub struct TimingEntry {
    /// The command this entry constrains.
    pub next_cmd: Command,
    /// History window: `1` for an ordinary pairwise constraint, `4` for tFAW.
    pub dist: u32,
    /// The constraint value in clock cycles.
    pub val: u64,
}

impl TimingEntry {
    /// Builds an ordinary (non-windowed) timing entry.
    #[must_use]
    pub const fn simple(next_cmd: Command, val: u64) -> Self {
        Self {
            next_cmd,
            dist: 1,
            val,
        }
    }

    /// Builds a windowed constraint such as tFAW (`dist = 4`).
    #[must_use]
    pub const fn windowed(next_cmd: Command, dist: u32, val: u64) -> Self {
        Self {
            next_cmd,
            dist,
            val,
        }
    }
}
