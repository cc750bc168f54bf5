//! Device timing and state model.
//!
//! For each supported DRAM standard, [`DeviceSpec`] declares the level/command
//! tables described in the design: organization counts, command scope,
//! prerequisite resolution, row-hit/row-open predicates, state-mutating
//! lambdas, and inter-command timing. This module deliberately avoids the
//! `std::function`-per-cell table the original implementation used; instead
//! every table is a plain `match` over the `(Level, Command)` pair, keyed by
//! the enums below, per the static-dispatch guidance in the design notes.
//!
//! The device tree bottoms out at [`Level::Subarray`] (see
//! [`crate::device::DeviceNode::build`]); rows and columns are addressed but
//! never materialized as nodes.

mod command;
mod ddr4;
mod org;
mod state;
mod timing;

pub use command::Command;
pub use ddr4::{default_speed, Ddr4Spec};
pub use org::{OrgEntry, SpeedEntry};
pub use state::State;
pub use timing::TimingEntry;

use crate::common::addr::{AddrVec, Level};
use crate::device::DeviceNode;

/// Outcome of resolving a command's prerequisite at one level of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prereq {
    /// The command is ready to issue as-is.
    Ready(Command),
    /// A cheaper precursor command must run first.
    Precursor(Command),
    /// No command is needed at this level (e.g. the row is already open).
    Nop,
}

/// A DRAM standard: organization, commands, timing, and the state machine.
///
/// One [`DeviceSpec`] implementation exists per supported standard (today,
/// [`Ddr4Spec`]); a refresh-parallelism variant can be added by implementing
/// this trait without touching the controller or SMD protocol code, both of
/// which depend only on the trait.
pub trait DeviceSpec: Send + Sync {
    /// Organization (counts per level) for this spec instance.
    fn org(&self) -> &OrgEntry;

    /// Speed-bin timing parameters (tCK, tRCD, tRAS, ... in clocks).
    fn speed(&self) -> &SpeedEntry;

    /// The tree level at which `cmd` is applied (e.g. REF -> Rank, ACT -> Subarray).
    fn scope(&self, cmd: Command) -> Level;

    /// Resolves a possibly-abstract command at `level`, given the state of
    /// `node` (the node *at* `level`) and `target_id` (the address index of
    /// the child this access targets one level down — e.g. at Bank level,
    /// which subarray). Called at every level from [`Level::Channel`] down
    /// to `self.scope(cmd)` by [`DeviceSpec::decode`]; levels with no
    /// bank/subarray state (Channel, Rank, BankGroup for most commands)
    /// simply pass the command through via `Prereq::Precursor(cmd)` unchanged.
    fn prereq(&self, level: Level, node: &DeviceNode, cmd: Command, target_id: u32) -> Prereq;

    /// True if issuing `cmd` at `level` counts as a row-buffer hit for stats.
    fn rowhit(&self, level: Level, node: &DeviceNode, cmd: Command, target_id: u32) -> bool;

    /// True if issuing `cmd` at `level` leaves a row open for stats purposes.
    fn rowopen(&self, level: Level, cmd: Command) -> bool;

    /// Mutates `node` (the node at `level`) to reflect `cmd` completing,
    /// given `target_id` (the same one-level-down child index `prereq`
    /// receives) and the issue clock.
    fn lambda(&self, level: Level, node: &mut DeviceNode, cmd: Command, target_id: u32, clk: u64);

    /// The list of timing constraints `cmd` imposes when recorded at `level`.
    fn timing(&self, level: Level, cmd: Command) -> &[TimingEntry];

    /// Read latency in clocks: cycles from RD/RDA issue to data return.
    fn read_latency(&self) -> u64;

    /// Clocks between an optimistic ACT and a chip's NACK decision (ACT-NACK mode).
    fn act_to_nack_cycles(&self) -> u64;

    /// Walks from [`Level::Channel`] down to `self.scope(cmd)`, computing at
    /// each level `max(0, earliest_next_clk[cmd] - clk)`. Returns the number
    /// of clocks the caller must still wait (zero iff ready at every level).
    fn check(&self, node: &DeviceNode, cmd: Command, addr: &AddrVec, clk: u64) -> u64 {
        let scope = self.scope(cmd);
        let mut wait = 0;
        let mut cur = node;
        let mut level = Level::Channel;
        loop {
            wait = wait.max(cur.earliest_allowed(cmd).saturating_sub(clk));
            if level == scope {
                return wait;
            }
            let Some(child_level) = level.child() else {
                return wait;
            };
            let Some(child) = cur.child(addr.get(child_level)) else {
                return wait;
            };
            cur = child;
            level = child_level;
        }
    }

    /// Recursively substitutes `cmd <- prereq(level, node, cmd, target_id)`
    /// from [`Level::Channel`] down to `self.scope(cmd)`, returning the
    /// concrete command that will actually be issued (e.g. a RD request may
    /// resolve to ACT, or to PRE, depending on state).
    fn decode(&self, root: &DeviceNode, cmd: Command, addr: &AddrVec) -> Command {
        let scope = self.scope(cmd);
        let mut cur = cmd;
        let mut node = root;
        let mut level = Level::Channel;
        loop {
            let target_id = level.child().map_or(0, |cl| addr.get(cl));
            match self.prereq(level, node, cur, target_id) {
                Prereq::Ready(c) => return c,
                Prereq::Nop => return Command::Nop,
                Prereq::Precursor(next) => cur = next,
            }
            if level == scope {
                return cur;
            }
            let Some(child_level) = level.child() else {
                return cur;
            };
            let Some(child) = node.child(addr.get(child_level)) else {
                return cur;
            };
            node = child;
            level = child_level;
        }
    }

    /// Pushes new history entries per [`DeviceSpec::timing`] and runs
    /// [`DeviceSpec::lambda`] at every level from [`Level::Channel`] down to
    /// `self.scope(cmd)`. Caller must have already confirmed `check(..) ==
    /// 0`; violating this is a fatal implementation bug, not a runtime error.
    fn update(&self, root: &mut DeviceNode, cmd: Command, addr: &AddrVec, clk: u64) {
        let scope = self.scope(cmd);
        let mut level = Level::Channel;
        let mut node = root;
        loop {
            node.record_timing(cmd, self.timing(level, cmd), clk);
            let target_id = level.child().map_or(0, |cl| addr.get(cl));
            self.lambda(level, node, cmd, target_id, clk);
            if level == scope {
                return;
            }
            let Some(child_level) = level.child() else {
                return;
            };
            let Some(child) = node.child_mut(addr.get(child_level)) else {
                return;
            };
            node = child;
            level = child_level;
        }
    }
}
