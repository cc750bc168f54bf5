//! JEDEC DDR4-style [`DeviceSpec`] implementation.

use std::collections::HashMap;

use crate::common::addr::Level;
use crate::device::DeviceNode;

use super::command::Command;
use super::org::{OrgEntry, SpeedEntry};
use super::state::State;
use super::timing::TimingEntry;
use super::{DeviceSpec, Prereq};

/// A DDR4-family device spec.
///
/// Organization and speed-bin values default to a DDR4-3200-class part;
/// both are overridable at construction so a config file can model a
/// different density or speed grade. `per_bank_refresh` switches REF's scope
/// from rank-wide to per-bank, matching the finer-grained refresh SMD can
/// use to hide maintenance behind idle banks.
#[derive(Debug, Clone)]
pub struct Ddr4Spec {
    org: OrgEntry,
    speed: SpeedEntry,
    per_bank_refresh: bool,
    /// Timing tables, keyed by `(level, cmd)` and built once at construction
    /// from `speed` — [`DeviceSpec::timing`] only ever indexes into this.
    timing_table: HashMap<(Level, Command), Vec<TimingEntry>>,
}

impl Default for Ddr4Spec {
    fn default() -> Self {
        Self::new(
            OrgEntry {
                count: [1, 1, 2, 2, 8, 8192, 128],
            },
            default_speed(),
            false,
        )
    }
}

/// DDR4-3200 (0.625 ns clock) timing in clocks, per JEDEC JESD79-4 worst case.
#[must_use]
pub fn default_speed() -> SpeedEntry {
    SpeedEntry {
        t_ck_ns: 0.625,
        n_ras: 32,
        n_rcd: 22,
        n_rp: 22,
        n_rc: 54,
        n_cl: 22,
        n_cwl: 16,
        n_rtp: 12,
        n_wr: 24,
        n_ccds: 4,
        n_ccdl: 6,
        n_rrds: 4,
        n_rrdl: 6,
        n_faw: 26,
        n_wtrs: 4,
        n_wtrl: 12,
        n_rfc: 560,
        n_refi: 12_480,
        n_cke: 6,
        n_xp: 8,
        n_xs: 576,
        n_nack_resend: 64,
    }
}

impl Ddr4Spec {
    /// Builds a spec from explicit organization and speed tables.
    #[must_use]
    pub fn new(org: OrgEntry, speed: SpeedEntry, per_bank_refresh: bool) -> Self {
        let timing_table = build_timing_table(&speed);
        Self {
            org,
            speed,
            per_bank_refresh,
            timing_table,
        }
    }

    /// Closes every bank (and its open subarray/row) under a rank node, for PREA.
    fn close_rank(rank: &mut DeviceNode) {
        for bg in rank.children_mut() {
            for bank in bg.children_mut() {
                bank.set_state(State::Closed);
                bank.clear_child_states();
                for sa in bank.children_mut() {
                    sa.set_state(State::Closed);
                    sa.clear_child_states();
                }
            }
        }
    }

    /// True if any bank under a rank node has an open subarray.
    fn rank_has_open_bank(rank: &DeviceNode) -> bool {
        rank.children()
            .iter()
            .flat_map(DeviceNode::children)
            .any(|bank| bank.open_child().is_some())
    }
}

impl DeviceSpec for Ddr4Spec {
    fn org(&self) -> &OrgEntry {
        &self.org
    }

    fn speed(&self) -> &SpeedEntry {
        &self.speed
    }

    fn scope(&self, cmd: Command) -> Level {
        match cmd {
            Command::Act
            | Command::Rd
            | Command::Wr
            | Command::Rda
            | Command::Wra
            | Command::ActNack
            | Command::ActPartialNack => Level::Subarray,
            Command::Pre | Command::PreRsq | Command::Refpb => Level::Bank,
            Command::Ref => {
                if self.per_bank_refresh {
                    Level::Bank
                } else {
                    Level::Rank
                }
            }
            Command::Prea
            | Command::Pde
            | Command::Pdx
            | Command::Sre
            | Command::Srx
            | Command::Rsq => Level::Rank,
            Command::Nop => Level::Channel,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn prereq(&self, level: Level, node: &DeviceNode, cmd: Command, target_id: u32) -> Prereq {
        match (level, cmd) {
            (Level::Bank, Command::Act | Command::Rd | Command::Wr | Command::Rda | Command::Wra) => {
                match node.open_child() {
                    None => Prereq::Ready(Command::Act),
                    Some(open_sa) if open_sa != target_id => Prereq::Ready(Command::Pre),
                    Some(_) => Prereq::Precursor(cmd),
                }
            }
            (Level::Subarray, Command::Act) => match node.open_child() {
                Some(r) if r == target_id => Prereq::Nop,
                Some(_) => Prereq::Ready(Command::Pre),
                None => Prereq::Ready(Command::Act),
            },
            (Level::Subarray, Command::Rd | Command::Wr | Command::Rda | Command::Wra) => {
                match node.open_child() {
                    Some(r) if r == target_id => Prereq::Ready(cmd),
                    Some(_) => Prereq::Ready(Command::Pre),
                    None => Prereq::Ready(Command::Act),
                }
            }
            (Level::Bank, Command::Pre) => {
                if node.open_child().is_none() {
                    Prereq::Nop
                } else {
                    Prereq::Ready(Command::Pre)
                }
            }
            (Level::Bank, Command::PreRsq) => {
                if node.open_child().is_none() {
                    Prereq::Nop
                } else {
                    Prereq::Ready(Command::PreRsq)
                }
            }
            (Level::Rank, Command::Prea) => {
                if Self::rank_has_open_bank(node) {
                    Prereq::Ready(Command::Prea)
                } else {
                    Prereq::Nop
                }
            }
            (Level::Bank, Command::Refpb)
            | (Level::Rank | Level::Bank, Command::Ref)
            | (Level::Rank, Command::Pde | Command::Pdx | Command::Sre | Command::Srx | Command::Rsq)
            | (Level::Subarray, Command::ActNack | Command::ActPartialNack) => Prereq::Ready(cmd),
            _ => Prereq::Precursor(cmd),
        }
    }

    fn rowhit(&self, level: Level, node: &DeviceNode, cmd: Command, target_id: u32) -> bool {
        level == Level::Subarray
            && matches!(cmd, Command::Rd | Command::Wr | Command::Rda | Command::Wra)
            && node.open_child() == Some(target_id)
    }

    fn rowopen(&self, level: Level, cmd: Command) -> bool {
        level == Level::Subarray && matches!(cmd, Command::Rd | Command::Wr)
    }

    fn lambda(&self, level: Level, node: &mut DeviceNode, cmd: Command, target_id: u32, clk: u64) {
        match (level, cmd) {
            (Level::Bank, Command::Act) => {
                node.set_child_state(target_id, State::Opened);
                node.set_state(State::Opened);
            }
            (Level::Bank, Command::Pre | Command::Rda | Command::Wra) => {
                node.set_child_state(target_id, State::Closed);
                if node.open_child().is_none() {
                    node.set_state(State::Closed);
                }
                if let Some(sa) = node.child_mut(target_id) {
                    sa.set_state(State::Closed);
                    sa.clear_child_states();
                    sa.open_since_clk = None;
                }
            }
            (Level::Bank, Command::ActNack) => {
                node.set_child_state(target_id, State::Closed);
                if node.open_child().is_none() {
                    node.set_state(State::Closed);
                }
            }
            (Level::Bank, Command::ActPartialNack) => {
                node.set_child_state(target_id, State::PartiallyOpened);
                node.set_state(State::PartiallyOpened);
            }
            (Level::Subarray, Command::Act) => {
                node.set_child_state(target_id, State::Opened);
                node.set_state(State::Opened);
                node.open_since_clk = Some(clk);
                node.just_opened = true;
                node.cycles_since_last_act += 1;
            }
            (Level::Subarray, Command::Rd | Command::Wr) => {
                node.just_opened = false;
            }
            (Level::Subarray, Command::Rda | Command::Wra) => {
                node.set_state(State::Closed);
                node.clear_child_states();
                node.open_since_clk = None;
            }
            (Level::Subarray, Command::ActPartialNack) => {
                node.set_state(State::PartiallyOpened);
            }
            (Level::Rank, Command::Prea) => {
                Self::close_rank(node);
            }
            (Level::Rank, Command::Pde) => node.set_state(State::ActPowerDown),
            (Level::Rank, Command::Pdx) => node.set_state(State::PowerUp),
            (Level::Rank, Command::Sre) => node.set_state(State::SelfRefresh),
            (Level::Rank, Command::Srx) => node.set_state(State::PowerUp),
            _ => {}
        }
    }

    fn timing(&self, level: Level, cmd: Command) -> &[TimingEntry] {
        self.timing_table
            .get(&(level, cmd))
            .map_or(&[], Vec::as_slice)
    }

    fn read_latency(&self) -> u64 {
        self.speed.n_cl
    }

    fn act_to_nack_cycles(&self) -> u64 {
        self.speed.n_rcd
    }
}

/// Builds the full `(level, cmd) -> timing entries` table for one speed bin.
///
/// Cross-sibling constraints (RRD, CCD, WTR, FAW) are attached at
/// [`Level::BankGroup`] or [`Level::Rank`] rather than at a command's own
/// scope, per [`TimingEntry`]'s doc comment: `check`/`update` already walk
/// every level up to scope and take the max, so recording history on a
/// shared ancestor makes it visible to every sibling for free.
fn build_timing_table(s: &SpeedEntry) -> HashMap<(Level, Command), Vec<TimingEntry>> {
    let mut t = HashMap::new();
    t.insert(
        (Level::Bank, Command::Act),
        vec![
            TimingEntry::simple(Command::Rd, s.n_rcd),
            TimingEntry::simple(Command::Wr, s.n_rcd),
            TimingEntry::simple(Command::Pre, s.n_ras),
            TimingEntry::simple(Command::Act, s.n_rc),
        ],
    );
    t.insert(
        (Level::Bank, Command::Pre),
        vec![TimingEntry::simple(Command::Act, s.n_rp)],
    );
    t.insert(
        (Level::Bank, Command::Rd),
        vec![TimingEntry::simple(Command::Pre, s.n_rtp)],
    );
    t.insert(
        (Level::Bank, Command::Wr),
        vec![TimingEntry::simple(Command::Pre, s.n_cwl + 4 + s.n_wr)],
    );
    t.insert(
        (Level::Bank, Command::Rda),
        vec![TimingEntry::simple(Command::Act, s.n_rtp + s.n_rp)],
    );
    t.insert(
        (Level::Bank, Command::Wra),
        vec![TimingEntry::simple(
            Command::Act,
            s.n_cwl + 4 + s.n_wr + s.n_rp,
        )],
    );
    t.insert(
        (Level::Bank, Command::ActNack),
        vec![TimingEntry::simple(Command::Act, s.n_nack_resend)],
    );
    t.insert(
        (Level::BankGroup, Command::Act),
        vec![TimingEntry::simple(Command::Act, s.n_rrdl)],
    );
    t.insert(
        (Level::BankGroup, Command::Rd),
        vec![
            TimingEntry::simple(Command::Rd, s.n_ccdl),
            TimingEntry::simple(Command::Wr, s.n_ccdl),
        ],
    );
    t.insert(
        (Level::BankGroup, Command::Wr),
        vec![
            TimingEntry::simple(Command::Wr, s.n_ccdl),
            TimingEntry::simple(Command::Rd, s.n_wtrl),
        ],
    );
    t.insert(
        (Level::Rank, Command::Act),
        vec![
            TimingEntry::simple(Command::Act, s.n_rrds),
            TimingEntry::windowed(Command::Act, 4, s.n_faw),
        ],
    );
    t.insert(
        (Level::Rank, Command::Rd),
        vec![
            TimingEntry::simple(Command::Rd, s.n_ccds),
            TimingEntry::simple(Command::Wr, s.n_ccds),
        ],
    );
    t.insert(
        (Level::Rank, Command::Wr),
        vec![
            TimingEntry::simple(Command::Wr, s.n_ccds),
            TimingEntry::simple(Command::Rd, s.n_wtrs),
        ],
    );
    t.insert(
        (Level::Rank, Command::Ref),
        vec![TimingEntry::simple(Command::Act, s.n_rfc)],
    );
    t.insert(
        (Level::Rank, Command::Pde),
        vec![TimingEntry::simple(Command::Pdx, s.n_cke)],
    );
    t.insert(
        (Level::Rank, Command::Pdx),
        vec![TimingEntry::simple(Command::Act, s.n_xp)],
    );
    t.insert(
        (Level::Rank, Command::Sre),
        vec![TimingEntry::simple(Command::Srx, s.n_cke)],
    );
    t.insert(
        (Level::Rank, Command::Srx),
        vec![TimingEntry::simple(Command::Act, s.n_xs)],
    );
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::addr::AddrVec;

    fn small_org() -> OrgEntry {
        OrgEntry {
            count: [1, 1, 1, 1, 2, 1024, 64],
        }
    }

    #[test]
    fn row_miss_resolves_to_activate() {
        let spec = Ddr4Spec::new(small_org(), default_speed(), false);
        let root = DeviceNode::build(Level::Channel, &spec.org().count, State::Closed);
        let addr = AddrVec::new(0, 0, 0, 0, 0, 5, 0);
        assert_eq!(spec.decode(&root, Command::Rd, &addr), Command::Act);
    }

    #[test]
    fn row_hit_resolves_to_the_column_command_directly() {
        let spec = Ddr4Spec::new(small_org(), default_speed(), false);
        let mut root = DeviceNode::build(Level::Channel, &spec.org().count, State::Closed);
        let addr = AddrVec::new(0, 0, 0, 0, 0, 5, 0);
        spec.update(&mut root, Command::Act, &addr, 0);
        assert_eq!(spec.decode(&root, Command::Rd, &addr), Command::Rd);
    }

    #[test]
    fn conflicting_row_in_the_open_subarray_forces_a_precharge() {
        let spec = Ddr4Spec::new(small_org(), default_speed(), false);
        let mut root = DeviceNode::build(Level::Channel, &spec.org().count, State::Closed);
        let act_addr = AddrVec::new(0, 0, 0, 0, 0, 5, 0);
        spec.update(&mut root, Command::Act, &act_addr, 0);
        let other_row = AddrVec::new(0, 0, 0, 0, 0, 6, 0);
        assert_eq!(spec.decode(&root, Command::Rd, &other_row), Command::Pre);
    }

    #[test]
    fn activate_then_precharge_enforces_trc_on_the_next_activate() {
        let spec = Ddr4Spec::new(small_org(), default_speed(), false);
        let mut root = DeviceNode::build(Level::Channel, &spec.org().count, State::Closed);
        let addr = AddrVec::new(0, 0, 0, 0, 0, 5, 0);
        spec.update(&mut root, Command::Act, &addr, 0);
        assert_eq!(spec.check(&root, Command::Pre, &addr, 0), spec.speed().n_ras);
        spec.update(&mut root, Command::Pre, &addr, spec.speed().n_ras);
        let wait = spec.check(&root, Command::Act, &addr, spec.speed().n_ras);
        assert_eq!(wait, spec.speed().n_rp);
    }

    #[test]
    fn four_activate_window_throttles_a_fifth_activate_on_the_rank() {
        let org = OrgEntry {
            count: [1, 1, 4, 1, 2, 1024, 64],
        };
        let spec = Ddr4Spec::new(org, default_speed(), false);
        let mut root = DeviceNode::build(Level::Channel, &spec.org().count, State::Closed);
        for bg in 0..4 {
            let addr = AddrVec::new(0, 0, bg, 0, 0, 0, 0);
            let clk = u64::from(bg) * spec.speed().n_rrds;
            spec.update(&mut root, Command::Act, &addr, clk);
        }
        let rank = &root.children()[0];
        let fifth_wait = rank.earliest_allowed(Command::Act);
        assert!(fifth_wait >= spec.speed().n_faw);
    }
}
