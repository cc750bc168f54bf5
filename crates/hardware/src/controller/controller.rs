//! The memory controller's per-tick procedure: request scheduling, command
//! issue, SMD coordination, and the maintenance machinery that rides
//! alongside it. The tick order below is part of the contract (see the
//! design notes on ordering) and must not be reshuffled.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::addr::{AddrVec, Level};
use crate::device::DeviceNode;
use crate::energy::EnergyModel;
use crate::request::{Request, RequestQueues, RequestType};
use crate::row_table::RowTable;
use crate::scheduler::{bank_has_other_pending, RowPolicy};
use crate::smd::{RankMaintenance, SmdMode, SmdOutcome};
use crate::spec::{Command, DeviceSpec, State};
use crate::stats::Stats;

/// Static controller configuration: topology and policy knobs that don't
/// change mid-simulation (a config reload would rebuild a `Controller`).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Banks per bank group, for deriving a global bank id from an address.
    pub banks_per_bg: u32,
    /// Row-buffer management policy.
    pub row_policy: RowPolicy,
    /// Writes queued before the controller enters write-drain mode.
    pub write_drain_threshold: usize,
    /// Writes queued below which the controller exits write-drain mode
    /// (once the read queue is non-empty).
    pub write_drain_exit_threshold: usize,
    /// Requests targeting a different subarray of the same bank needed to
    /// prefer a PRE over waiting, for a partially-NACK'd request at the head
    /// of `actq`.
    pub combined_policy_threshold: usize,
    /// Row-open duration, in clocks, past which a column command targeting
    /// it is rewritten to its auto-precharging variant.
    pub max_row_open_cycles: u64,
    /// Clocks after which an RSQ/Alert tracker entry is considered stale.
    pub ref_tracker_timeout_period: u64,
    /// Clocks after issuing an NACK'd ACT before the request may retry.
    pub nack_resend_cycles: u64,
    /// Per-ACT probability (parts per thousand) of a PARA preventive refresh.
    pub para_probability_permille: u32,
}

/// A response the controller is waiting on: a read's data return, or an RSQ
/// reply carrying a rank's up-to-date lock set.
#[derive(Debug, Clone)]
enum Pending {
    Read(Request),
    StatusQuery { rank_id: u32 },
}

#[derive(Debug, Clone)]
struct PendingEntry {
    depart_clk: u64,
    item: Pending,
}

/// A due ACT-NACK/ACT-PARTIAL-NACK outcome awaiting controller-side bookkeeping.
#[derive(Debug, Clone)]
struct DueNack {
    due_clk: u64,
    addr: AddrVec,
    outcome: SmdOutcome,
}

/// Orchestrates device-tree state, request queues, SMD coordination, and
/// maintenance for one rank, via a single-threaded, one-command-per-tick
/// cooperative loop.
pub struct Controller<S: DeviceSpec> {
    config: ControllerConfig,
    spec: S,
    root: DeviceNode,
    queues: RequestQueues,
    row_table: RowTable,
    rank_maintenance: RankMaintenance,
    stats: Stats,
    energy: Box<dyn EnergyModel>,
    pending: VecDeque<PendingEntry>,
    due_nacks: VecDeque<DueNack>,
    alerted_ranks: Vec<u32>,
    write_mode: bool,
    /// True while an RSQ opportunistic status query is in flight, so the
    /// scheduler doesn't queue a second one before the first resolves.
    rsq_inflight: bool,
    clk: u64,
    rng: StdRng,
}

impl<S: DeviceSpec> Controller<S> {
    /// Builds a controller for one rank's worth of device tree, rank-id 0.
    pub fn new(
        config: ControllerConfig,
        spec: S,
        rank_maintenance: RankMaintenance,
        energy: Box<dyn EnergyModel>,
        rng_seed: u64,
    ) -> Self {
        let root = DeviceNode::build(Level::Channel, &spec.org().count, State::Closed);
        Self {
            config,
            spec,
            root,
            queues: RequestQueues::default(),
            row_table: RowTable::new(),
            rank_maintenance,
            stats: Stats::new(),
            energy,
            pending: VecDeque::new(),
            due_nacks: VecDeque::new(),
            alerted_ranks: Vec::new(),
            write_mode: false,
            rsq_inflight: false,
            clk: 0,
            rng: StdRng::seed_from_u64(rng_seed),
        }
    }

    /// Current simulated clock.
    #[must_use]
    pub const fn clk(&self) -> u64 {
        self.clk
    }

    /// Accumulated statistics.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// The underlying device tree, for inspection by tests and the CLI's
    /// summary printer.
    #[must_use]
    pub const fn root(&self) -> &DeviceNode {
        &self.root
    }

    /// Enqueues a CPU-originated access. Returns `false` (never panics) if
    /// the combined queue depth is already at the configured capacity —
    /// this is an expected runtime condition, not an error; the caller
    /// retries on a later tick.
    pub fn enqueue(&mut self, addr: AddrVec, kind: RequestType, capacity: usize) -> bool {
        if self.queues.len() >= capacity {
            return false;
        }
        self.queues.push(Request::new(addr, kind, self.clk));
        true
    }

    /// A chip raised its out-of-band SMD alert; the controller will query
    /// that rank's lock status before issuing anything else this tick.
    pub fn signal_alert(&mut self, rank_id: u32) {
        if !self.alerted_ranks.contains(&rank_id) {
            self.alerted_ranks.push(rank_id);
        }
    }

    /// Advances the simulation by one clock, running the full per-tick
    /// procedure: retire, apply NACKs, run maintenance, handle alerts,
    /// select mode, apply the partial-NACK combined policy, then schedule
    /// and issue at most one command.
    pub fn tick(&mut self) {
        self.retire_completed();
        self.apply_due_nacks();
        self.run_maintenance();
        self.handle_alerts();
        self.select_mode();
        self.apply_combined_policy();
        self.schedule_and_issue();
        self.stats.cycles = self.clk;
        self.clk += 1;
    }

    fn retire_completed(&mut self) {
        while matches!(self.pending.front(), Some(p) if p.depart_clk <= self.clk) {
            let Some(entry) = self.pending.pop_front() else {
                break;
            };
            match entry.item {
                Pending::Read(req) => {
                    if req.kind == RequestType::Read {
                        self.stats.reads_retired += 1;
                    }
                }
                Pending::StatusQuery { rank_id: _ } => {
                    self.rsq_inflight = false;
                    let until = self.clk + self.config.ref_tracker_timeout_period;
                    let busy: Vec<(u32, u32)> = self.rank_maintenance.locked_subarrays().map(|((_chip, bank), sa)| (bank, sa)).collect();
                    for (bank, subarray) in busy {
                        self.rank_maintenance.tracker_mut().mark_busy(bank, subarray, until);
                    }
                    self.rank_maintenance.tracker_mut().clear_expired(self.clk);
                }
            }
        }
    }

    fn apply_due_nacks(&mut self) {
        while matches!(self.due_nacks.front(), Some(n) if n.due_clk <= self.clk) {
            let Some(nack) = self.due_nacks.pop_front() else {
                break;
            };
            match nack.outcome {
                SmdOutcome::Nacked => {
                    self.spec.update(&mut self.root, Command::ActNack, &nack.addr, self.clk);
                    self.row_table.close(nack.addr.global_bank_id(self.config.banks_per_bg));
                    self.stats.act_nacks += 1;
                }
                SmdOutcome::PartialNacked => {
                    self.spec.update(&mut self.root, Command::ActPartialNack, &nack.addr, self.clk);
                    self.stats.act_partial_nacks += 1;
                }
                SmdOutcome::Acked => {}
            }
        }
    }

    fn run_maintenance(&mut self) {
        for (_name, addr) in self.rank_maintenance.poll_policies(self.clk) {
            self.queues.push(Request::new(addr, RequestType::Maintenance, self.clk));
        }
    }

    fn handle_alerts(&mut self) {
        if self.rank_maintenance.tracker().mode() != SmdMode::Alert || self.alerted_ranks.is_empty() {
            return;
        }
        for rank_id in std::mem::take(&mut self.alerted_ranks) {
            self.pending.push_back(PendingEntry {
                depart_clk: self.clk + self.spec.read_latency(),
                item: Pending::StatusQuery { rank_id },
            });
        }
    }

    fn select_mode(&mut self) {
        if !self.write_mode && self.queues.writeq.len() >= self.config.write_drain_threshold {
            self.write_mode = true;
        } else if self.write_mode
            && self.queues.writeq.len() <= self.config.write_drain_exit_threshold
            && !self.queues.readq.is_empty()
        {
            self.write_mode = false;
        }
    }

    /// Resolves the partial-NACK combined policy: if the head of `actq` is a
    /// partially-NACK'd re-ACT and enough other queued requests target a
    /// different subarray of the same bank, PRE the bank and demote the
    /// request back to its original queue with its arrival pushed out by
    /// `nack_resend_cycles`. Ties among multiple partially-NACK'd heads are
    /// broken by earliest `arrive_clk`, per the documented deterministic rule.
    fn apply_combined_policy(&mut self) {
        let Some(head) = self.queues.actq.front() else {
            return;
        };
        if head.nacked != Some(SmdOutcome::PartialNacked) {
            return;
        }
        let bank_id = head.addr.global_bank_id(self.config.banks_per_bg);
        let contenders = bank_has_other_pending(&self.queues, head, self.config.banks_per_bg, 0);
        if !contenders {
            return;
        }
        let others = self
            .queues
            .readq
            .iter()
            .chain(self.queues.writeq.iter())
            .filter(|r| r.targets_bank(self.config.banks_per_bg, bank_id))
            .count();
        if others < self.config.combined_policy_threshold {
            return;
        }
        let Some(mut req) = self.queues.actq.pop_front() else {
            return;
        };
        self.spec.update(&mut self.root, Command::Pre, &req.addr, self.clk);
        self.row_table.close(bank_id);
        self.stats.precharges += 1;
        req.arrive_clk = self.clk + self.config.nack_resend_cycles;
        req.nacked = None;
        req.next_command = None;
        self.queues.push(req);
    }

    fn schedule_and_issue(&mut self) {
        if let Some(idx) = self.pick_ready_candidate() {
            self.issue_candidate(idx);
            return;
        }
        self.maybe_opportunistic_status_query();
        self.enforce_row_timeout();
    }

    /// RSQ mode only: when nothing was ready to issue this tick, send a
    /// `PRE_RSQ`/`RSQ` anyway so the tracker's belief about busy subarrays
    /// gets refreshed even without an ACT attempt forcing the question —
    /// otherwise a long run of ready-nothing ticks could leave the tracker
    /// relying on an increasingly stale lock snapshot.
    fn maybe_opportunistic_status_query(&mut self) {
        if self.rank_maintenance.tracker().mode() != SmdMode::Rsq || self.rsq_inflight {
            return;
        }
        self.rsq_inflight = true;
        self.pending.push_back(PendingEntry {
            depart_clk: self.clk + self.spec.read_latency(),
            item: Pending::StatusQuery { rank_id: 0 },
        });
    }

    /// Returns which queue the next command should come from, per priority:
    /// `actq` first, then the active read/write queue, then `otherq`.
    fn queue_priority(&self) -> [QueueKind; 4] {
        if self.write_mode {
            [QueueKind::Act, QueueKind::Write, QueueKind::Read, QueueKind::Other]
        } else {
            [QueueKind::Act, QueueKind::Read, QueueKind::Write, QueueKind::Other]
        }
    }

    fn pick_ready_candidate(&mut self) -> Option<(QueueKind, usize)> {
        for queue in self.queue_priority() {
            let q = self.queue_ref(queue);
            if let Some(req) = q.front() {
                let cmd = self.spec.decode(&self.root, self.request_command(req), &req.addr);
                let timing_ready = cmd == Command::Nop || self.spec.check(&self.root, cmd, &req.addr, self.clk) == 0;
                if timing_ready && self.smd_permits(cmd, &req.addr) {
                    return Some((queue, 0));
                }
            }
        }
        None
    }

    /// RSQ/Alert invariant: no ACT issues against an SA the tracker reports
    /// locked and non-stale (stale entries are allowed through since a
    /// stale tracker means "ask again", not "wait forever"; the scheduler
    /// falls back to an opportunistic status query once nothing else is
    /// ready). ACT-NACK mode has no advance-warning tracker state, so it
    /// always permits the attempt and relies on [`Self::try_act_nack`].
    fn smd_permits(&self, cmd: Command, addr: &AddrVec) -> bool {
        if cmd != Command::Act || self.rank_maintenance.tracker().mode() == SmdMode::ActNack {
            return true;
        }
        let bank_id = addr.global_bank_id(self.config.banks_per_bg);
        let subarray_id = addr.get(Level::Subarray);
        !self.rank_maintenance.tracker().is_busy(bank_id, subarray_id, self.clk)
    }

    fn request_command(&self, req: &Request) -> Command {
        match req.kind {
            RequestType::Read => Command::Rd,
            RequestType::Write => Command::Wr,
            RequestType::Maintenance => Command::Ref,
        }
    }

    fn queue_ref(&self, kind: QueueKind) -> &VecDeque<Request> {
        match kind {
            QueueKind::Act => &self.queues.actq,
            QueueKind::Read => &self.queues.readq,
            QueueKind::Write => &self.queues.writeq,
            QueueKind::Other => &self.queues.otherq,
        }
    }

    fn queue_mut(&mut self, kind: QueueKind) -> &mut VecDeque<Request> {
        match kind {
            QueueKind::Act => &mut self.queues.actq,
            QueueKind::Read => &mut self.queues.readq,
            QueueKind::Write => &mut self.queues.writeq,
            QueueKind::Other => &mut self.queues.otherq,
        }
    }

    fn issue_candidate(&mut self, (queue, idx): (QueueKind, usize)) {
        let Some(mut req) = self.queue_mut(queue).remove(idx) else {
            return;
        };
        let bank_id = req.addr.global_bank_id(self.config.banks_per_bg);
        let base_cmd = self.request_command(&req);
        let mut cmd = self.spec.decode(&self.root, base_cmd, &req.addr);
        cmd = self.enforce_auto_precharge(&req.addr, cmd);

        if cmd == Command::Act && self.rank_maintenance.tracker().mode() == SmdMode::ActNack {
            if let Some(outcome) = self.try_act_nack(&req.addr) {
                req.nacked = Some(outcome);
                req.next_command = Some(Command::Act);
                self.due_nacks.push_back(DueNack {
                    due_clk: self.clk + self.spec.act_to_nack_cycles(),
                    addr: req.addr,
                    outcome,
                });
                self.queues.actq.push_back(req);
                return;
            }
        }

        self.spec.update(&mut self.root, cmd, &req.addr, self.clk);
        self.energy.issue_command(cmd, self.clk);
        self.bump_command_stats(cmd);

        match cmd {
            Command::Act => {
                self.row_table.open(bank_id, req.addr.get(Level::Row));
                let roll: u32 = self.rng.gen_range(0..1000);
                self.maybe_para(&req.addr, roll);
                self.rank_maintenance.notify_activate(&req.addr, roll);
                req.next_command = Some(base_cmd);
                self.queues.actq.push_back(req);
            }
            Command::Pre | Command::Prea => {
                self.row_table.close(bank_id);
                req.next_command = Some(base_cmd);
                self.queues.actq.push_back(req);
            }
            Command::Rd | Command::Rda => {
                if cmd == Command::Rda {
                    self.row_table.close(bank_id);
                }
                req.depart_clk = Some(self.clk + self.spec.read_latency());
                self.pending.push_back(PendingEntry {
                    depart_clk: req.depart_clk.unwrap_or(self.clk),
                    item: Pending::Read(req),
                });
            }
            Command::Wr | Command::Wra => {
                if cmd == Command::Wra {
                    self.row_table.close(bank_id);
                }
                self.stats.writes_retired += 1;
            }
            Command::Ref | Command::Refpb => {
                self.stats.refreshes += 1;
            }
            _ => {}
        }
    }

    /// Asks SMD whether the target subarray is locked for maintenance under
    /// ACT-NACK mode. `None` means proceed normally; `Some` carries which
    /// NACK outcome applies.
    fn try_act_nack(&mut self, addr: &AddrVec) -> Option<SmdOutcome> {
        let bank_id = addr.global_bank_id(self.config.banks_per_bg);
        let subarray_id = addr.get(Level::Subarray);
        let chip_lock = self.rank_maintenance.lock_mut(0, bank_id);
        if chip_lock.held_subarray() == Some(subarray_id) {
            Some(SmdOutcome::Nacked)
        } else if chip_lock.is_held() {
            Some(SmdOutcome::PartialNacked)
        } else {
            None
        }
    }

    /// Rolls the controller's own baseline PARA defense, independent of
    /// whatever chip-side [`crate::smd::RowHammerProtectionPolicy`] the
    /// config may also have selected. `roll` is shared with
    /// [`RankMaintenance::notify_activate`] so a single per-ACT random draw
    /// governs every RowHammer defense consulted this tick.
    fn maybe_para(&mut self, addr: &AddrVec, roll: u32) {
        if roll >= self.config.para_probability_permille {
            return;
        }
        let row = addr.get(Level::Row);
        let last_row = self.spec.org().count[Level::Row.index()].saturating_sub(1);
        for neighbor in [row.checked_sub(1), (row < last_row).then_some(row + 1)].into_iter().flatten() {
            let mut n = *addr;
            n.set(Level::Row, neighbor);
            self.queues.push(Request::new(n, RequestType::Maintenance, self.clk));
            self.stats.preventive_refreshes += 1;
        }
    }

    /// Forces RD/WR to their auto-precharging variant when the targeted
    /// subarray has been open longer than `max_row_open_cycles`, so a
    /// long-open row cannot starve the refresh engine behind it (a `0`
    /// threshold disables this forcing).
    fn enforce_auto_precharge(&self, addr: &AddrVec, cmd: Command) -> Command {
        if self.config.max_row_open_cycles == 0 || !matches!(cmd, Command::Rd | Command::Wr) {
            return cmd;
        }
        let open_too_long = self
            .subarray_node(addr)
            .and_then(|sa| sa.open_since_clk)
            .is_some_and(|since| self.clk.saturating_sub(since) >= self.config.max_row_open_cycles);
        if open_too_long {
            cmd.to_auto_precharge()
        } else {
            cmd
        }
    }

    /// Walks the tree from the root to the subarray `addr` targets.
    fn subarray_node(&self, addr: &AddrVec) -> Option<&DeviceNode> {
        self.root
            .child(addr.get(Level::Rank))
            .and_then(|rank| rank.child(addr.get(Level::BankGroup)))
            .and_then(|bg| bg.child(addr.get(Level::Bank)))
            .and_then(|bank| bank.child(addr.get(Level::Subarray)))
    }

    /// Row-timeout policy: if nothing was ready to schedule this tick,
    /// close any bank that's been open longer than the configured idle
    /// threshold, freeing it up for other queued requests.
    fn enforce_row_timeout(&mut self) {
        let RowPolicy::Timeout { idle_cycles } = self.config.row_policy else {
            return;
        };
        let candidate = self.queues.actq.front().or_else(|| self.queues.readq.front()).or_else(|| self.queues.writeq.front());
        let Some(addr) = candidate.map(|r| r.addr) else {
            return;
        };
        let Some(since) = self.subarray_node(&addr).and_then(|sa| sa.open_since_clk) else {
            return;
        };
        if self.clk.saturating_sub(since) < idle_cycles {
            return;
        }
        if self.spec.check(&self.root, Command::Pre, &addr, self.clk) != 0 {
            return;
        }
        self.spec.update(&mut self.root, Command::Pre, &addr, self.clk);
        self.row_table.close(addr.global_bank_id(self.config.banks_per_bg));
        self.stats.precharges += 1;
    }

    /// `cmd` here is the command `decode` resolved a column request to, so
    /// the resolution itself tells us hit or miss: `decode` only returns
    /// ACT when the bank needed opening first; it returns the column
    /// command directly when the row was already open.
    fn bump_command_stats(&mut self, cmd: Command) {
        match cmd {
            Command::Act => {
                self.stats.activates += 1;
                self.stats.row_misses += 1;
            }
            Command::Pre | Command::Prea => self.stats.precharges += 1,
            Command::Rd | Command::Wr | Command::Rda | Command::Wra => {
                self.stats.row_hits += 1;
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueueKind {
    Act,
    Read,
    Write,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::NullEnergyModel;
    use crate::smd::{NoRefreshPolicy, SmdMode};
    use crate::spec::Ddr4Spec;

    fn controller() -> Controller<Ddr4Spec> {
        let config = ControllerConfig {
            banks_per_bg: 2,
            row_policy: RowPolicy::Opened,
            write_drain_threshold: 32,
            write_drain_exit_threshold: 8,
            combined_policy_threshold: 4,
            max_row_open_cycles: 0,
            ref_tracker_timeout_period: 1000,
            nack_resend_cycles: 64,
            para_probability_permille: 0,
        };
        let rank_maintenance = RankMaintenance::new(0, SmdMode::Rsq, vec![Box::new(NoRefreshPolicy)]);
        Controller::new(config, Ddr4Spec::default(), rank_maintenance, Box::new(NullEnergyModel), 7)
    }

    fn controller_with_mode(mode: SmdMode) -> Controller<Ddr4Spec> {
        let config = ControllerConfig {
            banks_per_bg: 2,
            row_policy: RowPolicy::Opened,
            write_drain_threshold: 32,
            write_drain_exit_threshold: 8,
            combined_policy_threshold: 4,
            max_row_open_cycles: 0,
            ref_tracker_timeout_period: 1000,
            nack_resend_cycles: 64,
            para_probability_permille: 0,
        };
        let rank_maintenance = RankMaintenance::new(0, mode, vec![Box::new(NoRefreshPolicy)]);
        Controller::new(config, Ddr4Spec::default(), rank_maintenance, Box::new(NullEnergyModel), 7)
    }

    #[test]
    fn a_locked_subarray_nacks_the_act_targeting_it() {
        let mut c = controller_with_mode(SmdMode::ActNack);
        let addr = AddrVec::new(0, 0, 0, 0, 3, 5, 0);
        let bank_id = addr.global_bank_id(c.config.banks_per_bg);
        c.rank_maintenance.lock_mut(0, bank_id).acquire(0, bank_id, 3).unwrap();
        let outcome = c.try_act_nack(&addr);
        assert_eq!(outcome, Some(SmdOutcome::Nacked));
    }

    #[test]
    fn a_lock_on_a_different_subarray_of_the_same_bank_only_partially_nacks() {
        let mut c = controller_with_mode(SmdMode::ActNack);
        let addr = AddrVec::new(0, 0, 0, 0, 3, 5, 0);
        let bank_id = addr.global_bank_id(c.config.banks_per_bg);
        c.rank_maintenance.lock_mut(0, bank_id).acquire(0, bank_id, 7).unwrap();
        let outcome = c.try_act_nack(&addr);
        assert_eq!(outcome, Some(SmdOutcome::PartialNacked));
    }

    #[test]
    fn an_unlocked_bank_permits_the_act() {
        let mut c = controller_with_mode(SmdMode::ActNack);
        let addr = AddrVec::new(0, 0, 0, 0, 3, 5, 0);
        assert_eq!(c.try_act_nack(&addr), None);
    }

    #[test]
    fn an_rsq_response_populates_the_tracker_from_held_locks() {
        let mut c = controller_with_mode(SmdMode::Rsq);
        c.rank_maintenance.lock_mut(0, 2).acquire(0, 2, 1).unwrap();
        c.pending.push_back(PendingEntry {
            depart_clk: c.clk,
            item: Pending::StatusQuery { rank_id: 0 },
        });
        c.retire_completed();
        assert!(c.rank_maintenance.tracker().is_busy(2, 1, c.clk));
    }

    #[test]
    fn maybe_para_never_queues_a_neighbor_past_the_last_row() {
        let mut c = controller();
        c.config.para_probability_permille = 1000;
        let last_row = c.spec.org().count[Level::Row.index()] - 1;
        let addr = AddrVec::new(0, 0, 0, 0, 0, last_row, 0);
        c.maybe_para(&addr, 0);
        assert_eq!(c.stats.preventive_refreshes, 1);
    }

    #[test]
    fn enqueue_respects_capacity() {
        let mut c = controller();
        assert!(c.enqueue(AddrVec::default(), RequestType::Read, 1));
        assert!(!c.enqueue(AddrVec::default(), RequestType::Read, 1));
    }

    #[test]
    fn a_read_eventually_retires() {
        let mut c = controller();
        c.enqueue(AddrVec::new(0, 0, 0, 0, 0, 5, 0), RequestType::Read, 16);
        for _ in 0..500 {
            c.tick();
        }
        assert_eq!(c.stats().reads_retired, 1);
    }

    #[test]
    fn write_mode_engages_once_the_write_queue_crosses_the_threshold() {
        let mut c = controller();
        c.config.write_drain_threshold = 1;
        c.enqueue(AddrVec::new(0, 0, 0, 0, 0, 0, 0), RequestType::Write, 16);
        c.select_mode();
        assert!(c.write_mode);
    }
}
