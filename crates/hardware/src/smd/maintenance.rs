//! Maintenance policies: the chip-autonomous operations SMD lets a DRAM
//! device run without a controller command, modeled here as pollable state
//! machines the simulator drives once per tick.

use std::collections::HashMap;
use std::fmt;

use crate::bloom::{BloomFilter, DualCountingBloomFilter};
use crate::common::addr::AddrVec;
use crate::common::constants::REFRESH_RELAXING_FACTOR;
use crate::common::error::SimError;

use super::lock::SaLock;

/// Tracks a periodic event: fires once `clk` reaches `next_due`, then
/// reschedules itself `period` clocks later (never drifting from the
/// original cadence, so a late tick doesn't compound into permanent skew).
///
/// Each firing also adds one unit to `pending_maint`, the backlog of
/// maintenance obligations this counter has scheduled but not yet seen
/// serviced; [`Self::service`] pays it back down, [`Self::record_rollback`]
/// only notes that a firing went unserviced. Exceeding `limit` is fatal —
/// the configured policy cannot keep up with its own schedule.
#[derive(Debug, Clone, Copy)]
pub struct MaintenanceCounter {
    period: u64,
    next_due: u64,
    pending_maint: u64,
    rollbacks: u64,
    limit: u64,
}

impl MaintenanceCounter {
    /// Builds a counter whose first event fires at `period`, aborting once
    /// its backlog exceeds `limit`.
    #[must_use]
    pub const fn new(period: u64, limit: u64) -> Self {
        Self {
            period,
            next_due: period,
            pending_maint: 0,
            rollbacks: 0,
            limit,
        }
    }

    /// True if the event is due at or before `clk`.
    #[must_use]
    pub const fn due(&self, clk: u64) -> bool {
        clk >= self.next_due
    }

    /// Reschedules the next occurrence and records one more unit entering
    /// the backlog. Fatal ([`SimError::MaintenanceBacklogExceeded`]) once
    /// `pending_maint` exceeds `limit`.
    pub fn advance(&mut self, chip: u32, bank: u32) -> Result<(), SimError> {
        self.next_due += self.period;
        self.pending_maint += 1;
        if self.pending_maint > self.limit {
            return Err(SimError::MaintenanceBacklogExceeded {
                chip,
                bank,
                pending: self.pending_maint,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Pays down one unit of backlog once a due unit is actually serviced
    /// (its lock successfully acquired).
    pub fn service(&mut self) {
        self.pending_maint = self.pending_maint.saturating_sub(1);
    }

    /// Records that a due unit could not be serviced this tick because its
    /// lock was still held by a previous, unreleased reservation. The
    /// backlog itself was already counted by [`Self::advance`]; this only
    /// tracks how often the engine fell behind.
    pub fn record_rollback(&mut self) {
        self.rollbacks += 1;
    }

    /// The configured period, in clocks.
    #[must_use]
    pub const fn period(&self) -> u64 {
        self.period
    }

    /// Current backlog of scheduled-but-unserviced maintenance obligations.
    #[must_use]
    pub const fn pending_maint(&self) -> u64 {
        self.pending_maint
    }

    /// Count of firings that found their target lock still held.
    #[must_use]
    pub const fn rollbacks(&self) -> u64 {
        self.rollbacks
    }
}

/// A pollable maintenance state machine. `poll` is called once per
/// controller tick and returns the addresses (if any) that need a
/// maintenance command issued this tick. Implementations that reserve a
/// subarray for the duration of their work do so through `locks`, the
/// rank's shared per-(chip, bank) lock table.
pub trait MaintenanceMachine: fmt::Debug + Send + Sync {
    /// Returns addresses due for maintenance at `clk`, advancing internal
    /// counters (and this machine's own locks, if any) as a side effect.
    /// Empty if nothing is due.
    fn poll(&mut self, clk: u64, locks: &mut HashMap<(u32, u32), SaLock>) -> Vec<AddrVec>;

    /// Called by the controller on every ACT it issues, so a RowHammer
    /// policy can observe activity without the controller knowing which
    /// maintenance machine (if any) cares. A no-op for every other policy.
    fn on_activate(&mut self, _addr: &AddrVec, _roll_permille: u32) {}

    /// A short name for stats/trace labeling.
    fn name(&self) -> &'static str;
}

/// Cycles sequentially through every (bank-group, bank, subarray) triple of
/// one rank, refreshing one per `period` clocks — the conventional
/// fixed-rate refresh every DDR4 rank runs regardless of SMD.
///
/// Each due unit reserves its subarray's [`SaLock`] for `hold_cycles`
/// clocks (`single_ref_latency_clocks * row_refresh_granularity`), modeling
/// the chip-autonomous refresh actually occupying the subarray; the lock is
/// released the tick `hold_cycles` elapses, before the next due unit is
/// attempted.
#[derive(Debug, Clone)]
pub struct FixedRateRefreshPolicy {
    counter: MaintenanceCounter,
    counts: [u32; 3],
    cursor: [u32; 3],
    rank: u32,
    hold_cycles: u64,
    held: Option<(u32, u32, u64)>,
}

impl FixedRateRefreshPolicy {
    /// `counts` is `[bank_groups, banks_per_group, subarrays_per_bank]`;
    /// `period` is the per-unit refresh interval (`tREFI / total units`);
    /// `hold_cycles` is how long each due unit's subarray lock is held;
    /// `backlog_limit` is the fatal `pending_maint` ceiling.
    #[must_use]
    pub const fn new(rank: u32, counts: [u32; 3], period: u64, hold_cycles: u64, backlog_limit: u64) -> Self {
        Self {
            counter: MaintenanceCounter::new(period, backlog_limit),
            counts,
            cursor: [0, 0, 0],
            rank,
            hold_cycles,
            held: None,
        }
    }

    const fn current_bank(&self) -> u32 {
        self.cursor[0] * self.counts[1] + self.cursor[1]
    }

    fn advance_cursor(&mut self) {
        self.cursor[2] += 1;
        if self.cursor[2] >= self.counts[2] {
            self.cursor[2] = 0;
            self.cursor[1] += 1;
            if self.cursor[1] >= self.counts[1] {
                self.cursor[1] = 0;
                self.cursor[0] = (self.cursor[0] + 1) % self.counts[0].max(1);
            }
        }
    }

    fn release_if_due(&mut self, clk: u64, locks: &mut HashMap<(u32, u32), SaLock>) {
        let Some((bank, _subarray, release_at)) = self.held else {
            return;
        };
        if clk < release_at {
            return;
        }
        if let Some(lock) = locks.get_mut(&(0, bank)) {
            lock.release(0, bank).expect("releasing a lock this policy itself acquired");
        }
        self.held = None;
    }
}

impl MaintenanceMachine for FixedRateRefreshPolicy {
    fn poll(&mut self, clk: u64, locks: &mut HashMap<(u32, u32), SaLock>) -> Vec<AddrVec> {
        self.release_if_due(clk, locks);
        if !self.counter.due(clk) {
            return Vec::new();
        }
        let bank = self.current_bank();
        self.counter.advance(0, bank).expect("maintenance backlog exceeded its configured limit");
        let subarray = self.cursor[2];
        let lock = locks.entry((0, bank)).or_insert_with(SaLock::new);
        if lock.is_held() && lock.held_subarray() != Some(subarray) {
            // this bank's previous reservation hasn't been released yet —
            // the policy has fallen behind its own hold duration. Roll this
            // due unit back rather than race the still-held subarray.
            self.counter.record_rollback();
            return Vec::new();
        }
        lock.acquire(0, bank, subarray).expect("acquiring a lock this check just confirmed is free or already ours");
        self.counter.service();
        self.held = Some((bank, subarray, clk + self.hold_cycles));
        let addr = AddrVec::new(0, self.rank, self.cursor[0], self.cursor[1], self.cursor[2], 0, 0);
        self.advance_cursor();
        vec![addr]
    }

    fn name(&self) -> &'static str {
        "fixed_rate_refresh"
    }
}

/// No refresh at all: an intentionally unsafe baseline used to quantify the
/// data-loss risk other policies are protecting against. Never the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefreshPolicy;

impl MaintenanceMachine for NoRefreshPolicy {
    fn poll(&mut self, _clk: u64, _locks: &mut HashMap<(u32, u32), SaLock>) -> Vec<AddrVec> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "no_refresh"
    }
}

/// Retention-aware refresh: rows a [`BloomFilter`] marks as weak (measured
/// or predicted short retention) are refreshed every period; rows not in
/// the filter are refreshed only every [`REFRESH_RELAXING_FACTOR`]-th
/// period, trading a small false-positive-driven over-refresh rate for a
/// large reduction in refresh traffic on strong rows.
#[derive(Debug, Clone)]
pub struct VariableRefreshPolicy {
    inner: FixedRateRefreshPolicy,
    weak_rows: BloomFilter,
    relax_counter: u32,
    rows_per_subarray: u32,
}

impl VariableRefreshPolicy {
    /// Builds a variable-rate policy around a [`FixedRateRefreshPolicy`]
    /// cursor, consulting `weak_rows` to decide whether a given period's
    /// due unit actually needs refreshing.
    #[must_use]
    pub const fn new(inner: FixedRateRefreshPolicy, weak_rows: BloomFilter, rows_per_subarray: u32) -> Self {
        Self {
            inner,
            weak_rows,
            relax_counter: 0,
            rows_per_subarray,
        }
    }

    /// Marks a row as weak (short-retention), from a retention-test result
    /// or a controller-side predictor.
    pub fn mark_weak(&mut self, addr: &AddrVec) {
        self.weak_rows.insert(addr.row_in_bank_id(self.rows_per_subarray));
    }
}

impl MaintenanceMachine for VariableRefreshPolicy {
    fn poll(&mut self, clk: u64, locks: &mut HashMap<(u32, u32), SaLock>) -> Vec<AddrVec> {
        let due = self.inner.poll(clk, locks);
        if due.is_empty() {
            return due;
        }
        self.relax_counter = (self.relax_counter + 1) % REFRESH_RELAXING_FACTOR;
        due.into_iter()
            .filter(|addr| {
                self.weak_rows.contains(addr.row_in_bank_id(self.rows_per_subarray))
                    || self.relax_counter == 0
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "variable_refresh"
    }
}

/// Periodic ECC scrub: cycles through every row like refresh, but issues a
/// read (not a refresh command) so the controller's normal ECC-correction
/// path repairs any accumulated error before it becomes uncorrectable.
#[derive(Debug, Clone)]
pub struct EccScrubbingPolicy {
    inner: FixedRateRefreshPolicy,
}

impl EccScrubbingPolicy {
    /// Builds a scrubbing policy with the same cadence shape as refresh,
    /// but a (typically much longer) scrub period.
    #[must_use]
    pub const fn new(inner: FixedRateRefreshPolicy) -> Self {
        Self { inner }
    }
}

impl MaintenanceMachine for EccScrubbingPolicy {
    fn poll(&mut self, clk: u64, locks: &mut HashMap<(u32, u32), SaLock>) -> Vec<AddrVec> {
        self.inner.poll(clk, locks)
    }

    fn name(&self) -> &'static str {
        "ecc_scrubbing"
    }
}

/// Which RowHammer defense a [`RowHammerProtectionPolicy`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowHammerDefense {
    /// Probabilistic Adjacent Row Activation: each ACT has a small chance
    /// of also refreshing a neighboring row.
    Para { probability_permille: u32 },
    /// Counter-based filter: a per-row activation counter, refreshing
    /// neighbors once a row crosses a threshold, tracked via a counting
    /// Bloom filter pair to bound memory.
    Cbf { threshold: u32 },
    /// Graphene: an exact small activation-count table per bank with
    /// spillover handling, refreshing neighbors at the threshold.
    Graphene { threshold: u32 },
}

/// Detects hammering and schedules preventive refreshes of the rows
/// adjacent to an aggressor, per the selected [`RowHammerDefense`].
///
/// Unlike the refresh-family policies, this one never locks a subarray: its
/// neighbor refreshes are ordinary queued maintenance requests (the same
/// treatment the controller's own PARA gives its preventive refreshes), not
/// chip-autonomous work the controller needs advance warning about.
#[derive(Debug, Clone)]
pub struct RowHammerProtectionPolicy {
    defense: RowHammerDefense,
    activity: DualCountingBloomFilter,
    pending: Vec<AddrVec>,
    rows_per_subarray: u32,
}

impl RowHammerProtectionPolicy {
    /// Builds a protection policy around the given defense variant. The
    /// counting filter tracks per-row activation counts for CBF/Graphene;
    /// PARA ignores it and rolls an independent chance per ACT instead.
    #[must_use]
    pub const fn new(defense: RowHammerDefense, activity: DualCountingBloomFilter, rows_per_subarray: u32) -> Self {
        Self {
            defense,
            activity,
            pending: Vec::new(),
            rows_per_subarray,
        }
    }

    /// Queues preventive refreshes of `addr`'s row's in-range neighbors
    /// (`row - 1` skipped at row 0, `row + 1` skipped at the last row).
    fn queue_neighbors(&mut self, addr: &AddrVec) {
        let row = addr.get(crate::common::addr::Level::Row);
        let mut neighbors = Vec::with_capacity(2);
        if let Some(low) = row.checked_sub(1) {
            neighbors.push(low);
        }
        if row + 1 < self.rows_per_subarray {
            neighbors.push(row + 1);
        }
        for neighbor in neighbors {
            let mut n = *addr;
            n.set(crate::common::addr::Level::Row, neighbor);
            self.pending.push(n);
        }
    }
}

impl MaintenanceMachine for RowHammerProtectionPolicy {
    fn poll(&mut self, _clk: u64, _locks: &mut HashMap<(u32, u32), SaLock>) -> Vec<AddrVec> {
        std::mem::take(&mut self.pending)
    }

    /// Queues preventive refreshes of this ACT's row's neighbors if it
    /// crosses the configured defense's threshold, or (for PARA) on an
    /// independent random roll supplied by the controller.
    fn on_activate(&mut self, addr: &AddrVec, roll_permille: u32) {
        let row_id = addr.row_in_bank_id(self.rows_per_subarray);
        match self.defense {
            RowHammerDefense::Para { probability_permille } => {
                if roll_permille < probability_permille {
                    self.queue_neighbors(addr);
                }
            }
            RowHammerDefense::Cbf { threshold } | RowHammerDefense::Graphene { threshold } => {
                self.activity.insert(row_id);
                if threshold > 0 && self.activity.contains(row_id) {
                    self.queue_neighbors(addr);
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        match self.defense {
            RowHammerDefense::Para { .. } => "para",
            RowHammerDefense::Cbf { .. } => "cbf",
            RowHammerDefense::Graphene { .. } => "graphene",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rate_cursor_visits_every_unit_before_repeating() {
        let mut policy = FixedRateRefreshPolicy::new(0, [2, 2, 2], 10, 1, 64);
        let mut locks = HashMap::new();
        let mut seen = std::collections::HashSet::new();
        for tick in 1..=9 {
            let due = policy.poll(tick * 10, &mut locks);
            if let Some(addr) = due.first() {
                seen.insert((addr.get(crate::common::addr::Level::BankGroup), addr.get(crate::common::addr::Level::Bank), addr.get(crate::common::addr::Level::Subarray)));
            }
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn fixed_rate_refresh_acquires_and_releases_its_subarray_lock() {
        let mut policy = FixedRateRefreshPolicy::new(0, [1, 1, 2], 10, 5, 64);
        let mut locks = HashMap::new();
        let due = policy.poll(10, &mut locks);
        assert_eq!(due.len(), 1);
        assert!(locks.get(&(0, 0)).unwrap().is_held());
        // Lock still held before hold_cycles elapses.
        policy.release_if_due(14, &mut locks);
        assert!(locks.get(&(0, 0)).unwrap().is_held());
        policy.release_if_due(15, &mut locks);
        assert!(!locks.get(&(0, 0)).unwrap().is_held());
    }

    #[test]
    fn falling_behind_rolls_back_instead_of_double_locking() {
        // hold_cycles outlasts the refresh period, so the second due unit
        // (a different subarray of the same bank) finds the bank's lock
        // still held and must roll back rather than violate exclusivity.
        let mut policy = FixedRateRefreshPolicy::new(0, [1, 1, 2], 5, 20, 64);
        let mut locks = HashMap::new();
        assert_eq!(policy.poll(5, &mut locks).len(), 1);
        assert_eq!(policy.poll(10, &mut locks).len(), 0);
        assert_eq!(policy.counter.rollbacks(), 1);
    }

    #[test]
    #[should_panic(expected = "maintenance backlog exceeded its configured limit")]
    fn an_unbounded_backlog_is_fatal() {
        let mut policy = FixedRateRefreshPolicy::new(0, [1, 1, 2], 1, 200, 2);
        let mut locks = HashMap::new();
        for tick in 1..=5 {
            policy.poll(tick, &mut locks);
        }
    }

    #[test]
    fn para_queues_both_neighbors_on_a_hit_roll() {
        let mut policy = RowHammerProtectionPolicy::new(
            RowHammerDefense::Para { probability_permille: 500 },
            DualCountingBloomFilter::new(1, 8, 2, 7),
            1024,
        );
        let addr = AddrVec::new(0, 0, 0, 0, 0, 100, 0);
        policy.on_activate(&addr, 0);
        let mut locks = HashMap::new();
        let due = policy.poll(0, &mut locks);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].get(crate::common::addr::Level::Row), 99);
        assert_eq!(due[1].get(crate::common::addr::Level::Row), 101);
    }

    #[test]
    fn row_zero_never_queues_a_negative_neighbor() {
        let mut policy = RowHammerProtectionPolicy::new(
            RowHammerDefense::Para { probability_permille: 1000 },
            DualCountingBloomFilter::new(1, 8, 2, 7),
            1024,
        );
        let addr = AddrVec::new(0, 0, 0, 0, 0, 0, 0);
        policy.on_activate(&addr, 0);
        let mut locks = HashMap::new();
        let due = policy.poll(0, &mut locks);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].get(crate::common::addr::Level::Row), 1);
    }

    #[test]
    fn last_row_never_queues_an_out_of_range_neighbor() {
        let mut policy = RowHammerProtectionPolicy::new(
            RowHammerDefense::Para { probability_permille: 1000 },
            DualCountingBloomFilter::new(1, 8, 2, 7),
            1024,
        );
        let addr = AddrVec::new(0, 0, 0, 0, 0, 1023, 0);
        policy.on_activate(&addr, 0);
        let mut locks = HashMap::new();
        let due = policy.poll(0, &mut locks);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].get(crate::common::addr::Level::Row), 1022);
    }
}
