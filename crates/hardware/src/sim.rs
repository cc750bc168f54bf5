//! Top-level simulation: builds a [`Controller`] and its [`RankMaintenance`]
//! from a [`Config`], and drives them tick by tick.
//!
//! Trace-file parsing and command-trace recording are deliberately kept out
//! of this module — `Simulator` exposes [`Simulator::enqueue`] and
//! [`Simulator::tick`] as the only way in and out; turning an address trace
//! file into `enqueue` calls, and an issued command into a CSV line, is the
//! caller's job (see the `smd-cli` crate).

use crate::bloom::{BloomFilter, DualCountingBloomFilter};
use crate::common::addr::AddrVec;
use crate::config::{Config, RefreshPolicyConfig, RowHammerDefenseConfig, RowPolicyConfig};
use crate::controller::{Controller, ControllerConfig, MemoryScrubber, RaidrRefresh};
use crate::energy::{EnergyModel, NullEnergyModel};
use crate::request::RequestType;
use crate::scheduler::RowPolicy;
use crate::smd::{
    EccScrubbingPolicy, FixedRateRefreshPolicy, MaintenanceMachine, NoRefreshPolicy, RankMaintenance, RowHammerDefense,
    RowHammerProtectionPolicy, VariableRefreshPolicy,
};
use crate::spec::{default_speed, Ddr4Spec, OrgEntry};
use crate::stats::Stats;

/// Owns the device tree (via its [`Controller`]) and drives it one tick at a
/// time. Single-rank, single-channel: a multi-rank simulation is one
/// `Simulator` per rank, run side by side by the caller.
pub struct Simulator {
    controller: Controller<Ddr4Spec>,
    queue_capacity: usize,
    /// Controller-driven retention-aware refresh, present only when
    /// `smd_enabled = false` (chip-side SMD maintenance replaced by a
    /// controller-side baseline).
    raidr: Option<RaidrRefresh>,
    /// Controller-driven periodic ECC scrub sweep, present only alongside
    /// [`Self::raidr`].
    scrubber: Option<MemoryScrubber>,
}

impl Simulator {
    /// Builds a simulator from a parsed [`Config`], seeding every PRNG
    /// (PARA rolls, Bloom filter hashing) from `rng_seed` — never from time,
    /// per the determinism requirement.
    #[must_use]
    pub fn from_config(config: &Config, rng_seed: u64) -> Self {
        Self::with_energy_model(config, Box::new(NullEnergyModel), rng_seed)
    }

    /// As [`Self::from_config`], but with an explicit energy model (e.g. a
    /// [`crate::energy::CountingEnergyModel`] or a DRAMPower integration).
    #[must_use]
    pub fn with_energy_model(config: &Config, energy: Box<dyn EnergyModel>, rng_seed: u64) -> Self {
        let org = OrgEntry {
            count: [
                1,
                1,
                config.bank_groups,
                config.banks_per_group,
                config.subarrays_per_bank,
                config.rows_per_subarray,
                config.columns_per_row,
            ],
        };
        let spec = Ddr4Spec::new(org, default_speed(), config.per_bank_refresh);

        let controller_config = ControllerConfig {
            banks_per_bg: config.banks_per_group,
            row_policy: row_policy_from_config(config.row_policy),
            write_drain_threshold: config.write_drain_threshold,
            write_drain_exit_threshold: (config.write_drain_threshold / 4).max(1),
            combined_policy_threshold: config.combined_policy_threshold,
            max_row_open_cycles: config.max_row_open_intervals.saturating_mul(config.ref_tracker_timeout_period),
            ref_tracker_timeout_period: config.ref_tracker_timeout_period,
            nack_resend_cycles: config.act_nack_resend_clocks,
            para_probability_permille: config.para_probability_permille,
        };

        let policies = if config.smd_enabled {
            build_maintenance_policies(config)
        } else {
            vec![Box::new(NoRefreshPolicy) as Box<dyn MaintenanceMachine>]
        };
        let rank_maintenance = RankMaintenance::new(0, config.smd_mode, policies);

        let (raidr, scrubber) = if config.smd_enabled {
            (None, None)
        } else {
            let counts4 = [config.bank_groups, config.banks_per_group, config.subarrays_per_bank, config.rows_per_subarray];
            let refresh_period = per_unit_period(config, default_speed().n_refi);
            let raidr = RaidrRefresh::new(0, counts4, refresh_period, BloomFilter::new(0, config.bloom_size_bits, config.bloom_num_hashes));
            let banks_per_rank = config.bank_groups * config.banks_per_group;
            let scrubber = MemoryScrubber::from_period(
                [1, banks_per_rank, config.subarrays_per_bank, config.rows_per_subarray],
                config.scrub_period_clocks,
            );
            (Some(raidr), Some(scrubber))
        };

        Self {
            controller: Controller::new(controller_config, spec, rank_maintenance, energy, rng_seed),
            queue_capacity: config.queue_capacity,
            raidr,
            scrubber,
        }
    }

    /// Enqueues a CPU-originated access. Returns `false` if the combined
    /// queue depth is already at capacity; the caller retries on a later
    /// tick (an expected runtime condition, never an error).
    pub fn enqueue(&mut self, addr: AddrVec, kind: RequestType) -> bool {
        self.controller.enqueue(addr, kind, self.queue_capacity)
    }

    /// A chip raised its out-of-band SMD alert for `rank_id` (always `0` in
    /// this single-rank model, but threaded through for a future multi-rank
    /// `Simulator`).
    pub fn signal_alert(&mut self, rank_id: u32) {
        self.controller.signal_alert(rank_id);
    }

    /// Advances the simulation by one clock.
    pub fn tick(&mut self) {
        self.poll_controller_side_maintenance();
        self.controller.tick();
    }

    /// Feeds any due controller-driven maintenance (RAIDR refresh, periodic
    /// scrub) into the request queues as ordinary [`RequestType::Maintenance`]
    /// traffic, ahead of the chip-side SMD machinery this tick would
    /// otherwise run. A full queue silently drops the attempt for this tick
    /// — maintenance catches up on the next due cycle, same as a `false`
    /// return from [`Self::enqueue`] tells a CPU-side caller to retry.
    fn poll_controller_side_maintenance(&mut self) {
        let clk = self.controller.clk();
        if let Some(raidr) = &mut self.raidr {
            if let Some(addr) = raidr.tick(clk) {
                let _ = self.controller.enqueue(addr, RequestType::Maintenance, self.queue_capacity);
            }
        }
        if let Some(scrubber) = &mut self.scrubber {
            if let Some(addr) = scrubber.tick(clk) {
                let _ = self.controller.enqueue(addr, RequestType::Maintenance, self.queue_capacity);
            }
        }
    }

    /// Advances the simulation by `n` clocks.
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Current simulated clock.
    #[must_use]
    pub const fn clk(&self) -> u64 {
        self.controller.clk()
    }

    /// Accumulated statistics.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        self.controller.stats()
    }
}

fn row_policy_from_config(config: RowPolicyConfig) -> RowPolicy {
    match config {
        RowPolicyConfig::Opened => RowPolicy::Opened,
        RowPolicyConfig::Closed => RowPolicy::Closed,
        RowPolicyConfig::Timeout { idle_cycles } => RowPolicy::Timeout { idle_cycles },
    }
}

/// `tREFI` (or the ECC scrub period), spread evenly across every
/// (bank-group, bank, subarray) unit, so a full pass completes once every
/// `period` clocks.
fn per_unit_period(config: &Config, period_clocks: u64) -> u64 {
    let units = u64::from(config.bank_groups.max(1)) * u64::from(config.banks_per_group.max(1)) * u64::from(config.subarrays_per_bank.max(1));
    (period_clocks / units.max(1)).max(1)
}

fn build_maintenance_policies(config: &Config) -> Vec<Box<dyn MaintenanceMachine>> {
    let counts = [config.bank_groups, config.banks_per_group, config.subarrays_per_bank];
    let hold_cycles = config.single_ref_latency_clocks * u64::from(config.row_refresh_granularity);
    let backlog_limit = config.maintenance_backlog_limit;
    let mut policies: Vec<Box<dyn MaintenanceMachine>> = Vec::new();

    let refresh_period = per_unit_period(config, default_speed().n_refi);
    policies.push(match config.refresh_policy {
        RefreshPolicyConfig::FixedRate => {
            Box::new(FixedRateRefreshPolicy::new(0, counts, refresh_period, hold_cycles, backlog_limit))
        }
        RefreshPolicyConfig::None => Box::new(NoRefreshPolicy) as Box<dyn MaintenanceMachine>,
        RefreshPolicyConfig::Variable => Box::new(VariableRefreshPolicy::new(
            FixedRateRefreshPolicy::new(0, counts, refresh_period, hold_cycles, backlog_limit),
            BloomFilter::new(0, config.bloom_size_bits, config.bloom_num_hashes),
            config.rows_per_subarray,
        )),
    });

    if config.ecc_scrubbing_enabled {
        let scrub_period = per_unit_period(config, config.scrub_period_clocks);
        policies.push(Box::new(EccScrubbingPolicy::new(FixedRateRefreshPolicy::new(
            0,
            counts,
            scrub_period,
            hold_cycles,
            backlog_limit,
        ))));
    }

    if let Some(defense) = config.row_hammer_defense {
        let defense = match defense {
            RowHammerDefenseConfig::Para => RowHammerDefense::Para {
                probability_permille: config.para_probability_permille,
            },
            RowHammerDefenseConfig::Cbf => RowHammerDefense::Cbf {
                threshold: config.graphene_threshold,
            },
            RowHammerDefenseConfig::Graphene => RowHammerDefense::Graphene {
                threshold: config.graphene_threshold,
            },
        };
        let max_counter = config.graphene_threshold.min(u32::from(u8::MAX)) as u8;
        let activity = DualCountingBloomFilter::new(1, config.bloom_size_bits, config.bloom_num_hashes, max_counter.max(1));
        policies.push(Box::new(RowHammerProtectionPolicy::new(defense, activity, config.rows_per_subarray)));
    }

    policies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_single_enqueued_read_eventually_retires() {
        let config = Config::default();
        let mut sim = Simulator::from_config(&config, 7);
        assert!(sim.enqueue(AddrVec::new(0, 0, 0, 0, 0, 5, 0), RequestType::Read));
        sim.run(2000);
        assert_eq!(sim.stats().reads_retired, 1);
    }

    #[test]
    fn enqueue_respects_the_configured_queue_capacity() {
        let mut config = Config::default();
        config.queue_capacity = 1;
        let mut sim = Simulator::from_config(&config, 1);
        assert!(sim.enqueue(AddrVec::default(), RequestType::Read));
        assert!(!sim.enqueue(AddrVec::default(), RequestType::Read));
    }

    #[test]
    fn variable_refresh_config_builds_without_refreshing_less_than_fixed_rate_would() {
        let mut config = Config::default();
        config.refresh_policy = RefreshPolicyConfig::Variable;
        let mut sim = Simulator::from_config(&config, 3);
        sim.run(10_000);
        assert_eq!(sim.clk(), 10_000);
    }

    #[test]
    fn smd_disabled_falls_back_to_controller_driven_maintenance() {
        let mut config = Config::default();
        config.smd_enabled = false;
        let mut sim = Simulator::from_config(&config, 5);
        assert!(sim.enqueue(AddrVec::new(0, 0, 0, 0, 0, 5, 0), RequestType::Read));
        sim.run(5_000);
        assert_eq!(sim.stats().reads_retired, 1);
    }

    #[test]
    fn row_hammer_defense_can_run_alongside_refresh_and_ecc_scrubbing() {
        let mut config = Config::default();
        config.row_hammer_defense = Some(RowHammerDefenseConfig::Graphene);
        config.ecc_scrubbing_enabled = true;
        let mut sim = Simulator::from_config(&config, 11);
        sim.run(1000);
        assert_eq!(sim.clk(), 1000);
    }
}
