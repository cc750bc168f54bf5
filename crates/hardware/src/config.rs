//! Simulation configuration: JSON-deserializable, with a `defaults` module
//! providing the baseline constants used when a config omits a field.

use serde::Deserialize;

use crate::smd::SmdMode;

/// Baseline constants, mirrored into [`Config::default`]. Kept in their own
/// module so a value can be referenced from documentation or tests without
/// constructing a full [`Config`].
pub mod defaults {
    /// Bank groups per rank.
    pub const BANK_GROUPS: u32 = 2;
    /// Banks per bank group.
    pub const BANKS_PER_GROUP: u32 = 2;
    /// Subarrays per bank.
    pub const SUBARRAYS_PER_BANK: u32 = 8;
    /// Rows per subarray.
    pub const ROWS_PER_SUBARRAY: u32 = 8192;
    /// Columns per row.
    pub const COLUMNS_PER_ROW: u32 = 128;

    /// Maximum requests held across all queues before backpressure applies.
    pub const QUEUE_CAPACITY: usize = 64;
    /// Writes accumulated before the controller switches to write-drain mode.
    pub const WRITE_DRAIN_THRESHOLD: usize = 32;

    /// ACT-to-NACK-decision window, in clocks, when running in ACT_NACK mode.
    pub const ACT_NACK_RESEND_CLOCKS: u64 = 64;
    /// Full-device ECC scrub period, in clocks.
    pub const SCRUB_PERIOD_CLOCKS: u64 = 64_000_000_000;
    /// Graphene per-row activation threshold before a preventive refresh fires.
    pub const GRAPHENE_THRESHOLD: u32 = 1024;
    /// Graphene per-bank table reset period, in clocks.
    pub const GRAPHENE_RESET_PERIOD_CLOCKS: u64 = 64_000_000;
    /// PARA's per-ACT preventive-refresh probability, in parts per thousand.
    pub const PARA_PROBABILITY_PERMILLE: u32 = 2;
    /// Bloom filter size, as a power of two slots.
    pub const BLOOM_SIZE_BITS: u32 = 16;
    /// Number of independent H3 hash functions per Bloom filter.
    pub const BLOOM_NUM_HASHES: usize = 4;

    /// Partially-NACK'd-contenders threshold before the controller prefers
    /// a PRE over waiting.
    pub const COMBINED_POLICY_THRESHOLD: usize = 4;
    /// Row-open-duration multiplier before a column command auto-precharges;
    /// `0` disables forcing.
    pub const MAX_ROW_OPEN_INTERVALS: u64 = 0;
    /// Clocks before an RSQ/Alert tracker entry is considered stale.
    pub const REF_TRACKER_TIMEOUT_PERIOD: u64 = 1000;

    /// Per-row refresh latency, in clocks, for a chip-side maintenance lock hold.
    pub const SINGLE_REF_LATENCY_CLOCKS: u64 = 8;
    /// Rows refreshed per maintenance lock hold (`smd_row_refresh_granularity`).
    pub const ROW_REFRESH_GRANULARITY: u32 = 8;
    /// Maximum `pending_maint` backlog a maintenance counter may accumulate
    /// before the simulator aborts (the policy cannot keep up).
    pub const MAINTENANCE_BACKLOG_LIMIT: u64 = 8;
}

/// How the controller decides whether a RD/WR auto-precharges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicyConfig {
    /// Never auto-precharge ("open-page").
    #[default]
    Opened,
    /// Always auto-precharge ("closed-page").
    Closed,
    /// Auto-precharge after an idle timeout.
    Timeout {
        /// Idle clocks before a row auto-precharges.
        idle_cycles: u64,
    },
}

/// Which per-chip refresh algorithm runs (`smd_ref_policy`). Independent of
/// ECC scrubbing and RowHammer defense — a config may enable any combination
/// of the three, since each guards against a different failure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicyConfig {
    /// Conventional fixed-rate refresh every `tREFI`.
    #[default]
    FixedRate,
    /// Retention-aware refresh via a weak-row Bloom filter.
    Variable,
    /// No refresh at all (unsafe; for risk-quantification baselines only).
    None,
}

/// RowHammer defense variant, mirroring [`crate::smd::RowHammerDefense`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowHammerDefenseConfig {
    /// Probabilistic Adjacent Row Activation.
    Para,
    /// Counter-based Bloom filter.
    Cbf,
    /// Graphene exact per-bank table.
    Graphene,
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bank groups per rank.
    pub bank_groups: u32,
    /// Banks per bank group.
    pub banks_per_group: u32,
    /// Subarrays per bank.
    pub subarrays_per_bank: u32,
    /// Rows per subarray.
    pub rows_per_subarray: u32,
    /// Columns per row.
    pub columns_per_row: u32,

    /// Whether REF targets a single bank instead of the whole rank.
    pub per_bank_refresh: bool,
    /// Row-buffer management policy.
    pub row_policy: RowPolicyConfig,
    /// Per-chip refresh algorithm.
    pub refresh_policy: RefreshPolicyConfig,
    /// Whether the periodic ECC scrub sweep runs alongside refresh.
    pub ecc_scrubbing_enabled: bool,
    /// Which RowHammer defense runs alongside refresh, if any.
    pub row_hammer_defense: Option<RowHammerDefenseConfig>,
    /// SMD coordination protocol.
    pub smd_mode: SmdMode,
    /// If `false`, maintenance is entirely controller-driven (RAIDR-style
    /// retention-aware refresh plus a periodic scrub sweep) instead of
    /// chip-autonomous SMD policies — a baseline to compare SMD's
    /// coordination overhead against.
    pub smd_enabled: bool,

    /// Writes queued before the controller enters write-drain mode.
    pub write_drain_threshold: usize,
    /// Maximum total requests queued before backpressure applies.
    pub queue_capacity: usize,

    /// Requests targeting a different subarray of the same bank needed to
    /// prefer a PRE over waiting, for a partially-NACK'd head-of-`actq`
    /// request (`smd_combined_policy_threshold`).
    pub combined_policy_threshold: usize,
    /// Row-open duration, as a multiple of `ref_tracker_timeout_period`,
    /// past which a column command auto-precharges (`smd_max_row_open_intervals`).
    pub max_row_open_intervals: u64,
    /// Clocks after which an RSQ/Alert tracker entry is considered stale.
    pub ref_tracker_timeout_period: u64,
    /// ACT-to-NACK-decision window, in clocks (ACT_NACK mode only).
    pub act_nack_resend_clocks: u64,
    /// Full-device ECC scrub period, in clocks.
    pub scrub_period_clocks: u64,
    /// Graphene per-row activation threshold.
    pub graphene_threshold: u32,
    /// Graphene per-bank table reset period, in clocks.
    pub graphene_reset_period_clocks: u64,
    /// PARA's per-ACT preventive-refresh probability, in parts per thousand.
    pub para_probability_permille: u32,
    /// Bloom filter size, as a power-of-two slot count.
    pub bloom_size_bits: u32,
    /// Number of independent H3 hash functions per Bloom filter.
    pub bloom_num_hashes: usize,

    /// Per-row refresh latency, in clocks; a chip-side maintenance lock is
    /// held for `single_ref_latency_clocks * row_refresh_granularity` clocks.
    pub single_ref_latency_clocks: u64,
    /// Rows refreshed per maintenance lock hold.
    pub row_refresh_granularity: u32,
    /// Maximum `pending_maint` backlog before the simulator aborts.
    pub maintenance_backlog_limit: u64,

    /// Path to write the per-rank command trace to, if any.
    pub command_trace_path: Option<String>,
    /// Stats sections to print (empty means every section).
    pub stats_sections: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bank_groups: defaults::BANK_GROUPS,
            banks_per_group: defaults::BANKS_PER_GROUP,
            subarrays_per_bank: defaults::SUBARRAYS_PER_BANK,
            rows_per_subarray: defaults::ROWS_PER_SUBARRAY,
            columns_per_row: defaults::COLUMNS_PER_ROW,
            per_bank_refresh: false,
            row_policy: RowPolicyConfig::default(),
            refresh_policy: RefreshPolicyConfig::default(),
            ecc_scrubbing_enabled: false,
            row_hammer_defense: None,
            smd_mode: SmdMode::default(),
            smd_enabled: true,
            write_drain_threshold: defaults::WRITE_DRAIN_THRESHOLD,
            queue_capacity: defaults::QUEUE_CAPACITY,
            combined_policy_threshold: defaults::COMBINED_POLICY_THRESHOLD,
            max_row_open_intervals: defaults::MAX_ROW_OPEN_INTERVALS,
            ref_tracker_timeout_period: defaults::REF_TRACKER_TIMEOUT_PERIOD,
            act_nack_resend_clocks: defaults::ACT_NACK_RESEND_CLOCKS,
            scrub_period_clocks: defaults::SCRUB_PERIOD_CLOCKS,
            graphene_threshold: defaults::GRAPHENE_THRESHOLD,
            graphene_reset_period_clocks: defaults::GRAPHENE_RESET_PERIOD_CLOCKS,
            para_probability_permille: defaults::PARA_PROBABILITY_PERMILLE,
            bloom_size_bits: defaults::BLOOM_SIZE_BITS,
            bloom_num_hashes: defaults::BLOOM_NUM_HASHES,
            single_ref_latency_clocks: defaults::SINGLE_REF_LATENCY_CLOCKS,
            row_refresh_granularity: defaults::ROW_REFRESH_GRANULARITY,
            maintenance_backlog_limit: defaults::MAINTENANCE_BACKLOG_LIMIT,
            command_trace_path: None,
            stats_sections: Vec::new(),
        }
    }
}

impl Config {
    /// Parses a config from a JSON string, falling back to defaults for any
    /// field the document omits (`#[serde(default)]` on every field).
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_parses_to_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.bank_groups, defaults::BANK_GROUPS);
        assert_eq!(config.smd_mode, SmdMode::Rsq);
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let config = Config::from_json(r#"{"smd_mode": "act_nack", "bank_groups": 4}"#).unwrap();
        assert_eq!(config.smd_mode, SmdMode::ActNack);
        assert_eq!(config.bank_groups, 4);
        assert_eq!(config.subarrays_per_bank, defaults::SUBARRAYS_PER_BANK);
    }

    #[test]
    fn refresh_and_row_hammer_defense_are_independent_toggles() {
        let config = Config::from_json(
            r#"{"refresh_policy": "variable", "row_hammer_defense": "graphene", "ecc_scrubbing_enabled": true}"#,
        )
        .unwrap();
        assert_eq!(config.refresh_policy, RefreshPolicyConfig::Variable);
        assert_eq!(config.row_hammer_defense, Some(RowHammerDefenseConfig::Graphene));
        assert!(config.ecc_scrubbing_enabled);
    }

    #[test]
    fn smd_enabled_defaults_to_true_but_can_be_turned_off() {
        assert!(Config::default().smd_enabled);
        let config = Config::from_json(r#"{"smd_enabled": false}"#).unwrap();
        assert!(!config.smd_enabled);
    }
}
