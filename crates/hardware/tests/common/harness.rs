//! Config builders for the end-to-end scenarios.

use smd_core::config::{Config, RefreshPolicyConfig};
use smd_core::smd::SmdMode;

/// A single channel/rank/bank-group/bank device: the smallest organization
/// that still has a real row/column hierarchy, used by every scenario that
/// only cares about one bank's timing or SMD behavior and would otherwise
/// have to account for which bank-group/bank an address happens to land in.
#[must_use]
pub fn single_bank_config() -> Config {
    let mut config = Config::default();
    config.bank_groups = 1;
    config.banks_per_group = 1;
    config.subarrays_per_bank = 1;
    config.refresh_policy = RefreshPolicyConfig::None;
    config.ecc_scrubbing_enabled = false;
    config.row_hammer_defense = None;
    // The controller's own PARA baseline rolls independently of
    // row_hammer_defense; zero it so timing/SMD scenarios get exactly the
    // ACTs they ask for, not an occasional extra preventive one.
    config.para_probability_permille = 0;
    config
}

/// [`single_bank_config`], but with fixed-rate refresh left on and SMD
/// coordinated via ACT-NACK — the config scenario 3 needs: the lone
/// subarray's refresh lock is the only thing that can ever be held, so
/// whichever ACT lands while it's held is guaranteed to be NACK'd.
#[must_use]
pub fn act_nack_config() -> Config {
    let mut config = single_bank_config();
    config.refresh_policy = RefreshPolicyConfig::FixedRate;
    config.smd_mode = SmdMode::ActNack;
    config
}
