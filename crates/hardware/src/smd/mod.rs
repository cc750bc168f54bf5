//! Self-Managing DRAM: chip-autonomous maintenance and the coordination
//! protocols the controller uses to stay consistent with it.
//!
//! A chip may run maintenance (refresh, scrub, preventive refresh) without
//! the controller's say-so; SMD is the contract that keeps the controller's
//! belief about which rows/subarrays are open in sync with what the chips
//! are actually doing. Three protocols are modeled, mutually exclusive per
//! rank: [`SmdMode::Rsq`] (poll before precharging), [`SmdMode::Alert`]
//! (chip raises a signal when it starts maintenance), and
//! [`SmdMode::ActNack`] (chip refuses an ACT outright, forcing a retry).

mod lock;
mod maintenance;
mod protocol;
mod rank_maintenance;

pub use lock::SaLock;
pub use maintenance::{
    EccScrubbingPolicy, FixedRateRefreshPolicy, MaintenanceCounter, MaintenanceMachine,
    NoRefreshPolicy, RowHammerDefense, RowHammerProtectionPolicy, VariableRefreshPolicy,
};
pub use protocol::{SmdMode, SmdOutcome, SmdTracker};
pub use rank_maintenance::RankMaintenance;
