//! Self-Managing DRAM (SMD) core simulator library.
//!
//! This crate implements a cycle-accurate DRAM subsystem simulator extended
//! with Self-Managing DRAM coordination, with the following pieces:
//! 1. **Device model:** a recursive device tree ([`device`]) keyed by
//!    [`common::addr::Level`], driven by a per-standard [`spec::DeviceSpec`]
//!    (prerequisite resolution, row-hit/row-open predicates, and timing).
//! 2. **Controller:** request queues, row-buffer tracking, and the
//!    scheduling/issue loop that turns CPU-side requests into commands
//!    ([`controller`], [`request`], [`row_table`], [`scheduler`]).
//! 3. **SMD:** chip-autonomous maintenance policies and the coordination
//!    protocols (RSQ/Alert/ACT_NACK) that keep the controller's belief about
//!    open rows consistent with what the chips are actually doing ([`smd`]).
//! 4. **Support:** Bloom filters for retention/activation tracking
//!    ([`bloom`]), an energy-model boundary ([`energy`]), statistics
//!    ([`stats`]), a command-trace sink ([`trace`]), and JSON configuration
//!    ([`config`]).
//! 5. **Simulation:** [`sim::Simulator`], which owns the device tree and
//!    controller together and drives them tick by tick.

/// Bloom filters for retention-aware and duplicate-suppressing maintenance
/// policies.
pub mod bloom;
/// Address vectors, the DRAM level enum, the fatal error type, and small
/// derived-id helpers shared across the crate.
pub mod common;
/// Simulation configuration: JSON-deserializable, with baseline defaults.
pub mod config;
/// The memory controller: request scheduling, command issue, and the
/// maintenance/SMD bookkeeping that rides alongside it.
pub mod controller;
/// The device tree: one recursive node per address level.
pub mod device;
/// Energy model boundary for power-estimation tools.
pub mod energy;
/// Controller-level memory requests and their queues.
pub mod request;
/// Controller-side cache of which row is open per bank.
pub mod row_table;
/// Row-buffer management policy (open/closed/timeout page).
pub mod scheduler;
/// Top-level simulation: `Simulator`, tying the device tree and controller
/// together and driving them tick by tick from an address trace.
pub mod sim;
/// Self-Managing DRAM: chip-autonomous maintenance and the coordination
/// protocols the controller uses to stay consistent with it.
pub mod smd;
/// Device timing and state model (per-standard `DeviceSpec` implementations).
pub mod spec;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Per-rank command-trace output.
pub mod trace;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// The memory controller; generic over the device standard it drives.
pub use crate::controller::Controller;
/// Top-level simulator; owns the device tree and controller side-by-side.
pub use crate::sim::Simulator;
/// Flat statistics counters plus the dynamic named-counter registry.
pub use crate::stats::Stats;
