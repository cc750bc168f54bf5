//! Python bindings for the SMD DRAM/SMD simulator.
//!
//! This crate exposes `smd-core` to Python via PyO3:
//! 1. **Simulator:** `PySimulator` for configuration, enqueueing accesses,
//!    and cycle stepping.
//! 2. **Statistics:** `PyStats` for counters and selective section printing.

use pyo3::prelude::*;

/// Statistics binding (`PyStats`).
pub mod stats;
/// Simulator binding (`PySimulator`).
pub mod simulator;

/// Registers every exposed class and function onto the given Python module.
pub fn register_simulator_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<simulator::PySimulator>()?;
    m.add_class::<stats::PyStats>()?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    Ok(())
}

/// Returns the crate version string.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    register_simulator_module(m)?;
    Ok(())
}
