//! Simulator Python binding.
//!
//! Exposes `Simulator`: build from a JSON config string, enqueue accesses,
//! and step the clock.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use smd_core::common::addr::AddrVec;
use smd_core::config::Config;
use smd_core::request::RequestType;
use smd_core::sim::Simulator;

use crate::stats::PyStats;

/// Python-exposed simulator: wraps `Simulator`, built from a JSON config
/// string (an empty string or `"{}"` runs every default).
#[pyclass]
pub struct PySimulator {
    inner: Simulator,
}

#[pymethods]
impl PySimulator {
    /// Builds a simulator from a JSON config document and a deterministic
    /// PRNG seed (PARA rolls, Bloom filter hashing — never wall-clock time).
    #[new]
    #[pyo3(signature = (config_json="{}", seed=1))]
    fn new(config_json: &str, seed: u64) -> PyResult<Self> {
        let config = Config::from_json(config_json).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self {
            inner: Simulator::from_config(&config, seed),
        })
    }

    /// Enqueues a read (`kind="R"`) or write (`kind="W"`) at the given
    /// address. Returns `False` (never raises) if the queue is at capacity;
    /// the caller should `tick()` and retry.
    fn enqueue(&mut self, kind: &str, rank: u32, bank_group: u32, bank: u32, subarray: u32, row: u32, column: u32) -> PyResult<bool> {
        let request_kind = match kind {
            "R" => RequestType::Read,
            "W" => RequestType::Write,
            other => return Err(PyValueError::new_err(format!("unknown access kind {other:?}, expected \"R\" or \"W\""))),
        };
        let addr = AddrVec::new(0, rank, bank_group, bank, subarray, row, column);
        Ok(self.inner.enqueue(addr, request_kind))
    }

    /// Raises the SMD out-of-band alert signal for `rank`.
    fn signal_alert(&mut self, rank: u32) {
        self.inner.signal_alert(rank);
    }

    /// Advances the simulation by one clock.
    fn tick(&mut self) {
        self.inner.tick();
    }

    /// Advances the simulation by `n` clocks.
    fn run(&mut self, n: u64) {
        self.inner.run(n);
    }

    /// Current simulated clock.
    #[getter]
    fn clk(&self) -> u64 {
        self.inner.clk()
    }

    /// A snapshot of the accumulated statistics.
    fn stats(&self) -> PyStats {
        PyStats::new(self.inner.stats().clone())
    }
}
