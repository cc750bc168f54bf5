//! Statistics Python binding.
//!
//! Exposes `Stats`'s flat counters as getters, plus `print`/`print_sections`
//! for human-readable dumps.

use pyo3::prelude::*;
use smd_core::stats::Stats;

/// Python-exposed statistics: wraps `Stats` for read and print from Python.
#[pyclass]
#[derive(Clone)]
pub struct PyStats {
    pub(crate) inner: Stats,
}

impl PyStats {
    pub(crate) const fn new(inner: Stats) -> Self {
        Self { inner }
    }
}

#[pymethods]
impl PyStats {
    #[getter]
    fn cycles(&self) -> u64 {
        self.inner.cycles
    }
    #[getter]
    fn reads_retired(&self) -> u64 {
        self.inner.reads_retired
    }
    #[getter]
    fn writes_retired(&self) -> u64 {
        self.inner.writes_retired
    }
    #[getter]
    fn row_hits(&self) -> u64 {
        self.inner.row_hits
    }
    #[getter]
    fn row_misses(&self) -> u64 {
        self.inner.row_misses
    }
    #[getter]
    fn activates(&self) -> u64 {
        self.inner.activates
    }
    #[getter]
    fn precharges(&self) -> u64 {
        self.inner.precharges
    }
    #[getter]
    fn refreshes(&self) -> u64 {
        self.inner.refreshes
    }
    #[getter]
    fn act_nacks(&self) -> u64 {
        self.inner.act_nacks
    }
    #[getter]
    fn act_partial_nacks(&self) -> u64 {
        self.inner.act_partial_nacks
    }

    /// Looks up a dynamically-named counter (e.g. a per-bank Bloom filter's
    /// false-positive count), zero if it was never bumped.
    fn named(&self, name: &str) -> u64 {
        self.inner.named(name)
    }

    /// Prints every stats section to stdout.
    fn print(&self) {
        self.inner.print();
    }

    /// Prints only the named sections (see `smd_core::stats::STATS_SECTIONS`);
    /// an empty list prints every section.
    fn print_sections(&self, sections: Vec<String>) {
        self.inner.print_sections(&sections);
    }
}
