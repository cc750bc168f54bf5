//! Shared test infrastructure for the hardware integration suite.
//!
//! Just config builders for now — `Simulator` has no external I/O boundary
//! (no bus, no interrupt controller) to mock, so there's nothing here beyond
//! the configs the scenarios need.
pub mod harness;
