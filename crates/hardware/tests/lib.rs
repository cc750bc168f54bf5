//! # Hardware Integration Tests
//!
//! Entry point for the black-box test suite: everything here drives
//! `smd-core` only through its public API (`Simulator`, `Config`, and the
//! handful of standalone components — Bloom filters, maintenance policies —
//! that are useful to exercise directly rather than through a full run).

/// Shared test configuration builders.
pub mod common;

/// End-to-end scenarios from the testable-properties list: timing safety,
/// SMD coordination, Bloom filter determinism, and RowHammer defenses.
pub mod unit;
