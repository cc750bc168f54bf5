//! End-to-end scenarios from the testable-properties list, one module per
//! subsystem they exercise.

/// Row-buffer timing: row-hit streaming and `tRC` spacing between ACTs.
pub mod timing;

/// SMD coordination: ACT-NACK against a chip-autonomous maintenance lock.
pub mod smd_coordination;

/// Bloom filter determinism across reconstructions from the same seed.
pub mod bloom_filters;

/// RowHammer defenses: PARA's row-boundary clamping and a counting
/// defense's activation threshold.
pub mod row_hammer;
