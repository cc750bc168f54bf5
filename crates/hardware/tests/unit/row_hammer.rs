//! RowHammer defenses: PARA's row-boundary clamping, and a counting
//! defense's activation-threshold trigger.

use std::collections::HashMap;

use smd_core::bloom::DualCountingBloomFilter;
use smd_core::common::addr::{AddrVec, Level};
use smd_core::smd::{MaintenanceMachine, RowHammerDefense, RowHammerProtectionPolicy};

const ROWS_PER_SUBARRAY: u32 = 1024;

fn addr_at_row(row: u32) -> AddrVec {
    AddrVec::new(0, 0, 0, 0, 0, row, 0)
}

/// An ACT to row 0 under a guaranteed-hit PARA roll queues exactly one
/// preventive refresh, for row 1 — row 0 has no row `-1` to clamp to.
#[test]
fn para_on_row_zero_queues_only_the_high_neighbor() {
    let mut policy = RowHammerProtectionPolicy::new(
        RowHammerDefense::Para { probability_permille: 1000 },
        DualCountingBloomFilter::new(1, 8, 2, 7),
        ROWS_PER_SUBARRAY,
    );
    policy.on_activate(&addr_at_row(0), 0);

    let mut locks = HashMap::new();
    let due = policy.poll(0, &mut locks);

    assert_eq!(due.len(), 1);
    assert_eq!(due[0].get(Level::Row), 1);
}

/// A counting defense (CBF/Graphene) must not trigger before its row
/// crosses the configured activation threshold, and must trigger once it
/// does, queueing both in-range neighbors.
#[test]
fn a_row_crossing_the_activation_threshold_triggers_a_neighbor_refresh() {
    let mut policy = RowHammerProtectionPolicy::new(
        RowHammerDefense::Graphene { threshold: 6 },
        DualCountingBloomFilter::new(5, 10, 2, 6),
        ROWS_PER_SUBARRAY,
    );
    let addr = addr_at_row(500);
    let mut locks = HashMap::new();

    for _ in 0..5 {
        policy.on_activate(&addr, 0);
    }
    assert!(
        policy.poll(0, &mut locks).is_empty(),
        "5 activations must not yet cross a threshold of 6"
    );

    policy.on_activate(&addr, 0);
    let due = policy.poll(0, &mut locks);
    assert_eq!(due.len(), 2, "the 6th activation crosses the threshold and queues both neighbors");
}

/// A different row that never reaches the threshold never triggers.
#[test]
fn a_row_below_threshold_never_triggers() {
    let mut policy = RowHammerProtectionPolicy::new(
        RowHammerDefense::Graphene { threshold: 6 },
        DualCountingBloomFilter::new(5, 10, 2, 6),
        ROWS_PER_SUBARRAY,
    );
    let addr = addr_at_row(900);
    let mut locks = HashMap::new();

    for _ in 0..5 {
        policy.on_activate(&addr, 0);
    }
    assert!(policy.poll(0, &mut locks).is_empty());
}
