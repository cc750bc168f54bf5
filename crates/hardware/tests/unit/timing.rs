//! Row-buffer timing scenarios: a row-hit stream should cost exactly one
//! ACT, and two different rows of the same bank must be separated by at
//! least `tRC` worth of ACT-to-ACT spacing.

use smd_core::common::addr::AddrVec;
use smd_core::request::RequestType;
use smd_core::sim::Simulator;
use smd_core::spec::default_speed;

use crate::common::harness::single_bank_config;

/// Ten column accesses to the same open row retire as one ACT followed by
/// ten RDs; every RD after the first is a genuine row hit, and the first is
/// the row miss that opened the row in the first place.
#[test]
fn a_row_hit_stream_costs_exactly_one_activate() {
    let config = single_bank_config();
    let mut sim = Simulator::from_config(&config, 7);

    for col in 0..10 {
        assert!(sim.enqueue(AddrVec::new(0, 0, 0, 0, 0, 5, col), RequestType::Read));
    }
    sim.run(5_000);

    assert_eq!(sim.stats().reads_retired, 10);
    assert_eq!(sim.stats().activates, 1);
    assert_eq!(sim.stats().row_misses, 1);
    assert_eq!(sim.stats().row_hits, 10);
}

/// ACT(row 0), then (forced by the second access targeting a different row
/// of the same bank) PRE, then ACT(row 1): the gap between the two ACTs
/// must be at least `tRC` (`nRAS + nRP`).
#[test]
fn switching_rows_in_the_same_bank_enforces_trc() {
    let config = single_bank_config();
    let mut sim = Simulator::from_config(&config, 3);

    assert!(sim.enqueue(AddrVec::new(0, 0, 0, 0, 0, 0, 0), RequestType::Read));
    assert!(sim.enqueue(AddrVec::new(0, 0, 0, 0, 0, 1, 0), RequestType::Read));

    let mut activate_clocks = Vec::new();
    let mut last_count = 0;
    for _ in 0..2_000 {
        sim.tick();
        if sim.stats().activates > last_count {
            last_count = sim.stats().activates;
            activate_clocks.push(sim.clk());
        }
        if activate_clocks.len() == 2 {
            break;
        }
    }

    assert_eq!(activate_clocks.len(), 2, "each row needs its own ACT");
    let gap = activate_clocks[1] - activate_clocks[0];
    let speed = default_speed();
    assert!(
        gap >= speed.n_rc,
        "ACT-to-ACT gap {gap} is shorter than tRC ({})",
        speed.n_rc
    );
    assert_eq!(sim.stats().reads_retired, 2);
}
