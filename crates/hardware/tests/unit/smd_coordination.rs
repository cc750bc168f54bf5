//! SMD coordination: ACT-NACK mode has no advance-warning tracker, so the
//! controller must attempt the ACT and let the chip's NACK respond. This
//! exercises that path end to end, through a single bank/subarray whose
//! fixed-rate refresh lock is the only thing that can ever be locked.

use smd_core::common::addr::AddrVec;
use smd_core::request::RequestType;
use smd_core::sim::Simulator;
use smd_core::spec::default_speed;

use crate::common::harness::act_nack_config;

/// An ACT issued while the sole subarray's refresh lock is held comes back
/// `ACT_NACK`'d, closing the bank so the request can retry.
#[test]
fn an_act_into_a_locked_subarray_is_nacked() {
    let config = act_nack_config();
    let mut sim = Simulator::from_config(&config, 11);

    // With one (bank-group, bank, subarray) unit, the per-unit refresh
    // period is tREFI itself; run up to and past the first refresh so its
    // lock is guaranteed held when the read below tries to ACT.
    let refresh_period = default_speed().n_refi;
    sim.run(refresh_period + 1);

    assert!(sim.enqueue(AddrVec::new(0, 0, 0, 0, 0, 5, 0), RequestType::Read));
    sim.run(500);

    assert!(
        sim.stats().act_nacks >= 1,
        "an ACT against the locked subarray must have been NACK'd"
    );
}
