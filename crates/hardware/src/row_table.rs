//! Controller-side cache of which row is open per bank.
//!
//! The device tree ([`crate::device::DeviceNode`]) is the source of truth
//! for timing and state, but walking it on every scheduling decision would
//! mean re-deriving "is this a row hit" by hand at the call site. `RowTable`
//! is a flat, controller-owned mirror the scheduler can query directly.

use std::collections::HashMap;

use crate::common::addr::AddrVec;

/// Tracks, per global bank id, which row (if any) is currently open.
#[derive(Debug, Clone, Default)]
pub struct RowTable {
    open_row: HashMap<u32, u32>,
}

impl RowTable {
    /// An empty table (every bank closed).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `bank_id` now has `row_id` open.
    pub fn open(&mut self, bank_id: u32, row_id: u32) {
        self.open_row.insert(bank_id, row_id);
    }

    /// Records that `bank_id` is now closed.
    pub fn close(&mut self, bank_id: u32) {
        self.open_row.remove(&bank_id);
    }

    /// The open row for `bank_id`, if any.
    #[must_use]
    pub fn open_row(&self, bank_id: u32) -> Option<u32> {
        self.open_row.get(&bank_id).copied()
    }

    /// True if `addr` (at its bank and row) is a row-buffer hit against
    /// this table.
    #[must_use]
    pub fn is_hit(&self, addr: &AddrVec, banks_per_bg: u32) -> bool {
        let bank_id = addr.global_bank_id(banks_per_bg);
        self.open_row(bank_id) == Some(addr.get(crate::common::addr::Level::Row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_close_round_trips() {
        let mut t = RowTable::new();
        t.open(5, 42);
        assert_eq!(t.open_row(5), Some(42));
        t.close(5);
        assert_eq!(t.open_row(5), None);
    }
}
