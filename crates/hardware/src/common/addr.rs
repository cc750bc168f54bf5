//! Hierarchical DRAM address representation.
//!
//! An [`AddrVec`] is an ordered tuple indexed by [`Level`]:
//! `(Channel, Rank, BankGroup, Bank, Subarray, Row, Column)`.

use std::fmt;

/// A level in the DRAM hierarchy, from the channel down to the column.
///
/// The ordering of variants matches the address-vector index order and the
/// tree-traversal order used by [`crate::spec::DeviceSpec`] and
/// [`crate::device::DeviceNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// The DRAM channel; the root of the device tree.
    Channel = 0,
    /// A rank within a channel.
    Rank = 1,
    /// A bank group within a rank.
    BankGroup = 2,
    /// A bank within a bank group.
    Bank = 3,
    /// A subarray within a bank; the unit of SMD locking.
    Subarray = 4,
    /// A row within a subarray.
    Row = 5,
    /// A column within a row; the unit of data transfer.
    Column = 6,
}

/// Number of levels in the hierarchy, i.e. one past [`Level::Column`].
pub const NUM_LEVELS: usize = 7;

impl Level {
    /// Returns the level one step below `self`, or `None` for [`Level::Column`].
    #[must_use]
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Channel => Some(Self::Rank),
            Self::Rank => Some(Self::BankGroup),
            Self::BankGroup => Some(Self::Bank),
            Self::Bank => Some(Self::Subarray),
            Self::Subarray => Some(Self::Row),
            Self::Row => Some(Self::Column),
            Self::Column => None,
        }
    }

    /// Returns the level one step above `self`, or `None` for [`Level::Channel`].
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Channel => None,
            Self::Rank => Some(Self::Channel),
            Self::BankGroup => Some(Self::Rank),
            Self::Bank => Some(Self::BankGroup),
            Self::Subarray => Some(Self::Bank),
            Self::Row => Some(Self::Subarray),
            Self::Column => Some(Self::Row),
        }
    }

    /// Index of this level into an [`AddrVec`] or any `[T; NUM_LEVELS]` table.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Channel => "Channel",
            Self::Rank => "Rank",
            Self::BankGroup => "BankGroup",
            Self::Bank => "Bank",
            Self::Subarray => "Subarray",
            Self::Row => "Row",
            Self::Column => "Column",
        };
        f.write_str(name)
    }
}

/// An address, expressed as one index per [`Level`].
///
/// Two derived ids recur throughout the controller and chip logic:
/// - *global bank id* = `bank_group * banks_per_bg + bank` (unique within a rank).
/// - *row-in-bank id* = `subarray * rows_per_subarray + row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct AddrVec(pub [u32; NUM_LEVELS]);

impl AddrVec {
    /// Builds an address vector from one index per level, in `Level` order.
    #[must_use]
    pub const fn new(
        channel: u32,
        rank: u32,
        bank_group: u32,
        bank: u32,
        subarray: u32,
        row: u32,
        column: u32,
    ) -> Self {
        Self([channel, rank, bank_group, bank, subarray, row, column])
    }

    /// Returns the index at the given level.
    #[must_use]
    pub const fn get(&self, level: Level) -> u32 {
        self.0[level.index()]
    }

    /// Sets the index at the given level, returning the previous value.
    pub fn set(&mut self, level: Level, value: u32) -> u32 {
        std::mem::replace(&mut self.0[level.index()], value)
    }

    /// Global bank id within a rank: `bank_group * banks_per_bg + bank`.
    #[must_use]
    pub fn global_bank_id(&self, banks_per_bg: u32) -> u32 {
        self.get(Level::BankGroup) * banks_per_bg + self.get(Level::Bank)
    }

    /// Row-in-bank id: `subarray * rows_per_subarray + row`.
    #[must_use]
    pub fn row_in_bank_id(&self, rows_per_subarray: u32) -> u32 {
        self.get(Level::Subarray) * rows_per_subarray + self.get(Level::Row)
    }
}

impl fmt::Display for AddrVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(ch={}, rk={}, bg={}, bk={}, sa={}, row={}, col={})",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5], self.0[6]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_bank_id_combines_bank_group_and_bank() {
        let addr = AddrVec::new(0, 1, 2, 3, 0, 0, 0);
        assert_eq!(addr.global_bank_id(4), 2 * 4 + 3);
    }

    #[test]
    fn row_in_bank_id_combines_subarray_and_row() {
        let addr = AddrVec::new(0, 0, 0, 0, 2, 5, 0);
        assert_eq!(addr.row_in_bank_id(512), 2 * 512 + 5);
    }

    #[test]
    fn level_child_and_parent_are_inverses() {
        let mut level = Level::Channel;
        while let Some(child) = level.child() {
            assert_eq!(child.parent(), Some(level));
            level = child;
        }
        assert_eq!(level, Level::Column);
    }
}
