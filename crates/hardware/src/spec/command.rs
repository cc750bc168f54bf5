//! DRAM command set.

use std::fmt;

/// A DRAM device command, including the SMD protocol extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Activate: opens a row in a bank.
    Act,
    /// Precharge: closes the open row in a bank.
    Pre,
    /// Precharge-all: closes every open bank in a rank.
    Prea,
    /// Read.
    Rd,
    /// Read with auto-precharge.
    Rda,
    /// Write.
    Wr,
    /// Write with auto-precharge.
    Wra,
    /// Refresh-all (rank scope, or bank scope under per-bank refresh).
    Ref,
    /// Per-bank refresh.
    Refpb,
    /// Power-down entry.
    Pde,
    /// Power-down exit.
    Pdx,
    /// Self-refresh entry.
    Sre,
    /// Self-refresh exit.
    Srx,
    /// Precharge that also returns SMD RSQ status.
    PreRsq,
    /// Idle-cycle Refresh Status Query.
    Rsq,
    /// SMD: all chips of the rank NACK'd the ACT; the bank closes everywhere.
    ActNack,
    /// SMD: some chips NACK'd the ACT; the bank is partially opened.
    ActPartialNack,
    /// No operation; the tick issues nothing.
    Nop,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Act => "ACT",
            Self::Pre => "PRE",
            Self::Prea => "PREA",
            Self::Rd => "RD",
            Self::Rda => "RDA",
            Self::Wr => "WR",
            Self::Wra => "WRA",
            Self::Ref => "REF",
            Self::Refpb => "REFPB",
            Self::Pde => "PDE",
            Self::Pdx => "PDX",
            Self::Sre => "SRE",
            Self::Srx => "SRX",
            Self::PreRsq => "PRE_RSQ",
            Self::Rsq => "RSQ",
            Self::ActNack => "ACT_NACK",
            Self::ActPartialNack => "ACT_PARTIAL_NACK",
            Self::Nop => "NOP",
        };
        f.write_str(s)
    }
}

impl Command {
    /// True for RD/WR variants that auto-precharge after the access.
    #[must_use]
    pub const fn is_auto_precharge(self) -> bool {
        matches!(self, Self::Rda | Self::Wra)
    }

    /// Returns the auto-precharging variant of a plain RD/WR command.
    #[must_use]
    pub const fn to_auto_precharge(self) -> Self {
        match self {
            Self::Rd => Self::Rda,
            Self::Wr => Self::Wra,
            other => other,
        }
    }

    /// True for commands that open a row (ACT only).
    #[must_use]
    pub const fn is_activate(self) -> bool {
        matches!(self, Self::Act)
    }

    /// True for commands that close a row (PRE, PREA, RDA, WRA).
    #[must_use]
    pub const fn is_precharging(self) -> bool {
        matches!(self, Self::Pre | Self::Prea | Self::Rda | Self::Wra)
    }
}
