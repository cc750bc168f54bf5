//! Energy model boundary: hooks a DRAMPower-style model attaches to without
//! the controller needing to know anything about power equations.

use crate::spec::Command;

/// Counts commands issued, split by whether they came from the normal
/// request path, SMD refresh coordination, or an ECC scrub sweep — the
/// three categories a power model typically weights differently.
pub trait EnergyModel: std::fmt::Debug + Send + Sync {
    /// A normal command (ACT/PRE/RD/WR/... from request scheduling) issued at `clk`.
    fn issue_command(&mut self, cmd: Command, clk: u64);

    /// An SMD refresh-coordination command (REF, REFPB, RSQ, PRE_RSQ,
    /// ACT_NACK, ACT_PARTIAL_NACK) issued at `clk`.
    fn issue_smd_ref_command(&mut self, cmd: Command, clk: u64);

    /// A read issued by the ECC scrub sweep, as opposed to a CPU-driven read.
    fn issue_row_scrub_command(&mut self, clk: u64);
}

/// Counts commands without modeling any actual energy; the default when no
/// power model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEnergyModel;

impl EnergyModel for NullEnergyModel {
    fn issue_command(&mut self, _cmd: Command, _clk: u64) {}
    fn issue_smd_ref_command(&mut self, _cmd: Command, _clk: u64) {}
    fn issue_row_scrub_command(&mut self, _clk: u64) {}
}

/// Tallies command counts per category; a real DRAMPower integration would
/// multiply these by a speed-bin's current/voltage table instead of just
/// counting, but the counting boundary is the same.
#[derive(Debug, Clone, Default)]
pub struct CountingEnergyModel {
    /// Normal-path command issue count.
    pub commands: u64,
    /// SMD refresh-coordination command issue count.
    pub smd_ref_commands: u64,
    /// ECC scrub read count.
    pub scrub_reads: u64,
}

impl EnergyModel for CountingEnergyModel {
    fn issue_command(&mut self, _cmd: Command, _clk: u64) {
        self.commands += 1;
    }

    fn issue_smd_ref_command(&mut self, _cmd: Command, _clk: u64) {
        self.smd_ref_commands += 1;
    }

    fn issue_row_scrub_command(&mut self, _clk: u64) {
        self.scrub_reads += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_model_tallies_each_category_independently() {
        let mut model = CountingEnergyModel::default();
        model.issue_command(Command::Act, 0);
        model.issue_smd_ref_command(Command::Ref, 0);
        model.issue_row_scrub_command(0);
        assert_eq!(model.commands, 1);
        assert_eq!(model.smd_ref_commands, 1);
        assert_eq!(model.scrub_reads, 1);
    }
}
