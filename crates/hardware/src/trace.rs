//! Per-rank command-trace output: a stable CSV format other tools can diff
//! against, one line per issued command.

use std::io::{self, Write};

use crate::spec::Command;

/// Writes `<clk>,<command>[,<bank_id>]` lines to an arbitrary sink, one per
/// issued command. `bank_id` is omitted for rank- or channel-scoped
/// commands (REF in rank mode, PREA, power-down/self-refresh).
#[derive(Debug)]
pub struct CommandTraceWriter<W: Write> {
    sink: W,
}

impl<W: Write> CommandTraceWriter<W> {
    /// Wraps `sink` (a file, or any other `Write`) as a command-trace writer.
    pub const fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Writes one trace line for a bank-scoped command.
    pub fn write_bank_command(&mut self, clk: u64, cmd: Command, bank_id: u32) -> io::Result<()> {
        writeln!(self.sink, "{clk},{cmd},{bank_id}")
    }

    /// Writes one trace line for a rank- or channel-scoped command.
    pub fn write_command(&mut self, clk: u64, cmd: Command) -> io::Result<()> {
        writeln!(self.sink, "{clk},{cmd}")
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_command_includes_the_bank_id() {
        let mut buf = Vec::new();
        {
            let mut writer = CommandTraceWriter::new(&mut buf);
            writer.write_bank_command(100, Command::Act, 3).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "100,ACT,3\n");
    }

    #[test]
    fn rank_command_omits_the_bank_id() {
        let mut buf = Vec::new();
        {
            let mut writer = CommandTraceWriter::new(&mut buf);
            writer.write_command(200, Command::Ref).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "200,REF\n");
    }
}
