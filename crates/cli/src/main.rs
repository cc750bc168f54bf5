//! Command-line driver for the SMD DRAM/SMD simulator.
//!
//! Reads a JSON [`Config`], replays a plain-text address trace against a
//! [`Simulator`], and prints statistics at the end. Trace parsing and
//! command-trace recording live here rather than in `smd-core`: the core
//! crate treats both as external interfaces, specified only at the
//! boundary (`Simulator::enqueue`, issued commands).

use std::fs;
use std::io::{BufRead, BufReader};
use std::process;

use clap::Parser;

use smd_core::common::addr::AddrVec;
use smd_core::config::Config;
use smd_core::request::RequestType;
use smd_core::sim::Simulator;

#[derive(Parser, Debug)]
#[command(name = "smd-sim", author, version, about = "Cycle-accurate DRAM/SMD simulator")]
struct Cli {
    /// JSON configuration file. Omit to run with every default.
    #[arg(short, long)]
    config: Option<String>,

    /// Address trace: one access per line, `R|W <rank> <bank_group> <bank> <subarray> <row> <column>`.
    #[arg(short, long)]
    trace: String,

    /// Extra clocks to run after the trace is exhausted, to let in-flight
    /// requests and pending maintenance drain.
    #[arg(long, default_value_t = 100_000)]
    drain_cycles: u64,

    /// Only print these stats sections (repeatable); default is every section.
    #[arg(long)]
    section: Vec<String>,

    /// Deterministic PRNG seed for PARA rolls and Bloom filter hashing.
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path),
        None => Config::default(),
    };

    let mut sim = Simulator::from_config(&config, cli.seed);
    let file = fs::File::open(&cli.trace).unwrap_or_else(|e| {
        eprintln!("error reading trace {}: {e}", cli.trace);
        process::exit(1);
    });

    for line in BufReader::new(file).lines() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("error reading trace {}: {e}", cli.trace);
            process::exit(1);
        });
        let Some((addr, kind)) = parse_access(&line) else {
            continue;
        };
        while !sim.enqueue(addr, kind) {
            sim.tick();
        }
    }

    sim.run(cli.drain_cycles);

    let sections = if cli.section.is_empty() {
        config.stats_sections
    } else {
        cli.section
    };
    sim.stats().print_sections(&sections);
}

fn load_config(path: &str) -> Config {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error reading config {path}: {e}");
        process::exit(1);
    });
    Config::from_json(&text).unwrap_or_else(|e| {
        eprintln!("error parsing config {path}: {e}");
        process::exit(1);
    })
}

/// Parses one trace line. Blank lines and lines starting with `#` are
/// skipped (comments); malformed lines are skipped with a warning rather
/// than aborting the whole run.
fn parse_access(line: &str) -> Option<(AddrVec, RequestType)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut fields = line.split_whitespace();
    let kind = match fields.next()? {
        "R" => RequestType::Read,
        "W" => RequestType::Write,
        other => {
            tracing::warn!("skipping trace line with unknown access kind {other:?}: {line:?}");
            return None;
        }
    };
    let mut next_u32 = || fields.next().and_then(|f| f.parse::<u32>().ok());
    let (rank, bank_group, bank, subarray, row, column) =
        (next_u32()?, next_u32()?, next_u32()?, next_u32()?, next_u32()?, next_u32()?);
    Some((AddrVec::new(0, rank, bank_group, bank, subarray, row, column), kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_read() {
        let (addr, kind) = parse_access("R 0 1 0 2 100 5").unwrap();
        assert_eq!(kind, RequestType::Read);
        assert_eq!(addr.get(smd_core::common::addr::Level::Row), 100);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        assert!(parse_access("# a comment").is_none());
        assert!(parse_access("   ").is_none());
    }

    #[test]
    fn skips_malformed_lines_without_panicking() {
        assert!(parse_access("X 0 0 0 0 0 0").is_none());
        assert!(parse_access("R 0 0").is_none());
    }
}
