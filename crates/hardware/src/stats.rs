//! Simulation statistics.

use std::collections::HashMap;
use std::time::Instant;

/// Section labels `print_sections` recognizes, in display order.
pub const STATS_SECTIONS: &[&str] = &["timing", "requests", "row_buffer", "maintenance", "smd"];

/// Flat counters updated once per tick/command, plus a dynamic registry for
/// the stable per-channel/per-bank/per-filter names the maintenance and SMD
/// subsystems need (`bf_positives_r0_c3`-style), which don't fit a fixed
/// struct field without one field per possible rank/bank/channel combination.
#[derive(Debug, Clone)]
pub struct Stats {
    start_time: Instant,

    /// Total clocks simulated.
    pub cycles: u64,
    /// Read requests retired.
    pub reads_retired: u64,
    /// Write requests retired.
    pub writes_retired: u64,
    /// Column commands that hit an already-open row.
    pub row_hits: u64,
    /// Column commands that required an ACT (and possibly a PRE) first.
    pub row_misses: u64,
    /// ACTs issued.
    pub activates: u64,
    /// Precharges issued (explicit PRE/PREA, not auto-precharge).
    pub precharges: u64,
    /// Rank- or bank-scope REF commands issued.
    pub refreshes: u64,
    /// ECC scrub reads issued.
    pub scrub_reads: u64,
    /// Preventive (neighbor-row) refreshes issued by a RowHammer defense.
    pub preventive_refreshes: u64,
    /// ACTs that were fully NACK'd by SMD.
    pub act_nacks: u64,
    /// ACTs that were partially NACK'd (opened on a strict chip subset).
    pub act_partial_nacks: u64,
    /// Requests that had to be retried after a NACK.
    pub retries: u64,

    named: HashMap<String, u64>,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            reads_retired: 0,
            writes_retired: 0,
            row_hits: 0,
            row_misses: 0,
            activates: 0,
            precharges: 0,
            refreshes: 0,
            scrub_reads: 0,
            preventive_refreshes: 0,
            act_nacks: 0,
            act_partial_nacks: 0,
            retries: 0,
            named: HashMap::new(),
        }
    }
}

impl Stats {
    /// A fresh, zeroed set of counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments a dynamically-named counter (e.g. a per-bank Bloom
    /// filter's false-positive count), creating it at zero if absent.
    pub fn bump_named(&mut self, name: impl Into<String>, by: u64) {
        *self.named.entry(name.into()).or_insert(0) += by;
    }

    /// The current value of a named counter, zero if never bumped.
    #[must_use]
    pub fn named(&self, name: &str) -> u64 {
        self.named.get(name).copied().unwrap_or(0)
    }

    /// Every named counter, for serialization or a stats dump.
    #[must_use]
    pub fn named_counters(&self) -> &HashMap<String, u64> {
        &self.named
    }

    /// Prints every section to stdout.
    pub fn print(&self) {
        self.print_sections(&[]);
    }

    /// Prints the requested sections (or every section, if `sections` is
    /// empty), with derived rates guarded against division by zero.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |name: &str| sections.is_empty() || sections.iter().any(|s| s == name);
        let elapsed_secs = self.start_time.elapsed().as_secs_f64().max(1e-9);
        let row_accesses = (self.row_hits + self.row_misses).max(1);

        if want("timing") {
            println!("=== timing ===");
            println!("cycles: {}", self.cycles);
            println!("sim_khz: {:.1}", self.cycles as f64 / elapsed_secs / 1000.0);
            println!("-------------");
        }
        if want("requests") {
            println!("=== requests ===");
            println!("reads_retired: {}", self.reads_retired);
            println!("writes_retired: {}", self.writes_retired);
            println!("retries: {}", self.retries);
            println!("----------------");
        }
        if want("row_buffer") {
            println!("=== row_buffer ===");
            println!("row_hits: {}", self.row_hits);
            println!("row_misses: {}", self.row_misses);
            println!(
                "row_hit_rate: {:.4}",
                self.row_hits as f64 / row_accesses as f64
            );
            println!("activates: {}", self.activates);
            println!("precharges: {}", self.precharges);
            println!("------------------");
        }
        if want("maintenance") {
            println!("=== maintenance ===");
            println!("refreshes: {}", self.refreshes);
            println!("scrub_reads: {}", self.scrub_reads);
            println!("preventive_refreshes: {}", self.preventive_refreshes);
            println!("-------------------");
        }
        if want("smd") {
            println!("=== smd ===");
            println!("act_nacks: {}", self.act_nacks);
            println!("act_partial_nacks: {}", self.act_partial_nacks);
            for (name, value) in &self.named {
                println!("{name}: {value}");
            }
            println!("-----------");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_counters_start_at_zero_and_accumulate() {
        let mut stats = Stats::new();
        assert_eq!(stats.named("bf_positives_r0_c3"), 0);
        stats.bump_named("bf_positives_r0_c3", 2);
        stats.bump_named("bf_positives_r0_c3", 3);
        assert_eq!(stats.named("bf_positives_r0_c3"), 5);
    }
}
