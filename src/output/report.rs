//! Run summaries
//!
//! This module provides the summary types returned by sessions and batches,
//! and the plain-text printers the CLI uses for them.

use crate::state::PaginationPhase;
use crate::storage::CompactionStats;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one (site, keyword) run
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub site: String,
    pub keyword: String,

    /// CSV file the run appended to
    pub output_path: PathBuf,

    /// How page discovery ended (`done` or `aborted`)
    pub discovery_phase: PaginationPhase,

    /// Why discovery stopped early, if it did
    pub abort_reason: Option<String>,

    /// Unique article URLs discovered
    pub urls_found: usize,

    /// Articles attempted
    pub processed: usize,

    /// Records written to the output file
    pub saved: usize,

    pub parse_failures: u32,

    /// True when the parse-failure budget ran out before every URL was tried
    pub stopped_early: bool,

    pub compaction: Option<CompactionStats>,

    pub elapsed: Duration,
}

impl SessionReport {
    /// Returns true if either failure budget ran out
    pub fn is_partial(&self) -> bool {
        self.stopped_early || self.discovery_phase == PaginationPhase::Aborted
    }
}

/// A (site, keyword) run that ended in an error
#[derive(Debug, Clone)]
pub struct PairFailure {
    pub site: String,
    pub keyword: String,
    pub error: String,
}

/// Outcome of an `auto` batch
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub completed: Vec<SessionReport>,
    pub failed: Vec<PairFailure>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn total_pairs(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    pub fn total_saved(&self) -> usize {
        self.completed.iter().map(|r| r.saved).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Prints a session summary to stdout
pub fn print_session_report(report: &SessionReport) {
    let status = if report.is_partial() { "partial" } else { "complete" };
    println!("=== {} / '{}' ({}) ===", report.site, report.keyword, status);
    println!("  Output: {}", report.output_path.display());
    println!(
        "  Discovery: {} ({} unique URLs)",
        report.discovery_phase, report.urls_found
    );
    if let Some(reason) = &report.abort_reason {
        println!("    stopped: {}", reason);
    }
    println!(
        "  Articles: {} processed, {} saved, {} failed",
        report.processed, report.saved, report.parse_failures
    );
    if report.stopped_early {
        println!("  Parse-failure budget exhausted; remaining URLs skipped");
    }
    if let Some(stats) = &report.compaction {
        println!(
            "  Compaction: {} -> {} rows ({} duplicates, {} incomplete)",
            stats.rows_before, stats.rows_after, stats.duplicates_removed, stats.incomplete_removed
        );
    }
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
}

/// Prints a batch summary to stdout
pub fn print_batch_report(report: &BatchReport) {
    println!("=== Batch Summary ===\n");
    println!(
        "Pairs: {} ({} completed, {} failed)",
        report.total_pairs(),
        report.completed.len(),
        report.failed.len()
    );
    println!("Records saved: {}", report.total_saved());
    println!("Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    for session in &report.completed {
        let marker = if session.is_partial() { "~" } else { "✓" };
        println!(
            "  {} {} / '{}': {} saved of {} found",
            marker, session.site, session.keyword, session.saved, session.urls_found
        );
    }
    for failure in &report.failed {
        println!("  ✗ {} / '{}': {}", failure.site, failure.keyword, failure.error);
    }
}
