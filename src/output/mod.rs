//! Output module for run summaries and host reporting
//!
//! This module handles:
//! - Session and batch summary types
//! - Printing summaries for the CLI
//! - Memory usage snapshots logged at checkpoints

pub mod memory;
mod report;

pub use memory::{log_memory_usage, MemorySnapshot};
pub use report::{
    print_batch_report, print_session_report, BatchReport, PairFailure, SessionReport,
};
