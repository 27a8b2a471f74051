//! Storage traits and error types
//!
//! This module defines the trait interface for record sinks and
//! associated error types.

use crate::storage::ArticleRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Output file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Row counts before and after a compaction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompactionStats {
    pub rows_before: usize,
    pub duplicates_removed: usize,
    pub incomplete_removed: usize,
    pub rows_after: usize,
}

/// Trait for record sink implementations
///
/// A sink owns the on-disk layout of crawl output. Sessions only ever
/// append; compaction is a separate pass over a finished file.
pub trait RecordSink: Send + Sync {
    /// Returns the file that holds records for a (site, keyword) pair
    fn record_path(&self, site: &str, encoded_keyword: &str) -> PathBuf;

    /// Appends records to the file at `path`
    ///
    /// Creates the file (and its parent directories) with a header row when
    /// it does not exist yet. Existing rows are never rewritten.
    fn append(&self, records: &[ArticleRecord], path: &Path) -> StorageResult<()>;

    /// Rewrites the file at `path` without duplicate or incomplete rows
    ///
    /// Running it twice in a row leaves the file unchanged the second time.
    fn compact(&self, path: &Path) -> StorageResult<CompactionStats>;
}
