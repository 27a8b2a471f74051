//! CSV record sink
//!
//! One file per (site, keyword) pair at
//! `<root>/<site>/<site>_<encoded keyword>.csv`.

use crate::storage::traits::{CompactionStats, RecordSink, StorageError, StorageResult};
use crate::storage::ArticleRecord;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Column names, written once when a file is created
pub const CSV_HEADER: [&str; 4] = ["title", "text", "url", "published_time"];

/// Append-only CSV sink rooted at an output directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    root: PathBuf,
}

impl CsvSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_all(path: &Path) -> StorageResult<Vec<ArticleRecord>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<ArticleRecord>() {
            records.push(row?);
        }
        Ok(records)
    }

    fn rewrite(path: &Path, records: &[ArticleRecord]) -> StorageResult<()> {
        let tmp_path = path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp_path)?;
            writer.write_record(CSV_HEADER)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

impl RecordSink for CsvSink {
    /// `<root>/<site>/<site>_<encoded keyword>.csv`
    ///
    /// # Arguments
    ///
    /// * `site` - Site identifier, used as both directory and file prefix
    /// * `encoded_keyword` - Keyword already joined with the site's joiner
    ///
    /// # Example
    ///
    /// ```
    /// use press_trawl::storage::{CsvSink, RecordSink};
    /// use std::path::Path;
    ///
    /// let sink = CsvSink::new("data");
    /// assert_eq!(
    ///     sink.record_path("nypost", "gun+policy"),
    ///     Path::new("data/nypost/nypost_gun+policy.csv")
    /// );
    /// ```
    fn record_path(&self, site: &str, encoded_keyword: &str) -> PathBuf {
        self.root
            .join(site)
            .join(format!("{}_{}.csv", site, encoded_keyword))
    }

    fn append(&self, records: &[ArticleRecord], path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let needs_header = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(CSV_HEADER)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        tracing::debug!("Appended {} records to {}", records.len(), path.display());
        Ok(())
    }

    fn compact(&self, path: &Path) -> StorageResult<CompactionStats> {
        if !path.exists() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }

        let records = Self::read_all(path)?;
        let mut stats = CompactionStats {
            rows_before: records.len(),
            ..CompactionStats::default()
        };

        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            if record.is_incomplete() {
                stats.incomplete_removed += 1;
                continue;
            }
            if !seen.insert(record.clone()) {
                stats.duplicates_removed += 1;
                continue;
            }
            kept.push(record);
        }
        stats.rows_after = kept.len();

        Self::rewrite(path, &kept)?;
        tracing::info!(
            "Compacted {}: {} -> {} rows ({} duplicates, {} incomplete)",
            path.display(),
            stats.rows_before,
            stats.rows_after,
            stats.duplicates_removed,
            stats.incomplete_removed
        );
        Ok(stats)
    }
}
