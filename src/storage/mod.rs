//! Storage module for persisting crawl output
//!
//! This module handles everything written to disk by a crawl:
//! - The `ArticleRecord` row type and its normalization rules
//! - The `RecordSink` trait sessions write through
//! - `CsvSink`, one append-only CSV file per (site, keyword) pair
//! - Compaction of finished files

mod csv_sink;
mod traits;

pub use csv_sink::{CsvSink, CSV_HEADER};
pub use traits::{CompactionStats, RecordSink, StorageError, StorageResult};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder stored in place of a missing title, body or publish date
pub const NOT_AVAILABLE: &str = "N/A";

/// One harvested article, as persisted
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,

    #[serde(rename = "text")]
    pub body_text: String,

    pub url: String,

    /// `YYYY-MM-DD`, or [`NOT_AVAILABLE`]
    pub published_time: String,
}

impl ArticleRecord {
    /// Builds a record, substituting `N/A` for whatever is missing
    ///
    /// Title and body count as missing when they are blank after trimming.
    ///
    /// # Example
    ///
    /// ```
    /// use press_trawl::storage::ArticleRecord;
    ///
    /// let record = ArticleRecord::normalized("https://example.com/a", None, Some("  "), None);
    /// assert_eq!(record.title, "N/A");
    /// assert_eq!(record.body_text, "N/A");
    /// assert_eq!(record.published_time, "N/A");
    /// ```
    pub fn normalized(
        url: impl Into<String>,
        title: Option<&str>,
        body_text: Option<&str>,
        published: Option<NaiveDate>,
    ) -> Self {
        Self {
            title: non_blank(title),
            body_text: non_blank(body_text),
            url: url.into(),
            published_time: published
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }

    /// Returns true if the body is the `N/A` placeholder
    pub fn has_empty_body(&self) -> bool {
        self.body_text == NOT_AVAILABLE
    }

    /// Returns true if any column is empty or holds the `N/A` placeholder
    ///
    /// Such rows are what compaction drops.
    pub fn is_incomplete(&self) -> bool {
        [&self.title, &self.body_text, &self.url, &self.published_time]
            .into_iter()
            .any(|field| is_missing(field))
    }
}

fn is_missing(field: &str) -> bool {
    let field = field.trim();
    field.is_empty() || field == NOT_AVAILABLE
}

fn non_blank(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_keeps_present_fields() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 9).unwrap();
        let record = ArticleRecord::normalized(
            "https://example.com/a",
            Some(" Headline "),
            Some("Body text"),
            Some(date),
        );
        assert_eq!(record.title, "Headline");
        assert_eq!(record.body_text, "Body text");
        assert_eq!(record.published_time, "2021-03-09");
        assert!(!record.has_empty_body());
    }

    #[test]
    fn test_normalized_fills_missing_fields() {
        let record = ArticleRecord::normalized("https://example.com/a", Some(""), None, None);
        assert_eq!(record.title, NOT_AVAILABLE);
        assert_eq!(record.body_text, NOT_AVAILABLE);
        assert_eq!(record.published_time, NOT_AVAILABLE);
        assert!(record.has_empty_body());
        assert!(record.is_incomplete());
    }

    #[test]
    fn test_is_incomplete() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut record =
            ArticleRecord::normalized("https://example.com/a", Some("t"), Some("b"), Some(date));
        assert!(!record.is_incomplete());

        record.url.clear();
        assert!(record.is_incomplete());

        let undated = ArticleRecord::normalized("https://example.com/a", Some("t"), Some("b"), None);
        assert!(undated.is_incomplete());
    }
}
