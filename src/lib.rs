//! Press-Trawl: keyword-driven news harvesting
//!
//! This crate searches a fixed set of publisher sites for a keyword, pages
//! through their search results to discover article URLs, fetches each
//! article, and appends title/text/url/date rows to one CSV file per
//! (site, keyword) pair. Transient failures are absorbed by bounded retry
//! budgets; long runs are checkpointed to disk every few hundred articles.

pub mod config;
pub mod crawler;
pub mod output;
pub mod sites;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Press-Trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("Invalid crawl request: {0}")]
    InvalidRequest(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD or YYYYMMDD")]
    InvalidDate(String),

    #[error("Invalid site profile '{site}': {message}")]
    InvalidSite { site: String, message: String },
}

/// A single request to a search endpoint or article page failed
///
/// The fetcher never retries; callers decide whether a failure is worth
/// another attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },
}

/// A search result page did not have the shape its site profile describes
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No JSON object found in response")]
    MissingJsonObject,

    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON key '{0}' not found")]
    MissingKey(String),

    #[error("Expected {expected} at JSON key '{key}'")]
    UnexpectedShape { key: String, expected: &'static str },

    #[error("Result item has no '{0}' field")]
    MissingField(String),

    #[error("Container '{0}' not found in page")]
    MissingContainer(String),
}

/// An article could not be downloaded or turned into a record
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to download article: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid article URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Failed to extract article content from {url}: {message}")]
    Content { url: String, message: String },
}

/// Result type alias for Press-Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlRequest, CrawlSession};
pub use sites::{SiteProfile, SiteRegistry, Strategy, TimeFilter};
pub use state::{PaginationPhase, SessionState, UrlSet};
pub use storage::{ArticleRecord, CsvSink, RecordSink};
