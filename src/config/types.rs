use crate::sites::{SiteProfile, SiteRegistry, Strategy, TimeFilter};
use crate::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Press-Trawl
///
/// Every table is optional; a missing table takes the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
    pub time_filter: TimeFilterConfig,
    pub batch: BatchConfig,

    /// Extra or overriding site profiles (`[[site]]` tables)
    #[serde(rename = "site")]
    pub sites: Vec<SiteEntry>,
}

impl Config {
    /// The built-in site registry with any `[[site]]` tables applied on top
    pub fn site_registry(&self) -> Result<SiteRegistry, ConfigError> {
        let overrides = self
            .sites
            .iter()
            .map(SiteProfile::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        SiteRegistry::builtin().with_overrides(overrides)
    }
}

/// Paging range, pauses and failure budgets
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// First search page to request
    pub start_page: u32,

    /// Last search page to request (inclusive)
    pub end_page: u32,

    /// Pause before retrying a search page that failed (milliseconds)
    pub sleep_on_fetch_error_ms: u64,

    /// Pause after a search page with no results (milliseconds)
    pub sleep_on_empty_page_ms: u64,

    /// Pause after an article that failed to parse (milliseconds)
    pub sleep_on_parse_error_ms: u64,

    /// Consecutive failures on one search page before discovery stops
    pub max_fetch_retries: u32,

    /// Consecutive empty search pages before discovery stops
    pub max_empty_page_retries: u32,

    /// Article failures, over the whole run, before the run stops
    pub max_parse_failures: u32,

    /// Articles processed between checkpoints
    pub checkpoint_interval: usize,

    /// Whether articles with no body text are written out (as "N/A")
    pub keep_empty_body: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_page: 1,
            end_page: 2,
            sleep_on_fetch_error_ms: 500,
            sleep_on_empty_page_ms: 500,
            sleep_on_parse_error_ms: 500,
            max_fetch_retries: 10,
            max_empty_page_retries: 10,
            max_parse_failures: 1000,
            checkpoint_interval: 100,
            keep_empty_body: true,
        }
    }
}

impl CrawlerConfig {
    pub fn sleep_on_fetch_error(&self) -> Duration {
        Duration::from_millis(self.sleep_on_fetch_error_ms)
    }

    pub fn sleep_on_empty_page(&self) -> Duration {
        Duration::from_millis(self.sleep_on_empty_page_ms)
    }

    pub fn sleep_on_parse_error(&self) -> Duration {
        Duration::from_millis(self.sleep_on_parse_error_ms)
    }
}

/// HTTP and browser request settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    pub user_agent: String,

    /// Per-request timeout for plain HTTP fetches (seconds)
    pub timeout_secs: u64,

    pub max_redirects: usize,

    /// Upper bound on one headless-browser page load (seconds)
    pub browser_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "newspaper/0.2.8".to_string(),
            timeout_secs: 7,
            max_redirects: 10,
            browser_timeout_secs: 30,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory; files land in `<root>/<site>/<site>_<keyword>.csv`
    pub root: String,

    /// Deduplicate the output file after each run
    pub compact_after_run: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: "data".to_string(),
            compact_after_run: true,
        }
    }
}

/// Optional publication window, as `YYYY-MM-DD` or `YYYYMMDD`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TimeFilterConfig {
    pub begin: Option<String>,
    pub end: Option<String>,
}

impl TimeFilterConfig {
    pub fn to_filter(&self) -> Result<TimeFilter, ConfigError> {
        TimeFilter::parse(self.begin.as_deref(), self.end.as_deref())
    }
}

/// Site × keyword batch definition for `auto` mode
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BatchConfig {
    pub sites: Vec<String>,
    pub keywords: Vec<String>,

    /// Number of (site, keyword) runs allowed in flight at once
    pub max_parallel_runs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sites: Vec::new(),
            keywords: Vec::new(),
            max_parallel_runs: 1,
        }
    }
}

/// A `[[site]]` table describing an extra search profile
///
/// ```toml
/// [[site]]
/// id = "example"
/// strategy = "api"
/// joiner = "+"
/// template = "https://example.com/api/search?q={keyword}&page={page}"
/// json-path = ["data", "hits"]
/// json-field = "url"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteEntry {
    pub id: String,
    pub strategy: Strategy,
    pub joiner: String,
    pub template: String,

    /// Class substring of article anchors (HTML strategies, or `json-html`)
    #[serde(default)]
    pub anchor_class: Option<String>,

    /// Class substring of the `<div>` that holds the results
    #[serde(default)]
    pub pre_container: Option<String>,

    /// Keys leading from the JSON root to the result list
    #[serde(default)]
    pub json_path: Vec<String>,

    /// Per-item field holding the article URL
    #[serde(default)]
    pub json_field: Option<String>,

    /// Fail the page when an item lacks `json-field` instead of skipping it
    #[serde(default)]
    pub json_field_required: bool,

    /// The JSON path ends at an HTML fragment to scrape with `anchor-class`
    #[serde(default)]
    pub json_html: bool,

    #[serde(default = "default_true")]
    pub has_domain_prefix: bool,
}

fn default_true() -> bool {
    true
}
