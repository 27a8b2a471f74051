//! Crawl request: the parameters of one (site, keyword) run

use crate::config::{validate_crawler_config, Config, CrawlerConfig};
use crate::sites::TimeFilter;
use crate::TrawlError;

/// Everything a [`CrawlSession`](crate::crawler::CrawlSession) needs to know
/// about one run
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Site registry key (case-sensitive)
    pub site: String,

    /// Search phrase, words separated by whitespace
    pub keyword: String,

    pub time_filter: TimeFilter,

    /// Paging range, pauses and failure budgets
    pub settings: CrawlerConfig,

    /// Deduplicate the output file once the run finishes
    pub compact_after_run: bool,
}

impl CrawlRequest {
    /// A request with default settings and no time filter
    pub fn new(site: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            keyword: keyword.into(),
            time_filter: TimeFilter::unbounded(),
            settings: CrawlerConfig::default(),
            compact_after_run: true,
        }
    }

    /// A request using the crawler, time filter and output settings of `config`
    pub fn from_config(
        site: impl Into<String>,
        keyword: impl Into<String>,
        config: &Config,
    ) -> Result<Self, TrawlError> {
        Ok(Self {
            site: site.into(),
            keyword: keyword.into(),
            time_filter: config.time_filter.to_filter()?,
            settings: config.crawler.clone(),
            compact_after_run: config.output.compact_after_run,
        })
    }

    pub fn with_settings(mut self, settings: CrawlerConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_time_filter(mut self, time_filter: TimeFilter) -> Self {
        self.time_filter = time_filter;
        self
    }

    pub fn with_compaction(mut self, compact_after_run: bool) -> Self {
        self.compact_after_run = compact_after_run;
        self
    }

    /// Rejects requests that could never run
    ///
    /// Site existence is checked against the registry by the session.
    pub fn validate(&self) -> Result<(), TrawlError> {
        if self.site.trim().is_empty() {
            return Err(TrawlError::InvalidRequest("site cannot be empty".to_string()));
        }
        if self.keyword.trim().is_empty() {
            return Err(TrawlError::InvalidRequest(
                "keyword cannot be empty".to_string(),
            ));
        }
        validate_crawler_config(&self.settings)
            .map_err(|e| TrawlError::InvalidRequest(e.to_string()))?;
        Ok(())
    }
}
