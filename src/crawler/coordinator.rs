//! Crawler coordinator - batch orchestration
//!
//! The coordinator wires configuration, the site registry, fetchers and the
//! record sink together, and runs either a single (site, keyword) pair or a
//! whole site × keyword batch:
//! - Every pair gets its own fetcher and its own session state
//! - Site ids are checked before anything runs
//! - A pair that fails is logged and recorded; the batch carries on

use crate::config::Config;
use crate::crawler::content::{ContentExtractor, HtmlContentExtractor};
use crate::crawler::fetcher::{Fetcher, StrategyFetcher};
use crate::crawler::request::CrawlRequest;
use crate::crawler::session::CrawlSession;
use crate::output::{BatchReport, PairFailure, SessionReport};
use crate::sites::SiteRegistry;
use crate::storage::{CompactionStats, CsvSink, RecordSink};
use crate::TrawlError;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Builds a fresh fetcher for each (site, keyword) run
pub type FetcherFactory = Box<dyn Fn() -> Result<Arc<dyn Fetcher>, TrawlError> + Send + Sync>;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    registry: Arc<SiteRegistry>,
    fetchers: FetcherFactory,
    extractor: Arc<dyn ContentExtractor>,
    sink: Arc<dyn RecordSink>,
}

impl Coordinator {
    /// Creates a coordinator from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(TrawlError)` - A `[[site]]` table was invalid
    pub fn new(config: Config) -> Result<Self, TrawlError> {
        let registry = Arc::new(config.site_registry()?);
        let sink = Arc::new(CsvSink::new(&config.output.root));
        let http = config.http.clone();
        let fetchers: FetcherFactory = Box::new(move || {
            let fetcher: Arc<dyn Fetcher> = Arc::new(StrategyFetcher::new(&http)?);
            Ok(fetcher)
        });

        Ok(Self::with_parts(
            config,
            registry,
            fetchers,
            Arc::new(HtmlContentExtractor),
            sink,
        ))
    }

    /// Creates a coordinator from explicit parts
    pub fn with_parts(
        config: Config,
        registry: Arc<SiteRegistry>,
        fetchers: FetcherFactory,
        extractor: Arc<dyn ContentExtractor>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            fetchers,
            extractor,
            sink,
        }
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// Output file for a (site, keyword) pair
    pub fn record_path(&self, site: &str, keyword: &str) -> Result<PathBuf, TrawlError> {
        let profile = self.registry.profile(site)?;
        Ok(self
            .sink
            .record_path(&profile.id, &profile.encode_keyword(keyword)))
    }

    /// Runs one (site, keyword) pair with a fresh fetcher and state
    pub async fn crawl(&self, site: &str, keyword: &str) -> Result<SessionReport, TrawlError> {
        let request = CrawlRequest::from_config(site, keyword, &self.config)?;
        let fetcher = (self.fetchers)()?;
        let mut session = CrawlSession::new(
            Arc::clone(&self.registry),
            fetcher,
            Arc::clone(&self.extractor),
            Arc::clone(&self.sink),
        );
        session.run(&request).await
    }

    /// Runs every site × keyword pair, sites outermost
    ///
    /// Up to `max-parallel-runs` pairs are in flight at once; results are
    /// reported in pair order regardless.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchReport)` - Every pair ran; some may have failed
    /// * `Err(TrawlError)` - A site id is not registered; nothing ran
    pub async fn auto(
        &self,
        sites: &[String],
        keywords: &[String],
    ) -> Result<BatchReport, TrawlError> {
        for site in sites {
            self.registry.profile(site)?;
        }

        let started = Instant::now();
        let pairs: Vec<(&str, &str)> = sites
            .iter()
            .flat_map(|site| keywords.iter().map(move |kw| (site.as_str(), kw.as_str())))
            .collect();
        let parallel = self.config.batch.max_parallel_runs.max(1);

        tracing::info!(
            "Starting batch: {} sites x {} keywords = {} runs ({} at a time)",
            sites.len(),
            keywords.len(),
            pairs.len(),
            parallel
        );

        let outcomes: Vec<_> = stream::iter(pairs)
            .map(|(site, keyword)| async move {
                let outcome = self.crawl(site, keyword).await;
                if let Err(e) = &outcome {
                    tracing::error!("Run {} / '{}' failed: {}", site, keyword, e);
                }
                (site, keyword, outcome)
            })
            .buffered(parallel)
            .collect()
            .await;

        let mut report = BatchReport::default();
        for (site, keyword, outcome) in outcomes {
            match outcome {
                Ok(session) => report.completed.push(session),
                Err(e) => report.failed.push(PairFailure {
                    site: site.to_string(),
                    keyword: keyword.to_string(),
                    error: e.to_string(),
                }),
            }
        }
        report.elapsed = started.elapsed();

        tracing::info!(
            "Batch finished: {} of {} runs completed, {} records saved",
            report.completed.len(),
            report.total_pairs(),
            report.total_saved()
        );
        Ok(report)
    }

    /// Runs the batch described by the `[batch]` table
    pub async fn auto_from_config(&self) -> Result<BatchReport, TrawlError> {
        let batch = self.config.batch.clone();
        self.auto(&batch.sites, &batch.keywords).await
    }

    /// Deduplicates an existing output file
    pub fn compact(&self, path: &Path) -> Result<CompactionStats, TrawlError> {
        Ok(self.sink.compact(path)?)
    }
}

/// Runs a single (site, keyword) pair described by configuration
///
/// This is the main entry point for a one-off crawl.
pub async fn run_crawl(config: Config, site: &str, keyword: &str) -> Result<SessionReport, TrawlError> {
    Coordinator::new(config)?.crawl(site, keyword).await
}
