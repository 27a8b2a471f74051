//! Crawl session: one complete (site, keyword) run
//!
//! A session runs the whole cycle for one request:
//! 1. Page through search results into a frozen, sorted URL set
//! 2. Process each article in order, buffering records
//! 3. Every `checkpoint-interval` articles, flush the buffer to the sink,
//!    release the processed URLs and report memory
//! 4. Flush whatever is left
//! 5. Optionally compact the output file
//!
//! Article failures are counted against `max-parse-failures`; when the
//! budget runs out the session stops, keeps what it already parsed, and
//! reports how many records were saved.

use crate::crawler::article::ArticleProcessor;
use crate::crawler::content::ContentExtractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::pagination::PaginationController;
use crate::crawler::request::CrawlRequest;
use crate::output::{log_memory_usage, SessionReport};
use crate::sites::SiteRegistry;
use crate::state::SessionState;
use crate::storage::{RecordSink, StorageResult};
use crate::TrawlError;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Runs crawl requests against one fetcher, extractor and sink
///
/// The session owns its [`SessionState`]; running a second request resets it.
pub struct CrawlSession {
    registry: Arc<SiteRegistry>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn ContentExtractor>,
    sink: Arc<dyn RecordSink>,
    state: SessionState,
}

impl CrawlSession {
    pub fn new(
        registry: Arc<SiteRegistry>,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn ContentExtractor>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            extractor,
            sink,
            state: SessionState::default(),
        }
    }

    /// State left behind by the most recent run
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Runs one request to completion
    ///
    /// # Returns
    ///
    /// * `Ok(SessionReport)` - The run finished, possibly early because a
    ///   failure budget ran out
    /// * `Err(TrawlError)` - The request was invalid, the site is unknown, or
    ///   the output file could not be written
    pub async fn run(&mut self, request: &CrawlRequest) -> Result<SessionReport, TrawlError> {
        request.validate()?;
        let profile = self.registry.profile(&request.site)?.clone();
        let settings = &request.settings;
        let encoded_keyword = profile.encode_keyword(&request.keyword);
        let output_path = self.sink.record_path(&profile.id, &encoded_keyword);
        let started = Instant::now();

        tracing::info!(
            "Crawling {} for '{}' (pages {}..={}, strategy {})",
            profile.id,
            request.keyword,
            settings.start_page,
            settings.end_page,
            profile.strategy
        );
        if !request.time_filter.is_unbounded() {
            tracing::info!(
                "Time window: {} to {}",
                or_open(request.time_filter.begin_param()),
                or_open(request.time_filter.end_param())
            );
        }

        self.state.init(settings.start_page);
        let discovery = PaginationController::new(self.fetcher.as_ref(), &profile, settings)
            .discover(&encoded_keyword, &request.time_filter, &mut self.state)
            .await;

        let urls_found = discovery.urls.len();
        tracing::info!(
            "Discovery for {} '{}' {}: {} unique URLs",
            profile.id,
            request.keyword,
            discovery.phase,
            urls_found
        );
        self.state.load_pending(discovery.urls);

        let processor = ArticleProcessor::new(self.fetcher.as_ref(), self.extractor.as_ref());
        let mut stopped_early = false;
        // Index into `pending_urls`; the prefix before it is processed but
        // not yet released by a checkpoint
        let mut cursor = 0;

        while let Some(url) = self.state.pending_urls.get(cursor).cloned() {
            cursor += 1;
            let processed = self.state.record_processed();

            match processor.process(&url).await {
                Ok(record) => {
                    if !settings.keep_empty_body && record.has_empty_body() {
                        tracing::debug!("Dropping {} (no body text)", url);
                    } else {
                        self.state.buffered_records.push(record);
                    }
                }
                Err(e) => {
                    tokio::time::sleep(settings.sleep_on_parse_error()).await;
                    let failures = self.state.record_parse_failure();
                    tracing::warn!(
                        "Failed to parse {} ({} of {}): {} [{} failures so far]",
                        url,
                        processed,
                        urls_found,
                        e,
                        failures
                    );
                    if failures >= settings.max_parse_failures {
                        stopped_early = true;
                        break;
                    }
                }
            }

            if processed % settings.checkpoint_interval == 0 {
                checkpoint(self.sink.as_ref(), &mut self.state, &output_path, cursor)?;
                cursor = 0;
            }
        }

        flush(self.sink.as_ref(), &mut self.state, &output_path)?;
        self.state.release_processed(cursor);

        if stopped_early {
            tracing::warn!(
                "Stopped {} '{}' after {} parse failures; {} records saved",
                profile.id,
                request.keyword,
                self.state.total_parse_failures,
                self.state.saved_count
            );
        }

        let compaction = if request.compact_after_run {
            Some(self.sink.compact(&output_path)?)
        } else {
            None
        };

        tracing::info!("{} saved {} results", request.keyword, self.state.saved_count);

        Ok(SessionReport {
            site: profile.id.clone(),
            keyword: request.keyword.clone(),
            output_path,
            discovery_phase: discovery.phase,
            abort_reason: discovery.abort_reason,
            urls_found,
            processed: self.state.processed_count,
            saved: self.state.saved_count,
            parse_failures: self.state.total_parse_failures,
            stopped_early,
            compaction,
            elapsed: started.elapsed(),
        })
    }
}

fn or_open(bound: String) -> String {
    if bound.is_empty() {
        "open".to_string()
    } else {
        bound
    }
}

/// Appends buffered records to the output file and empties the buffer
fn flush(sink: &dyn RecordSink, state: &mut SessionState, path: &Path) -> StorageResult<usize> {
    let records = state.take_buffered();
    sink.append(&records, path)?;
    state.saved_count += records.len();
    tracing::info!("Saved to {}", path.display());
    Ok(records.len())
}

/// Flushes, releases `processed` URLs from the work queue, and reclaims memory
fn checkpoint(
    sink: &dyn RecordSink,
    state: &mut SessionState,
    path: &Path,
    processed: usize,
) -> StorageResult<()> {
    let written = flush(sink, state, path)?;
    state.release_processed(processed);
    state.reclaim_memory();
    tracing::info!(
        "Checkpoint: {} articles processed, {} written this round, {} pending",
        state.processed_count,
        written,
        state.pending_urls.len()
    );
    log_memory_usage();
    Ok(())
}
