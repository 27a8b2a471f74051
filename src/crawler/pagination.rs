//! Search-result paging
//!
//! The pagination controller walks a site's search pages from `start-page`
//! to `end-page` and collects every article link they list. It absorbs two
//! kinds of trouble, each with its own budget:
//!
//! | Outcome | Page | Counter | Budget exhausted |
//! |---------|------|---------|------------------|
//! | Links found | advance | both reset | |
//! | Loaded, no links | advance | empty streak +1 | stop (`aborted`) |
//! | Fetch or shape failure | retry same page | failure streak +1 | stop (`aborted`) |
//!
//! Stopping early is not an error: links gathered so far are kept.

use crate::config::CrawlerConfig;
use crate::crawler::extractor::extract_urls;
use crate::crawler::fetcher::Fetcher;
use crate::sites::{SiteProfile, TimeFilter};
use crate::state::{PaginationPhase, SessionState, UrlSet};
use crate::{ExtractError, FetchError};
use thiserror::Error;
use url::Url;

/// Result of paging through one search
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Every distinct link found, sorted
    pub urls: UrlSet,

    /// `Done` or `Aborted`
    pub phase: PaginationPhase,

    /// Search page requests made, retries included
    pub requests: u32,

    /// Set when a budget ran out
    pub abort_reason: Option<String>,
}

#[derive(Debug, Error)]
enum PageFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unexpected page shape: {0}")]
    Extract(#[from] ExtractError),
}

/// Drives the paging loop for one (site, keyword) search
pub struct PaginationController<'a> {
    fetcher: &'a dyn Fetcher,
    profile: &'a SiteProfile,
    settings: &'a CrawlerConfig,
}

impl<'a> PaginationController<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        profile: &'a SiteProfile,
        settings: &'a CrawlerConfig,
    ) -> Self {
        Self {
            fetcher,
            profile,
            settings,
        }
    }

    /// Pages through search results and freezes the links found
    ///
    /// `state` must already be initialized at the start page; its page,
    /// streak counters and phase are updated as the loop runs.
    ///
    /// # Arguments
    ///
    /// * `encoded_keyword` - Keyword joined with the site's joiner
    /// * `filter` - Optional publication window embedded in the search URL
    /// * `state` - The session's state
    pub async fn discover(
        &self,
        encoded_keyword: &str,
        filter: &TimeFilter,
        state: &mut SessionState,
    ) -> Discovery {
        let end_page = self.settings.end_page;
        let mut discovered = Vec::new();
        let mut requests = 0;
        let mut abort_reason = None;

        while !state.phase.is_terminal() {
            if state.current_page > end_page {
                state.phase.transition(PaginationPhase::Done);
                break;
            }

            let page = state.current_page;
            tracing::info!("Getting page {} of {} from {}", page, end_page, self.profile.id);
            requests += 1;

            match self.fetch_page(page, encoded_keyword, filter).await {
                Ok(urls) if !urls.is_empty() => {
                    tracing::debug!("Page {} of {}: {} links", page, self.profile.id, urls.len());
                    discovered.extend(urls);
                    state.record_productive_page();
                    state.phase.transition(PaginationPhase::Advancing);
                }
                Ok(_) => {
                    tokio::time::sleep(self.settings.sleep_on_empty_page()).await;
                    let streak = state.record_empty_page();
                    tracing::info!(
                        "Page {} of {} had no results ({} empty in a row)",
                        page,
                        self.profile.id,
                        streak
                    );
                    if streak >= self.settings.max_empty_page_retries {
                        let reason = format!(
                            "{} consecutive empty pages from {}, last was page {}",
                            streak, self.profile.id, page
                        );
                        tracing::warn!("Stopping discovery: {}", reason);
                        abort_reason = Some(reason);
                        state.phase.transition(PaginationPhase::Aborted);
                    } else {
                        state.phase.transition(PaginationPhase::RetryingEmpty);
                    }
                }
                Err(e) => {
                    tokio::time::sleep(self.settings.sleep_on_fetch_error()).await;
                    let streak = state.record_fetch_failure();
                    tracing::warn!(
                        "Page {} of {} failed (attempt {} of {}): {}",
                        page,
                        self.profile.id,
                        streak,
                        self.settings.max_fetch_retries,
                        e
                    );
                    if streak >= self.settings.max_fetch_retries {
                        let reason = format!(
                            "page {} of {} failed {} times in a row",
                            page, self.profile.id, streak
                        );
                        tracing::warn!("Stopping discovery: {}", reason);
                        abort_reason = Some(reason);
                        state.phase.transition(PaginationPhase::Aborted);
                    } else {
                        state.phase.transition(PaginationPhase::RetryingFetch);
                    }
                }
            }
        }

        Discovery {
            urls: UrlSet::freeze(discovered),
            phase: state.phase,
            requests,
            abort_reason,
        }
    }

    async fn fetch_page(
        &self,
        page: u32,
        encoded_keyword: &str,
        filter: &TimeFilter,
    ) -> Result<Vec<String>, PageFailure> {
        let search_url = self.profile.search_url(page, encoded_keyword, filter);
        let request_url = Url::parse(&search_url).map_err(|source| FetchError::InvalidUrl {
            url: search_url.clone(),
            source,
        })?;

        let body = self.fetcher.fetch(&search_url, self.profile.strategy).await?;
        Ok(extract_urls(&body, self.profile, &request_url)?)
    }
}
