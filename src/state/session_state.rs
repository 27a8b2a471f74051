use crate::state::PaginationPhase;
use crate::storage::ArticleRecord;
use std::collections::VecDeque;

/// Article URLs discovered for one search, sorted and deduplicated
///
/// A `UrlSet` is only ever built from the complete list of links collected
/// while paging, so once it exists it cannot gain or lose members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlSet {
    urls: Vec<String>,
}

impl UrlSet {
    /// Freezes raw discovered links (duplicates allowed) into a set
    pub fn freeze(discovered: impl IntoIterator<Item = String>) -> Self {
        let mut urls: Vec<String> = discovered.into_iter().collect();
        urls.sort();
        urls.dedup();
        Self { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

/// Counters and buffers for one (site, keyword) run
///
/// Owned by a single crawl session and never shared. [`SessionState::init`]
/// zeroes everything before a run starts.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Search page the paging loop will request next
    pub current_page: u32,

    /// Failed attempts at the current search page, in a row
    pub consecutive_fetch_failures: u32,

    /// Search pages with no links, in a row
    pub consecutive_empty_pages: u32,

    /// Articles that failed over the whole run
    pub total_parse_failures: u32,

    /// Articles attempted so far, failed or not
    pub processed_count: usize,

    /// Records handed to the sink so far
    pub saved_count: usize,

    /// Where the paging loop is
    pub phase: PaginationPhase,

    /// Discovered URLs not yet released by a checkpoint
    pub pending_urls: VecDeque<String>,

    /// Records parsed since the last checkpoint
    pub buffered_records: Vec<ArticleRecord>,
}

impl SessionState {
    pub fn new(start_page: u32) -> Self {
        let mut state = Self::default();
        state.init(start_page);
        state
    }

    /// Resets every counter and buffer for a fresh run
    pub fn init(&mut self, start_page: u32) {
        *self = Self {
            current_page: start_page,
            ..Self::default()
        };
    }

    /// A search page produced links: move on and clear both streaks
    pub fn record_productive_page(&mut self) {
        self.current_page += 1;
        self.consecutive_fetch_failures = 0;
        self.consecutive_empty_pages = 0;
    }

    /// A search page loaded but had no links: move on, extend the empty streak
    ///
    /// Returns the new streak length.
    pub fn record_empty_page(&mut self) -> u32 {
        self.current_page += 1;
        self.consecutive_fetch_failures = 0;
        self.consecutive_empty_pages += 1;
        self.consecutive_empty_pages
    }

    /// A search page failed: stay on it, extend the failure streak
    ///
    /// Returns the new streak length.
    pub fn record_fetch_failure(&mut self) -> u32 {
        self.consecutive_fetch_failures += 1;
        self.consecutive_fetch_failures
    }

    /// Returns the running number of processed articles
    pub fn record_processed(&mut self) -> usize {
        self.processed_count += 1;
        self.processed_count
    }

    /// Returns the running number of article failures
    pub fn record_parse_failure(&mut self) -> u32 {
        self.total_parse_failures += 1;
        self.total_parse_failures
    }

    /// Installs the frozen discovery result as the work queue
    pub fn load_pending(&mut self, urls: UrlSet) {
        self.pending_urls = urls.into_vec().into();
    }

    /// Drops the first `count` pending URLs, which a checkpoint has covered
    pub fn release_processed(&mut self, count: usize) {
        let count = count.min(self.pending_urls.len());
        self.pending_urls.drain(..count);
    }

    /// Hands over the buffered records and empties the buffer
    pub fn take_buffered(&mut self) -> Vec<ArticleRecord> {
        std::mem::take(&mut self.buffered_records)
    }

    /// Returns spare buffer capacity to the allocator
    pub fn reclaim_memory(&mut self) {
        self.buffered_records.shrink_to_fit();
        self.pending_urls.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> ArticleRecord {
        ArticleRecord::normalized(url, Some("t"), Some("body"), None)
    }

    #[test]
    fn test_freeze_sorts_and_dedups() {
        let set = UrlSet::freeze(vec![
            "https://b/2".to_string(),
            "https://a/1".to_string(),
            "https://b/2".to_string(),
        ]);
        assert_eq!(set.as_slice(), &["https://a/1".to_string(), "https://b/2".to_string()]);
    }

    #[test]
    fn test_freeze_empty() {
        let set = UrlSet::freeze(Vec::new());
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_init_resets_everything() {
        let mut state = SessionState::new(1);
        state.record_fetch_failure();
        state.record_empty_page();
        state.record_parse_failure();
        state.record_processed();
        state.saved_count = 4;
        state.phase = PaginationPhase::Aborted;
        state.buffered_records.push(record("https://a/1"));
        state.pending_urls.push_back("https://a/1".to_string());

        state.init(3);

        assert_eq!(state.current_page, 3);
        assert_eq!(state.consecutive_fetch_failures, 0);
        assert_eq!(state.consecutive_empty_pages, 0);
        assert_eq!(state.total_parse_failures, 0);
        assert_eq!(state.processed_count, 0);
        assert_eq!(state.saved_count, 0);
        assert_eq!(state.phase, PaginationPhase::Advancing);
        assert!(state.buffered_records.is_empty());
        assert!(state.pending_urls.is_empty());
    }

    #[test]
    fn test_fetch_failure_does_not_advance() {
        let mut state = SessionState::new(2);
        assert_eq!(state.record_fetch_failure(), 1);
        assert_eq!(state.record_fetch_failure(), 2);
        assert_eq!(state.current_page, 2);
    }

    #[test]
    fn test_empty_page_advances_and_counts() {
        let mut state = SessionState::new(1);
        state.record_fetch_failure();
        assert_eq!(state.record_empty_page(), 1);
        assert_eq!(state.record_empty_page(), 2);
        assert_eq!(state.current_page, 3);
        assert_eq!(state.consecutive_fetch_failures, 0);
    }

    #[test]
    fn test_productive_page_clears_streaks() {
        let mut state = SessionState::new(1);
        state.record_empty_page();
        state.record_fetch_failure();
        state.record_productive_page();
        assert_eq!(state.current_page, 3);
        assert_eq!(state.consecutive_empty_pages, 0);
        assert_eq!(state.consecutive_fetch_failures, 0);
    }

    #[test]
    fn test_release_processed_drops_prefix() {
        let mut state = SessionState::new(1);
        let set = UrlSet::freeze(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        state.load_pending(set);

        state.release_processed(2);
        assert_eq!(state.pending_urls, VecDeque::from(vec!["c".to_string()]));

        state.release_processed(10);
        assert!(state.pending_urls.is_empty());
    }

    #[test]
    fn test_take_buffered_empties_buffer() {
        let mut state = SessionState::new(1);
        state.buffered_records.push(record("https://a/1"));
        let taken = state.take_buffered();
        assert_eq!(taken.len(), 1);
        assert!(state.buffered_records.is_empty());
    }
}
