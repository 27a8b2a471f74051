//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PaginationPhase`: where the search-result paging loop is
//! - `UrlSet`: the frozen, deduplicated discovery result
//! - `SessionState`: per-run counters, work queue and record buffer

mod pagination_phase;
mod session_state;

pub use pagination_phase::PaginationPhase;
pub use session_state::{SessionState, UrlSet};
