/// Phase definitions for the search-result paging loop
///
/// The paging loop is a small state machine; these are its states.
use std::fmt;

/// Represents where the paging loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaginationPhase {
    // ===== Active Phases =====
    /// Moving forward page by page; the last page produced links
    #[default]
    Advancing,

    /// The last attempt at the current page failed; it will be retried
    RetryingFetch,

    /// The last page was empty; moving on while the empty streak lasts
    RetryingEmpty,

    // ===== Terminal Phases =====
    /// Every page in the requested range has been visited
    Done,

    /// A failure budget ran out; links collected so far are kept
    Aborted,
}

impl PaginationPhase {
    /// Returns true if the loop has stopped
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Moves to `next` unless the loop has already stopped
    ///
    /// Returns false, leaving the phase unchanged, when `self` is terminal.
    pub fn transition(&mut self, next: PaginationPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        *self = next;
        true
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Advancing => "advancing",
            Self::RetryingFetch => "retrying_fetch",
            Self::RetryingEmpty => "retrying_empty",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for PaginationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
