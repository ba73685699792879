use std::fmt;

use thiserror::Error;

/// One batch of entries produced by a roster enumerator, tagged with the
/// list request it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterPage<T> {
    pub origin: PageOrigin,
    pub entries: Vec<T>,
}

/// Identifies the list request a page of entries came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOrigin {
    /// A first-letter segment bucket.
    Segment(String),
    /// A zero-based page number.
    Numbered(u32),
}

impl fmt::Display for PageOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageOrigin::Segment(key) => write!(f, "segment '{key}'"),
            PageOrigin::Numbered(page) => write!(f, "page {page}"),
        }
    }
}

/// Classified failure of a single bounded fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchFailure,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FetchFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The request completed with a non-200 status.
    Status(u16),
    /// The request or connect timeout elapsed.
    Timeout,
    /// DNS, connect or transfer failure.
    Transport,
    /// The URL could not be parsed.
    InvalidUrl,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Status(code) => write!(f, "http status {code}"),
            FetchFailure::Timeout => write!(f, "timeout"),
            FetchFailure::Transport => write!(f, "transport error"),
            FetchFailure::InvalidUrl => write!(f, "invalid url"),
        }
    }
}

/// Progress notification emitted while a crawl runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A list page produced this many candidate entries.
    PageListed { origin: PageOrigin, count: usize },
    /// A detail page was fetched and parsed into a record.
    ProfileCaptured { name: String, url: String },
    /// A candidate's detail fetch failed; the item was skipped.
    EntrySkipped { url: String },
}

/// What one crawl run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome<T> {
    /// Accumulated records, in discovery order.
    pub records: Vec<T>,
    /// Total candidates discovered across all list pages.
    pub discovered: usize,
    /// True when the run was cut short by cancellation; callers decide
    /// whether a partial dataset may reach the sink.
    pub cancelled: bool,
}

/// Run-level crawl failure. Per-item failures never surface here.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Enumeration produced zero candidates across every segment and page.
    #[error("enumeration produced no candidates")]
    NoCandidates,
}
