use std::time::Duration;

use tokio_util::sync::CancellationToken;

use fightstats_core::{FighterRecord, ListEntry, ProfileRecord};

use crate::fetch::Fetcher;
use crate::parse;
use crate::roster::Enumerator;
use crate::types::{CrawlError, CrawlEvent, CrawlOutcome};

/// Pace and batching of a crawl run.
///
/// The delays are what make the crawler a well-behaved client of a
/// third-party site; production settings must keep them. Tests zero them.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Sleep after every detail-page fetch.
    pub detail_delay: Duration,
    /// Sleep after every `batch_size` chunk of detail fetches; doubles as
    /// the pause between list pages.
    pub batch_delay: Duration,
    /// Detail fetches per chunk.
    pub batch_size: usize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            detail_delay: Duration::from_secs(1),
            batch_delay: Duration::from_millis(1500),
            batch_size: 20,
        }
    }
}

/// Receives crawl progress as it happens.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: CrawlEvent);
}

/// Progress sink that forwards events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn emit(&self, event: CrawlEvent) {
        match event {
            CrawlEvent::PageListed { origin, count } => {
                log::info!("Found {count} entries on {origin}");
            }
            CrawlEvent::ProfileCaptured { name, url } => {
                log::info!("Captured {name} ({url})");
            }
            CrawlEvent::EntrySkipped { url } => {
                log::warn!("Skipped {url}");
            }
        }
    }
}

/// Runs the full roster-and-profile crawl: every list page, then every
/// detail page, merging each profile with its originating list row.
///
/// Per-item failures are logged and skipped, never retried. The run only
/// fails as a whole when enumeration yields no candidates at all.
/// Cancellation stops new fetches promptly and returns whatever was
/// accumulated, flagged as a partial run.
pub async fn crawl_profiles(
    fetcher: &dyn Fetcher,
    roster: &mut dyn Enumerator<ListEntry>,
    settings: &CrawlSettings,
    progress: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<CrawlOutcome<FighterRecord>, CrawlError> {
    let mut records = Vec::new();
    let mut discovered = 0usize;

    'pages: while !cancel.is_cancelled() {
        let Some(page) = roster.next_page(fetcher).await else {
            break;
        };
        let total = page.entries.len();
        discovered += total;
        progress.emit(CrawlEvent::PageListed {
            origin: page.origin.clone(),
            count: total,
        });

        for (index, entry) in page.entries.into_iter().enumerate() {
            if cancel.is_cancelled() {
                break 'pages;
            }
            if entry.detail_url.is_empty() {
                continue;
            }

            match fetch_profile(fetcher, &entry.detail_url).await {
                Some(profile) => {
                    progress.emit(CrawlEvent::ProfileCaptured {
                        name: profile.name.clone(),
                        url: entry.detail_url.clone(),
                    });
                    records.push(FighterRecord::new(profile, entry));
                }
                None => progress.emit(CrawlEvent::EntrySkipped {
                    url: entry.detail_url.clone(),
                }),
            }

            tokio::time::sleep(settings.detail_delay).await;
            if (index + 1) % settings.batch_size == 0 {
                tokio::time::sleep(settings.batch_delay).await;
            }
        }

        // The trailing partial chunk gets the same pause; it is also the
        // gap before the next list request.
        if total > 0 && total % settings.batch_size != 0 {
            tokio::time::sleep(settings.batch_delay).await;
        }
    }

    let cancelled = cancel.is_cancelled();
    if discovered == 0 && !cancelled {
        return Err(CrawlError::NoCandidates);
    }
    Ok(CrawlOutcome {
        records,
        discovered,
        cancelled,
    })
}

/// Single-level variant for listing crawls with no detail step, such as the
/// portrait-card dataset.
pub async fn crawl_cards<T: Send>(
    fetcher: &dyn Fetcher,
    pages: &mut dyn Enumerator<T>,
    settings: &CrawlSettings,
    progress: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<CrawlOutcome<T>, CrawlError> {
    let mut records = Vec::new();

    while !cancel.is_cancelled() {
        let Some(page) = pages.next_page(fetcher).await else {
            break;
        };
        progress.emit(CrawlEvent::PageListed {
            origin: page.origin.clone(),
            count: page.entries.len(),
        });
        records.extend(page.entries);
        tokio::time::sleep(settings.batch_delay).await;
    }

    let cancelled = cancel.is_cancelled();
    let discovered = records.len();
    if discovered == 0 && !cancelled {
        return Err(CrawlError::NoCandidates);
    }
    Ok(CrawlOutcome {
        records,
        discovered,
        cancelled,
    })
}

async fn fetch_profile(fetcher: &dyn Fetcher, url: &str) -> Option<ProfileRecord> {
    let body = match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(err) => {
            log::warn!("Detail request for {url} failed: {err}");
            return None;
        }
    };
    Some(parse::parse_profile(&body, url, capture_timestamp()))
}

/// Timestamp recorded on every captured profile.
fn capture_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
