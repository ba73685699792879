use crate::fetch::Fetcher;
use crate::types::{PageOrigin, RosterPage};

/// The fixed roster segmentation: one bucket per letter plus the `other`
/// bucket for names outside a-z.
pub fn segment_keys() -> Vec<String> {
    let mut keys: Vec<String> = ('a'..='z').map(|c| c.to_string()).collect();
    keys.push("other".to_string());
    keys
}

/// Turns a fetched list page into candidate entries.
pub type PageParser<T> = Box<dyn Fn(&str) -> Vec<T> + Send + Sync>;

/// Produces the roster as a finite sequence of pages. Returning `None` is
/// the terminal marker; callers never compare against an empty collection
/// to decide whether enumeration has ended.
#[async_trait::async_trait]
pub trait Enumerator<T>: Send {
    async fn next_page(&mut self, fetcher: &dyn Fetcher) -> Option<RosterPage<T>>;
}

/// Pages through a fixed set of segment keys, issuing one "list all"
/// request per key.
pub struct KeyedEnumerator<T> {
    base_url: String,
    keys: Vec<String>,
    next: usize,
    parse: PageParser<T>,
}

impl<T> KeyedEnumerator<T> {
    pub fn new(base_url: impl Into<String>, keys: Vec<String>, parse: PageParser<T>) -> Self {
        Self {
            base_url: base_url.into(),
            keys,
            next: 0,
            parse,
        }
    }

    fn segment_url(&self, key: &str) -> String {
        format!("{}?char={key}&page=all", self.base_url)
    }
}

#[async_trait::async_trait]
impl<T: Send> Enumerator<T> for KeyedEnumerator<T> {
    async fn next_page(&mut self, fetcher: &dyn Fetcher) -> Option<RosterPage<T>> {
        let key = self.keys.get(self.next)?.clone();
        self.next += 1;

        let url = self.segment_url(&key);
        let entries = match fetcher.fetch(&url).await {
            Ok(body) => (self.parse)(&body),
            Err(err) => {
                // The key space is fixed and finite, so a failed segment
                // does not end the roster; it just contributes nothing.
                log::warn!("List request for segment '{key}' failed: {err}");
                Vec::new()
            }
        };
        Some(RosterPage {
            origin: PageOrigin::Segment(key),
            entries,
        })
    }
}

/// Pages through numbered list pages from 0 until one comes back empty or
/// fails. There is no upper bound other than the empty-page sentinel.
pub struct NumberedEnumerator<T> {
    base_url: String,
    next_page: u32,
    finished: bool,
    parse: PageParser<T>,
}

impl<T> NumberedEnumerator<T> {
    pub fn new(base_url: impl Into<String>, parse: PageParser<T>) -> Self {
        Self {
            base_url: base_url.into(),
            next_page: 0,
            finished: false,
            parse,
        }
    }

    fn page_url(&self, page: u32) -> String {
        format!("{}?page={page}", self.base_url)
    }
}

#[async_trait::async_trait]
impl<T: Send> Enumerator<T> for NumberedEnumerator<T> {
    async fn next_page(&mut self, fetcher: &dyn Fetcher) -> Option<RosterPage<T>> {
        if self.finished {
            return None;
        }
        let page = self.next_page;
        self.next_page += 1;

        let url = self.page_url(page);
        let entries = match fetcher.fetch(&url).await {
            Ok(body) => (self.parse)(&body),
            Err(err) => {
                // An open-ended stream has no way to skip ahead; treat the
                // failure as the end of the roster.
                log::warn!("List request for page {page} failed: {err}, stopping");
                self.finished = true;
                return None;
            }
        };

        if entries.is_empty() {
            log::info!("No entries on page {page}, enumeration complete");
            self.finished = true;
            return None;
        }
        Some(RosterPage {
            origin: PageOrigin::Numbered(page),
            entries,
        })
    }
}
