//! Crawl engine: bounded fetching, page parsing and bulk ingestion.
mod crawl;
mod fetch;
mod parse;
mod roster;
mod sink;
mod store;
mod types;

pub use crawl::{crawl_cards, crawl_profiles, CrawlSettings, LogProgress, ProgressSink};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use parse::{
    parse_athlete_cards, parse_bio_stats, parse_career_stats, parse_fight_history, parse_profile,
    parse_roster_rows,
};
pub use roster::{segment_keys, Enumerator, KeyedEnumerator, NumberedEnumerator, PageParser};
pub use sink::{replace_all, DocumentStore, InMemoryStore, SinkError, StoreError};
pub use store::JsonLinesStore;
pub use types::{
    CrawlError, CrawlEvent, CrawlOutcome, FetchError, FetchFailure, PageOrigin, RosterPage,
};
