//! Fightstats crawler binary.
//!
//! Runs the roster-and-profile crawl and the portrait-card crawl against the
//! public stats sites, then bulk-replaces each destination in the document
//! store with the freshly built dataset.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use fightstats_engine::{
    crawl_cards, crawl_profiles, parse_athlete_cards, parse_roster_rows, replace_all,
    segment_keys, CrawlSettings, FetchSettings, JsonLinesStore, KeyedEnumerator, LogProgress,
    NumberedEnumerator, ReqwestFetcher,
};

/// Roster listing of the statistics site, segmented by first letter.
const FIGHTER_LIST_URL: &str = "http://ufcstats.com/statistics/fighters";
/// Base of the promotion site that serves the athlete portrait cards.
const ATHLETES_BASE_URL: &str = "https://www.ufc.com";
/// Numbered athlete listing under that base.
const ATHLETES_LIST_PATH: &str = "/athletes/all";

const FIGHTERS_DESTINATION: &str = "fighter_weight_record";
const IMAGES_DESTINATION: &str = "fighter_images";

/// Where the JSON-lines store keeps its collections.
const DATA_DIR: &str = "data";

/// The portrait listing is lighter on the source site than detail fetches,
/// so its pages use a shorter pause.
const CARD_PAGE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Fighters,
    Images,
    All,
}

fn job_from_args() -> Option<Job> {
    match std::env::args().nth(1).as_deref() {
        None | Some("all") => Some(Job::All),
        Some("fighters") => Some(Job::Fighters),
        Some("images") => Some(Job::Images),
        Some(other) => {
            eprintln!("unknown job '{other}', expected: fighters | images | all");
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crawl_logging::init();

    let Some(job) = job_from_args() else {
        std::process::exit(2);
    };

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Ctrl-C received, stopping after the current fetch");
            watcher.cancel();
        }
    });

    let fetcher = ReqwestFetcher::new(&FetchSettings::default())?;
    let store = JsonLinesStore::new(DATA_DIR);

    if matches!(job, Job::Fighters | Job::All) {
        run_fighters(&fetcher, &store, &cancel).await?;
    }
    if matches!(job, Job::Images | Job::All) && !cancel.is_cancelled() {
        run_images(&fetcher, &store, &cancel).await?;
    }
    Ok(())
}

async fn run_fighters(
    fetcher: &ReqwestFetcher,
    store: &JsonLinesStore,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    log::info!("Fetching fighter roster from {FIGHTER_LIST_URL}");
    let mut roster = KeyedEnumerator::new(
        FIGHTER_LIST_URL,
        segment_keys(),
        Box::new(|html: &str| parse_roster_rows(html)),
    );

    let outcome = crawl_profiles(
        fetcher,
        &mut roster,
        &CrawlSettings::default(),
        &LogProgress,
        cancel,
    )
    .await?;

    log::info!(
        "Crawl complete: {} candidates discovered, {} detailed records collected",
        outcome.discovered,
        outcome.records.len()
    );
    if outcome.cancelled {
        // A partial dataset must not bulk-replace the destination.
        log::warn!(
            "Run cancelled; discarding partial dataset of {} records",
            outcome.records.len()
        );
        return Ok(());
    }

    let inserted = replace_all(store, FIGHTERS_DESTINATION, &outcome.records).await?;
    log::info!("Ingested {inserted} fighter records into '{FIGHTERS_DESTINATION}'");
    Ok(())
}

async fn run_images(
    fetcher: &ReqwestFetcher,
    store: &JsonLinesStore,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    log::info!("Fetching athlete portrait cards from {ATHLETES_BASE_URL}{ATHLETES_LIST_PATH}");
    let base = url::Url::parse(ATHLETES_BASE_URL)?;
    let mut pages = NumberedEnumerator::new(
        format!("{ATHLETES_BASE_URL}{ATHLETES_LIST_PATH}"),
        Box::new(move |html: &str| parse_athlete_cards(html, &base)),
    );

    let settings = CrawlSettings {
        batch_delay: CARD_PAGE_DELAY,
        ..CrawlSettings::default()
    };
    let outcome = crawl_cards(fetcher, &mut pages, &settings, &LogProgress, cancel).await?;

    log::info!("Collected {} portrait cards", outcome.records.len());
    if outcome.cancelled {
        log::warn!(
            "Run cancelled; discarding partial dataset of {} records",
            outcome.records.len()
        );
        return Ok(());
    }

    let inserted = replace_all(store, IMAGES_DESTINATION, &outcome.records).await?;
    log::info!("Ingested {inserted} portrait cards into '{IMAGES_DESTINATION}'");
    Ok(())
}
