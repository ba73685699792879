use std::sync::{Mutex, Once};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use fightstats_engine::{
    crawl_cards, crawl_profiles, parse_athlete_cards, parse_roster_rows, CrawlError, CrawlEvent,
    CrawlSettings, FetchSettings, KeyedEnumerator, NumberedEnumerator, ProgressSink,
    ReqwestFetcher,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(crawl_logging::initialize_for_tests);
}

#[derive(Default)]
struct CollectingSink {
    events: Mutex<Vec<CrawlEvent>>,
}

impl CollectingSink {
    fn take(&self) -> Vec<CrawlEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for CollectingSink {
    fn emit(&self, event: CrawlEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn quick_settings() -> CrawlSettings {
    CrawlSettings {
        detail_delay: Duration::ZERO,
        batch_delay: Duration::ZERO,
        batch_size: 20,
    }
}

fn list_page(rows: &str) -> String {
    format!(r#"<table class="b-statistics__table"><tbody>{rows}</tbody></table>"#)
}

fn roster_row(name: &str, detail_url: &str) -> String {
    let first_cell = if detail_url.is_empty() {
        name.to_string()
    } else {
        format!(r#"<a href="{detail_url}">{name}</a>"#)
    };
    format!(
        r#"<tr><td>{first_cell}</td><td></td><td>5'6"</td><td>135 lbs.</td><td>68.0"</td>
           <td>Orthodox</td><td>24</td><td>3</td><td>0</td></tr>"#
    )
}

fn detail_page() -> &'static str {
    r#"<html><body>
    <span class="b-content__title-highlight">Jane Doe</span>
    <span class="b-content__Nickname">The Jab</span>
    <span class="b-content__title-record">Record: 24-3-0</span>
    <div class="b-list__info-box-left"><ul>
        <li class="b-list__box-list-item"><i>Height:</i> 5' 6"</li>
        <li class="b-list__box-list-item"><i>Weight:</i> 135 lbs.</li>
        <li class="b-list__box-list-item"><i>Stance:</i> Orthodox</li>
    </ul></div>
    <div class="b-list__info-box-right"><ul>
        <li class="b-list__box-list-item"><i>SLpM:</i> 4.23</li>
        <li class="b-list__box-list-item"><i>Str. Acc.:</i> 58%</li>
    </ul></div>
    <table class="b-fight-details__table"><tbody>
        <tr class="b-fight-details__table-row">
            <td>win</td><td>John Smith</td><td>1</td><td>57</td><td>2</td>
            <td>0</td><td>Event 1</td><td>KO/TKO</td><td>3</td><td>2:15</td>
        </tr>
    </tbody></table>
    </body></html>"#
}

fn single_segment_roster(base: &str) -> KeyedEnumerator<fightstats_core::ListEntry> {
    KeyedEnumerator::new(
        format!("{base}/statistics/fighters"),
        vec!["a".to_string()],
        Box::new(|html: &str| parse_roster_rows(html)),
    )
}

#[tokio::test]
async fn crawl_merges_profile_with_its_list_overview() {
    init_logging();
    let server = MockServer::start().await;
    let detail_url = format!("{}/fighter-details/1", server.uri());

    Mock::given(method("GET"))
        .and(path("/statistics/fighters"))
        .and(query_param("char", "a"))
        .and(query_param("page", "all"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(list_page(&roster_row("Jane Doe", &detail_url))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fighter-details/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page()))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(&FetchSettings::default()).expect("client");
    let mut roster = single_segment_roster(&server.uri());
    let sink = CollectingSink::default();

    let outcome = crawl_profiles(
        &fetcher,
        &mut roster,
        &quick_settings(),
        &sink,
        &CancellationToken::new(),
    )
    .await
    .expect("crawl ok");

    assert_eq!(outcome.discovered, 1);
    assert!(!outcome.cancelled);
    assert_eq!(outcome.records.len(), 1);

    let record = &outcome.records[0];
    assert_eq!(record.profile.name, "Jane Doe");
    assert_eq!(record.profile.record, "24-3-0");
    assert_eq!(record.profile.stats.len(), 3);
    assert_eq!(record.profile.career_statistics.len(), 2);
    assert_eq!(record.profile.fight_history.len(), 1);
    assert_eq!(record.list_overview.name, "Jane Doe");
    assert_eq!(record.list_overview.wins, "24");
    assert!(!record.profile.captured_at.is_empty());

    let events = sink.take();
    assert!(events.contains(&CrawlEvent::ProfileCaptured {
        name: "Jane Doe".to_string(),
        url: detail_url,
    }));
}

#[tokio::test]
async fn failed_detail_fetch_skips_the_item_and_continues() {
    init_logging();
    let server = MockServer::start().await;
    let good_url = format!("{}/fighter-details/1", server.uri());
    let bad_url = format!("{}/fighter-details/2", server.uri());

    let rows = format!(
        "{}{}",
        roster_row("Jane Doe", &good_url),
        roster_row("John Unreachable", &bad_url),
    );
    Mock::given(method("GET"))
        .and(path("/statistics/fighters"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_page(&rows)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fighter-details/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fighter-details/2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(&FetchSettings::default()).expect("client");
    let mut roster = single_segment_roster(&server.uri());
    let sink = CollectingSink::default();

    let outcome = crawl_profiles(
        &fetcher,
        &mut roster,
        &quick_settings(),
        &sink,
        &CancellationToken::new(),
    )
    .await
    .expect("crawl ok");

    assert_eq!(outcome.discovered, 2);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].profile.name, "Jane Doe");

    let events = sink.take();
    assert!(events.contains(&CrawlEvent::EntrySkipped { url: bad_url }));
}

#[tokio::test]
async fn entry_without_a_detail_reference_is_silently_skipped() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/statistics/fighters"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(list_page(&roster_row("Jane Doe", ""))),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(&FetchSettings::default()).expect("client");
    let mut roster = single_segment_roster(&server.uri());
    let sink = CollectingSink::default();

    let outcome = crawl_profiles(
        &fetcher,
        &mut roster,
        &quick_settings(),
        &sink,
        &CancellationToken::new(),
    )
    .await
    .expect("crawl ok");

    assert_eq!(outcome.discovered, 1);
    assert!(outcome.records.is_empty());
    // No skip event either: an unusable entry is not a failure.
    let events = sink.take();
    assert_eq!(
        events,
        vec![CrawlEvent::PageListed {
            origin: fightstats_engine::PageOrigin::Segment("a".to_string()),
            count: 1,
        }]
    );
}

#[tokio::test]
async fn crawl_with_no_candidates_is_a_run_level_failure() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/statistics/fighters"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_page("")))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(&FetchSettings::default()).expect("client");
    let mut roster = single_segment_roster(&server.uri());

    let result = crawl_profiles(
        &fetcher,
        &mut roster,
        &quick_settings(),
        &CollectingSink::default(),
        &CancellationToken::new(),
    )
    .await;
    assert!(matches!(result, Err(CrawlError::NoCandidates)));
}

#[tokio::test]
async fn cancelled_run_returns_partial_outcome_without_new_fetches() {
    init_logging();
    let server = MockServer::start().await;
    // A cancelled run must not issue any requests at all.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let fetcher = ReqwestFetcher::new(&FetchSettings::default()).expect("client");
    let mut roster = single_segment_roster(&server.uri());

    let outcome = crawl_profiles(
        &fetcher,
        &mut roster,
        &quick_settings(),
        &CollectingSink::default(),
        &cancel,
    )
    .await
    .expect("cancelled run still returns its partial outcome");

    assert!(outcome.cancelled);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.discovered, 0);
}

#[tokio::test]
async fn card_crawl_collects_every_page_until_the_sentinel() {
    init_logging();
    let server = MockServer::start().await;
    let card = |name: &str, slug: &str| {
        format!(
            r#"<div class="c-listing-athlete-flipcard__inner">
                <span class="c-listing-athlete__name">{name}</span>
                <a href="/athlete/{slug}">profile</a>
                <img src="https://cdn.example.com/{slug}.png"/>
            </div>"#
        )
    };
    let page0 = format!("{}{}", card("Jane Doe", "jane-doe"), card("John Smith", "john-smith"));
    let page1 = card("Weili Zhang", "weili-zhang");
    for (page, body) in [("0", page0), ("1", page1), ("2", String::new())] {
        Mock::given(method("GET"))
            .and(path("/athletes/all"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let fetcher = ReqwestFetcher::new(&FetchSettings::default()).expect("client");
    let base = url::Url::parse(&server.uri()).expect("base url");
    let mut pages = NumberedEnumerator::new(
        format!("{}/athletes/all", server.uri()),
        Box::new(move |html: &str| parse_athlete_cards(html, &base)),
    );

    let outcome = crawl_cards(
        &fetcher,
        &mut pages,
        &quick_settings(),
        &CollectingSink::default(),
        &CancellationToken::new(),
    )
    .await
    .expect("crawl ok");

    assert_eq!(outcome.discovered, 3);
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.records[2].indicator, "weili_zhang");
    assert!(outcome.records[0]
        .profile_url
        .ends_with("/athlete/jane-doe"));
}
