//! Page parsers for the stats site.
//!
//! Every function here is a pure mapping from fetched markup to records and
//! is defensive by omission: rows or items that do not match the expected
//! shape are dropped, never raised. The source markup is not contractually
//! stable, so correctness means "never crash, never fabricate fields", not
//! "never lose a row".

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use fightstats_core::{
    normalize, slugify, FightHistoryEntry, ImageCard, ListEntry, ProfileRecord,
};

/// Minimum cell count for a usable roster row.
const ROSTER_ROW_CELLS: usize = 8;
/// Fixed column count of the fight history table.
const FIGHT_ROW_CELLS: usize = 10;

/// Concatenated, normalized text of an element.
fn element_text(el: ElementRef<'_>) -> String {
    normalize(Some(&el.text().collect::<String>()))
}

/// The element's text nodes, normalized, with whitespace-only nodes skipped.
fn text_tokens(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .map(|node| normalize(Some(node)))
        .filter(|token| !token.is_empty())
        .collect()
}

fn select_text(doc: &Html, selector: &str) -> String {
    Selector::parse(selector)
        .ok()
        .and_then(|sel| doc.select(&sel).next())
        .map(element_text)
        .unwrap_or_default()
}

/// Extracts roster rows from a listing page.
///
/// Columns 0-7 map positionally to name through losses; the draws column is
/// taken only when present. Rows with fewer than 8 cells are dropped whole.
pub fn parse_roster_rows(html: &str) -> Vec<ListEntry> {
    let doc = Html::parse_document(html);
    let row_sel = Selector::parse("table.b-statistics__table tbody tr").ok();
    let cell_sel = Selector::parse("td").ok();
    let link_sel = Selector::parse("a").ok();
    let (Some(row_sel), Some(cell_sel), Some(link_sel)) = (row_sel, cell_sel, link_sel) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for row in doc.select(&row_sel) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
        if cells.len() < ROSTER_ROW_CELLS {
            continue;
        }

        let detail_url = cells[0]
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
            .unwrap_or_default();

        entries.push(ListEntry {
            name: element_text(cells[0]),
            nickname: element_text(cells[1]),
            height: element_text(cells[2]),
            weight: element_text(cells[3]),
            reach: element_text(cells[4]),
            stance: element_text(cells[5]),
            wins: element_text(cells[6]),
            losses: element_text(cells[7]),
            draws: cells.get(8).map(|cell| element_text(*cell)).unwrap_or_default(),
            detail_url,
        });
    }
    entries
}

/// Extracts the bio info box into a label→value map.
///
/// The first text token of an item is the label (lower-cased, trailing colon
/// stripped); the remaining tokens join into the value. Items with fewer
/// than two tokens, or an empty label or value, are discarded. Last write
/// wins on duplicate labels.
pub fn parse_bio_stats(doc: &Html) -> BTreeMap<String, String> {
    let Ok(item_sel) = Selector::parse(".b-list__info-box-left .b-list__box-list-item") else {
        return BTreeMap::new();
    };

    let mut stats = BTreeMap::new();
    for item in doc.select(&item_sel) {
        let tokens = text_tokens(item);
        if tokens.len() < 2 {
            continue;
        }
        let label = tokens[0].trim_end_matches(':').to_lowercase();
        let value = tokens[1..].join(" ");
        if !label.is_empty() && !value.is_empty() {
            stats.insert(label, value);
        }
    }
    stats
}

/// Extracts the career statistics box into a label→value map.
///
/// Same item shape as the bio box but scoped to the right-hand section, and
/// the value is the second text token alone. Kept independent of
/// [`parse_bio_stats`] so either section stays parseable if the other
/// section's markup changes.
pub fn parse_career_stats(doc: &Html) -> BTreeMap<String, String> {
    let Ok(item_sel) = Selector::parse(".b-list__info-box-right .b-list__box-list-item") else {
        return BTreeMap::new();
    };

    let mut stats = BTreeMap::new();
    for item in doc.select(&item_sel) {
        let tokens = text_tokens(item);
        let Some(first) = tokens.first() else {
            continue;
        };
        let label = first.trim_end_matches(':').to_lowercase();
        let value = tokens.get(1).cloned().unwrap_or_default();
        if !label.is_empty() && !value.is_empty() {
            stats.insert(label, value);
        }
    }
    stats
}

/// Extracts the fight log. Rows with fewer than 10 cell values are dropped
/// whole; the first 10 map positionally and extras are ignored.
pub fn parse_fight_history(doc: &Html) -> Vec<FightHistoryEntry> {
    let row_sel = Selector::parse("table.b-fight-details__table tr.b-fight-details__table-row").ok();
    let cell_sel = Selector::parse("td").ok();
    let (Some(row_sel), Some(cell_sel)) = (row_sel, cell_sel) else {
        return Vec::new();
    };

    let mut history = Vec::new();
    for row in doc.select(&row_sel) {
        let cells: Vec<String> = row.select(&cell_sel).map(element_text).collect();
        if cells.len() < FIGHT_ROW_CELLS {
            continue;
        }
        history.push(FightHistoryEntry {
            result: cells[0].clone(),
            opponent: cells[1].clone(),
            knockdowns: cells[2].clone(),
            strikes: cells[3].clone(),
            takedowns: cells[4].clone(),
            submission_attempts: cells[5].clone(),
            event: cells[6].clone(),
            method: cells[7].clone(),
            round: cells[8].clone(),
            time: cells[9].clone(),
        });
    }
    history
}

/// Assembles the full detail-page record.
///
/// A page that deviates from the expected layout degrades to empty fields
/// rather than failing; an empty name is tolerated.
pub fn parse_profile(html: &str, profile_url: &str, captured_at: String) -> ProfileRecord {
    let doc = Html::parse_document(html);

    let record = select_text(&doc, "span.b-content__title-record")
        .replace("Record:", "")
        .trim()
        .to_string();

    ProfileRecord {
        name: select_text(&doc, ".b-content__title-highlight"),
        nickname: select_text(&doc, ".b-content__Nickname"),
        record,
        stats: parse_bio_stats(&doc),
        career_statistics: parse_career_stats(&doc),
        fight_history: parse_fight_history(&doc),
        profile_url: profile_url.to_string(),
        captured_at,
    }
}

/// Extracts athlete portrait cards from a numbered listing page.
///
/// A card missing its name, link or image is dropped whole. Relative links
/// are resolved against `base`.
pub fn parse_athlete_cards(html: &str, base: &Url) -> Vec<ImageCard> {
    let doc = Html::parse_document(html);
    let card_sel = Selector::parse("div.c-listing-athlete-flipcard__inner").ok();
    let name_sel = Selector::parse("span.c-listing-athlete__name").ok();
    let link_sel = Selector::parse("a[href]").ok();
    let img_sel = Selector::parse("img[src]").ok();
    let (Some(card_sel), Some(name_sel), Some(link_sel), Some(img_sel)) =
        (card_sel, name_sel, link_sel, img_sel)
    else {
        return Vec::new();
    };

    let mut cards = Vec::new();
    for card in doc.select(&card_sel) {
        let name = card.select(&name_sel).next().map(element_text);
        let href = card
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"));
        let src = card
            .select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("src"));

        let (Some(name), Some(href), Some(src)) = (name, href, src) else {
            continue;
        };
        let Ok(profile_url) = base.join(href) else {
            continue;
        };

        cards.push(ImageCard {
            indicator: slugify(&name),
            name,
            profile_url: profile_url.to_string(),
            image_url: src.to_string(),
        });
    }
    cards
}
