use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One row from a roster listing page.
///
/// Every field is free text exactly as scraped, possibly empty. The detail
/// reference is the only field the crawler acts on: an entry without one is
/// unusable and gets skipped, never reported as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub nickname: String,
    pub height: String,
    pub weight: String,
    pub reach: String,
    pub stance: String,
    pub wins: String,
    pub losses: String,
    pub draws: String,
    /// URL of the athlete's detail page, empty when the row carries no link.
    /// Not part of the persisted overview; provenance lives in
    /// [`ProfileRecord::profile_url`].
    #[serde(skip)]
    pub detail_url: String,
}

/// One row of an athlete's fight log.
///
/// Serialized field names keep the source site's short column labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightHistoryEntry {
    pub result: String,
    pub opponent: String,
    #[serde(rename = "kd")]
    pub knockdowns: String,
    #[serde(rename = "str")]
    pub strikes: String,
    #[serde(rename = "td")]
    pub takedowns: String,
    #[serde(rename = "sub")]
    pub submission_attempts: String,
    pub event: String,
    pub method: String,
    pub round: String,
    pub time: String,
}

/// The full detail-page extraction for one athlete.
///
/// `stats` and `career_statistics` are loosely typed label→value maps
/// assembled from arbitrary markup; known keys are validated at read sites,
/// not at parse time. An empty `name` means the page layout deviated from
/// expectation and is tolerated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    pub nickname: String,
    /// Record string such as `24-3-0`, with the leading label stripped.
    pub record: String,
    pub stats: BTreeMap<String, String>,
    pub career_statistics: BTreeMap<String, String>,
    pub fight_history: Vec<FightHistoryEntry>,
    pub profile_url: String,
    #[serde(rename = "scraped_at")]
    pub captured_at: String,
}

/// A profile merged with the roster row it was discovered through; the unit
/// that is actually persisted. One [`ListEntry`] yields at most one of these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterRecord {
    #[serde(flatten)]
    pub profile: ProfileRecord,
    pub list_overview: ListEntry,
}

impl FighterRecord {
    pub fn new(profile: ProfileRecord, overview: ListEntry) -> Self {
        Self {
            profile,
            list_overview: overview,
        }
    }
}

/// One athlete portrait card from the numbered listing crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCard {
    pub name: String,
    /// Lower-case slug of the name, used downstream to match cards to
    /// fighter records.
    pub indicator: String,
    pub profile_url: String,
    pub image_url: String,
}
