//! Upstream response shapes and their normalization.
//!
//! The request service answers availability questions in three different
//! shapes depending on which endpoint was used. They are decoded into the
//! structs below, wrapped in [`UpstreamMovie`], and flattened into a
//! [`NormalizedSearchResult`] before leaving the client. Nothing outside
//! `ombi` sees the upstream shapes.

use serde::{Deserialize, Deserializer, Serialize};

/// Catalog ids arrive as numbers from most endpoints but as strings from some
/// proxies; `0` and `""` mean "unknown".
fn external_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?
        .map(|raw| match raw {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s.trim().to_owned(),
        })
        .filter(|id| !id.is_empty() && id != "0"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// A record from the outstanding-requests listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingRequest {
    #[serde(default, deserialize_with = "external_id")]
    pub the_movie_db_id: Option<String>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Result of `Search/movie/info/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    #[serde(default, deserialize_with = "external_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "external_id")]
    pub the_movie_db_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub requested: Option<bool>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub plex_url: Option<String>,
}

/// Result of `Request/movie/available/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityInfo {
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub requested: Option<bool>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub plex_url: Option<String>,
}

/// One candidate from `Search/movie/{term}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListItem {
    #[serde(default, deserialize_with = "external_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "external_id")]
    pub the_movie_db_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub requested: Option<bool>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub plex_url: Option<String>,
}

impl SearchListItem {
    /// The catalog id to correlate with request records.
    pub fn external_id(&self) -> Option<&str> {
        self.the_movie_db_id.as_deref().or(self.id.as_deref())
    }

    /// Case-insensitive exact title match, plus a release-date substring
    /// check when a year is given.
    pub fn matches(&self, title: &str, year: Option<&str>) -> bool {
        let Some(candidate) = self.title.as_deref() else {
            return false;
        };
        let title_match = candidate.trim().to_lowercase() == title.trim().to_lowercase();
        let year_match = match year {
            None => true,
            Some(year) => self
                .release_date
                .as_deref()
                .is_some_and(|date| date.contains(year)),
        };
        title_match && year_match
    }
}

/// Pick the first candidate, in list order, matching the title/year rule.
pub fn select_title_match(
    candidates: Vec<SearchListItem>,
    title: &str,
    year: Option<&str>,
) -> Option<SearchListItem> {
    candidates.into_iter().find(|c| c.matches(title, year))
}

/// The upstream shapes a lookup can end in.
#[derive(Debug, Clone)]
pub enum UpstreamMovie {
    /// The id was found among outstanding requests. These records carry no
    /// availability or stream location.
    ExistingRequest {
        external_id: String,
        record: ExistingRequest,
    },
    /// An id lookup with its best-effort availability check.
    SearchInfo {
        external_id: String,
        info: SearchInfo,
        availability: AvailabilityInfo,
    },
    /// A title-search candidate; `has_request` comes from the best-effort
    /// existing-request scan.
    SearchListItem {
        item: SearchListItem,
        has_request: bool,
    },
}

/// Availability answer for one movie on one server, independent of which
/// endpoint produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSearchResult {
    /// Catalog id used to submit requests; absent when the service did not report one.
    pub id: Option<String>,
    pub title: Option<String>,
    pub available: bool,
    pub requested: bool,
    pub approved: Option<bool>,
    pub plex_url: Option<String>,
}

impl UpstreamMovie {
    pub fn normalize(self) -> NormalizedSearchResult {
        match self {
            UpstreamMovie::ExistingRequest {
                external_id,
                record,
            } => NormalizedSearchResult {
                id: Some(external_id),
                title: record.title,
                available: false,
                requested: true,
                approved: record.approved,
                plex_url: None,
            },
            UpstreamMovie::SearchInfo {
                external_id,
                info,
                availability,
            } => NormalizedSearchResult {
                id: Some(external_id),
                title: info.title,
                // Values on the primary result win; the availability check only fills gaps.
                available: info.available.or(availability.available).unwrap_or(false),
                requested: info.requested.or(availability.requested).unwrap_or(false),
                approved: info.approved.or(availability.approved),
                plex_url: non_empty(info.plex_url).or(non_empty(availability.plex_url)),
            },
            UpstreamMovie::SearchListItem { item, has_request } => NormalizedSearchResult {
                id: item.external_id().map(str::to_owned),
                available: item.available.unwrap_or(false),
                requested: has_request || item.requested.unwrap_or(false),
                approved: item.approved,
                plex_url: non_empty(item.plex_url),
                title: item.title,
            },
        }
    }
}
