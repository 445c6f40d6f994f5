//! iTunes top podcast list.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ProviderKind, RegistryConfig};
use crate::fetcher::Fetcher;
use crate::fetcher_http::HttpFetcher;
use crate::searchers::ITUNES_LOOKUP_URL;
use crate::{PodcastSearchResult, Result, SearchError};

/// Country code meaning "use the system locale".
pub const COUNTRY_CODE_UNSET: &str = "99";

const FALLBACK_COUNTRY: &str = "US";
const NUM_LOADED: usize = 25;
const ITUNES_BASE_URL: &str = "https://itunes.apple.com";
const MIN_IMAGE_HEIGHT: u32 = 100;

/// A feed the user is already subscribed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribedFeed {
    /// Feed title.
    pub title: Option<String>,
    /// Feed author.
    pub author: Option<String>,
}

impl SubscribedFeed {
    /// Creates a subscribed feed with both title and author.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            author: Some(author.into()),
        }
    }
}

/// Loads the iTunes top podcast chart for a country.
pub struct ItunesTopListLoader {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

impl ItunesTopListLoader {
    /// Creates a loader using a default HTTP fetcher.
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(HttpFetcher::new()))
    }

    /// Creates a loader whose HTTP client uses the iTunes timeout from
    /// `config`.
    pub fn from_config(config: &RegistryConfig) -> Self {
        let timeout = config.timeout_for(ProviderKind::Itunes);
        Self::with_fetcher(Arc::new(HttpFetcher::with_timeout(timeout)))
    }

    /// Creates a loader using `fetcher` for all requests.
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            base_url: ITUNES_BASE_URL.to_string(),
        }
    }

    /// Overrides the iTunes base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Loads the top list for `country` and returns at most `limit`
    /// podcasts the user is not yet subscribed to.
    ///
    /// With [`COUNTRY_CODE_UNSET`] the system locale decides the country,
    /// and a failed request is retried once for the US chart.
    pub async fn load_toplist(
        &self,
        country: &str,
        limit: usize,
        subscribed: &[SubscribedFeed],
    ) -> Result<Vec<PodcastSearchResult>> {
        let body = if country == COUNTRY_CODE_UNSET {
            let local = locale_country().unwrap_or_else(|| FALLBACK_COUNTRY.to_string());
            match self.fetch_toplist(&local).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Top list for {} failed ({}), falling back to {}", local, e, FALLBACK_COUNTRY);
                    self.fetch_toplist(FALLBACK_COUNTRY).await?
                }
            }
        } else {
            self.fetch_toplist(country).await?
        };

        let suggested = parse_toplist(&body)?;
        Ok(remove_subscribed(suggested, subscribed, limit))
    }

    async fn fetch_toplist(&self, country: &str) -> Result<String> {
        let url = format!(
            "{}/{}/rss/toppodcasts/limit={}/explicit=true/json",
            self.base_url, country, NUM_LOADED
        );
        debug!("Top list URL {}", url);

        let response = self.fetcher.get(&url).await?;
        if response.status == 400 {
            return Err(SearchError::NoCountryData(country.to_string()));
        }
        response.into_success_body(&url)
    }
}

impl Default for ItunesTopListLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct Label {
    label: String,
}

#[derive(Deserialize)]
struct ToplistImage {
    label: String,
    attributes: ImageAttributes,
}

#[derive(Deserialize)]
struct ImageAttributes {
    height: String,
}

#[derive(Deserialize)]
struct ToplistId {
    attributes: IdAttributes,
}

#[derive(Deserialize)]
struct IdAttributes {
    #[serde(rename = "im:id")]
    id: String,
}

#[derive(Deserialize)]
struct ToplistEntry {
    title: Label,
    #[serde(rename = "im:image", default)]
    images: Vec<ToplistImage>,
    id: ToplistId,
    #[serde(rename = "im:artist")]
    artist: Option<Label>,
}

impl From<ToplistEntry> for PodcastSearchResult {
    fn from(entry: ToplistEntry) -> Self {
        let image_url = entry
            .images
            .into_iter()
            .find(|image| {
                image
                    .attributes
                    .height
                    .parse::<u32>()
                    .is_ok_and(|height| height >= MIN_IMAGE_HEIGHT)
            })
            .map(|image| image.label);

        PodcastSearchResult {
            title: entry.title.label,
            feed_url: Some(format!("{}?id={}", ITUNES_LOOKUP_URL, entry.id.attributes.id)),
            image_url,
            author: entry.artist.map(|artist| artist.label),
            description: None,
            episode_count: None,
            last_update: None,
            source: "toplist".to_string(),
        }
    }
}

/// Parses the top list JSON feed. A body without `feed.entry` yields an
/// empty list. Malformed entries are logged and skipped.
pub fn parse_toplist(json: &str) -> Result<Vec<PodcastSearchResult>> {
    let mut root: Value = serde_json::from_str(json)?;
    let entries = match root.pointer_mut("/feed/entry").map(Value::take) {
        Some(Value::Array(entries)) => entries,
        // iTunes sends a bare object when the chart has a single entry.
        Some(entry @ Value::Object(_)) => vec![entry],
        _ => return Ok(Vec::new()),
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            match serde_json::from_value::<ToplistEntry>(entry) {
                Ok(entry) => Some(PodcastSearchResult::from(entry)),
                Err(e) => {
                    warn!("Skipping malformed top list entry {}: {}", position, e);
                    None
                }
            }
        })
        .collect())
}

/// Drops suggestions the user already subscribes to and keeps at most
/// `limit` of the rest. A `limit` of 0 keeps all of them.
///
/// A suggestion matches a subscription when its trimmed title equals the
/// subscription's `"<title> - <author>"` (both trimmed). Comparison is
/// exact and case-sensitive. Subscriptions missing a title or author never
/// match.
pub fn remove_subscribed(
    suggested: Vec<PodcastSearchResult>,
    subscribed: &[SubscribedFeed],
    limit: usize,
) -> Vec<PodcastSearchResult> {
    let subscribed_keys: HashSet<String> = subscribed
        .iter()
        .filter_map(|feed| match (&feed.title, &feed.author) {
            (Some(title), Some(author)) => {
                Some(format!("{} - {}", trim_blank(title), trim_blank(author)))
            }
            _ => None,
        })
        .collect();

    let remaining = suggested
        .into_iter()
        .filter(|podcast| !subscribed_keys.contains(trim_blank(&podcast.title)));
    if limit == 0 {
        remaining.collect()
    } else {
        remaining.take(limit).collect()
    }
}

/// Trims spaces and control characters from both ends.
fn trim_blank(s: &str) -> &str {
    s.trim_matches(|c: char| c <= ' ')
}

/// Country part of the process locale, e.g. `GB` for `en_GB.UTF-8`.
fn locale_country() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .and_then(|value| country_from_locale(&value))
}

fn country_from_locale(locale: &str) -> Option<String> {
    let tag = locale.split(['.', '@']).next()?;
    let region = tag.split(['_', '-']).nth(1)?;
    if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(region.to_ascii_uppercase())
    } else {
        None
    }
}
