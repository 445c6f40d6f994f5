//! Apple Podcasts (iTunes) searcher.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::fetcher::Fetcher;
use crate::fetcher_http::HttpFetcher;
use crate::{PodcastSearchResult, PodcastSearcher, Result, SearchError};

/// iTunes search endpoint.
pub const ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";
/// iTunes lookup endpoint.
pub const ITUNES_LOOKUP_URL: &str = "https://itunes.apple.com/lookup";

const ITUNES_HOST: &str = "itunes.apple.com";
const PATTERN_BY_ID: &str = r"^.*/podcasts\.apple\.com/.*/podcast/.*/id(\d+).*$";

fn by_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(PATTERN_BY_ID).expect("valid podcast id pattern"))
}

/// Searcher backed by the iTunes search API.
pub struct ItunesSearcher {
    fetcher: Arc<dyn Fetcher>,
    search_endpoint: String,
    lookup_endpoint: String,
}

impl ItunesSearcher {
    /// Creates a searcher using a default HTTP fetcher.
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(HttpFetcher::new()))
    }

    /// Creates a searcher using `fetcher` for all requests.
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            search_endpoint: ITUNES_SEARCH_URL.to_string(),
            lookup_endpoint: ITUNES_LOOKUP_URL.to_string(),
        }
    }

    /// Overrides the search and lookup endpoints.
    pub fn with_endpoints(
        mut self,
        search_endpoint: impl Into<String>,
        lookup_endpoint: impl Into<String>,
    ) -> Self {
        self.search_endpoint = search_endpoint.into();
        self.lookup_endpoint = lookup_endpoint.into();
        self
    }

    fn search_url(&self, query: &str) -> Result<String> {
        Url::parse_with_params(
            &self.search_endpoint,
            &[("media", "podcast"), ("term", query)],
        )
        .map(|url| url.to_string())
        .map_err(|e| SearchError::Encoding(e.to_string()))
    }

    fn lookup_request_url(&self, result_url: &str) -> String {
        match by_id_pattern().captures(result_url).and_then(|c| c.get(1)) {
            Some(id) => format!("{}?id={}", self.lookup_endpoint, id.as_str()),
            None => result_url.to_string(),
        }
    }
}

impl Default for ItunesSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct ItunesSearchResponse {
    results: Vec<ItunesEntry>,
}

#[derive(Deserialize)]
struct ItunesEntry {
    #[serde(rename = "collectionName")]
    collection_name: Option<String>,
    #[serde(rename = "feedUrl")]
    feed_url: Option<String>,
    #[serde(rename = "artworkUrl100")]
    artwork_url: Option<String>,
    #[serde(rename = "artistName")]
    artist_name: Option<String>,
    #[serde(rename = "trackCount")]
    track_count: Option<u32>,
    #[serde(rename = "releaseDate")]
    release_date: Option<String>,
}

impl From<ItunesEntry> for PodcastSearchResult {
    fn from(entry: ItunesEntry) -> Self {
        PodcastSearchResult {
            title: entry.collection_name.unwrap_or_default(),
            feed_url: entry.feed_url,
            image_url: entry.artwork_url,
            author: entry.artist_name,
            description: None,
            episode_count: entry.track_count,
            last_update: entry.release_date,
            source: "itunes".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ItunesLookupResponse {
    results: Vec<ItunesLookupEntry>,
}

#[derive(Deserialize)]
struct ItunesLookupEntry {
    #[serde(rename = "feedUrl")]
    feed_url: Option<String>,
    #[serde(rename = "artistName")]
    artist_name: Option<String>,
    #[serde(rename = "trackName")]
    track_name: Option<String>,
}

#[async_trait]
impl PodcastSearcher for ItunesSearcher {
    async fn search(&self, query: &str) -> Result<Vec<PodcastSearchResult>> {
        let url = match self.search_url(query) {
            Ok(url) => url,
            Err(e) => {
                warn!("{}, sending raw query", e);
                format!("{}?media=podcast&term={}", self.search_endpoint, query)
            }
        };

        let body = self.fetcher.get(&url).await?.into_success_body(&url)?;
        let response: ItunesSearchResponse = serde_json::from_str(&body)?;

        let results: Vec<PodcastSearchResult> = response
            .results
            .into_iter()
            .map(PodcastSearchResult::from)
            .filter(PodcastSearchResult::has_feed_url)
            .collect();
        debug!("iTunes returned {} podcasts with feeds", results.len());

        Ok(results)
    }

    async fn lookup_url(&self, result_url: &str) -> Result<String> {
        let url = self.lookup_request_url(result_url);
        let body = self.fetcher.get(&url).await?.into_success_body(&url)?;
        let response: ItunesLookupResponse = serde_json::from_str(&body)?;

        let entry = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::Parse(format!("lookup for {} returned no results", url)))?;

        entry.feed_url.ok_or_else(|| SearchError::FeedUrlNotFound {
            artist: entry.artist_name.unwrap_or_default(),
            track: entry.track_name.unwrap_or_default(),
        })
    }

    fn url_needs_lookup(&self, url: &str) -> bool {
        url.contains(ITUNES_HOST) || by_id_pattern().is_match(url)
    }

    fn name(&self) -> String {
        "Apple".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchResponse;
    use std::sync::Mutex;

    struct MockFetcher {
        response: FetchResponse,
        requested: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: FetchResponse::new(status, body),
                requested: Mutex::new(Vec::new()),
            })
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn get(&self, url: &str) -> Result<FetchResponse> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(self.response.clone())
        }
    }

    const SEARCH_BODY: &str = r#"{
        "resultCount": 3,
        "results": [
            {
                "collectionName": "The Daily",
                "feedUrl": "https://feeds.simplecast.com/the-daily",
                "artworkUrl100": "https://is1.mzstatic.com/daily.jpg",
                "artistName": "The New York Times",
                "trackCount": 2000,
                "releaseDate": "2024-03-01T10:00:00Z"
            },
            {
                "collectionName": "No Feed Here",
                "artistName": "Somebody"
            },
            {
                "collectionName": "Up First",
                "feedUrl": "https://feeds.npr.org/510318/podcast.xml"
            }
        ]
    }"#;

    #[test]
    fn test_itunes_name() {
        assert_eq!(ItunesSearcher::new().name(), "Apple");
        assert!(!ItunesSearcher::default().is_aggregate());
    }

    #[test]
    fn test_url_needs_lookup_itunes_host() {
        let searcher = ItunesSearcher::new();
        assert!(searcher.url_needs_lookup("https://itunes.apple.com/lookup?id=1200361736"));
    }

    #[test]
    fn test_url_needs_lookup_apple_podcasts_id() {
        let searcher = ItunesSearcher::new();
        assert!(searcher
            .url_needs_lookup("https://podcasts.apple.com/us/podcast/the-daily/id1200361736"));
        assert!(searcher
            .url_needs_lookup("https://podcasts.apple.com/de/podcast/some-show/id42?i=1000"));
    }

    #[test]
    fn test_url_needs_lookup_plain_feed() {
        let searcher = ItunesSearcher::new();
        assert!(!searcher.url_needs_lookup("https://feeds.npr.org/510318/podcast.xml"));
        assert!(!searcher.url_needs_lookup("https://podcasts.apple.com/us/browse"));
    }

    #[test]
    fn test_search_url_encodes_query() {
        let searcher = ItunesSearcher::new();
        let url = searcher.search_url("rust & c++").unwrap();
        assert_eq!(
            url,
            "https://itunes.apple.com/search?media=podcast&term=rust+%26+c%2B%2B"
        );
    }

    #[test]
    fn test_search_url_invalid_endpoint_is_encoding_error() {
        let searcher = ItunesSearcher::new().with_endpoints("not a url", "also not");
        let result = searcher.search_url("rust");
        assert!(matches!(result, Err(SearchError::Encoding(_))));
    }

    #[test]
    fn test_lookup_request_url_rewrites_podcast_page() {
        let searcher = ItunesSearcher::new();
        assert_eq!(
            searcher.lookup_request_url("https://podcasts.apple.com/us/podcast/the-daily/id1200361736"),
            "https://itunes.apple.com/lookup?id=1200361736"
        );
        assert_eq!(
            searcher.lookup_request_url("https://itunes.apple.com/lookup?id=5"),
            "https://itunes.apple.com/lookup?id=5"
        );
    }

    #[tokio::test]
    async fn test_search_filters_entries_without_feed() {
        let fetcher = MockFetcher::new(200, SEARCH_BODY);
        let searcher = ItunesSearcher::with_fetcher(fetcher.clone());
        let results = searcher.search("daily").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "The Daily");
        assert_eq!(results[0].author.as_deref(), Some("The New York Times"));
        assert_eq!(results[0].episode_count, Some(2000));
        assert_eq!(results[0].source, "itunes");
        assert_eq!(results[1].title, "Up First");
        assert!(results[1].image_url.is_none());

        assert_eq!(
            fetcher.requested(),
            vec!["https://itunes.apple.com/search?media=podcast&term=daily".to_string()]
        );
    }

    #[tokio::test]
    async fn test_search_falls_back_to_raw_query() {
        let fetcher = MockFetcher::new(200, r#"{"results":[]}"#);
        let searcher =
            ItunesSearcher::with_fetcher(fetcher.clone()).with_endpoints("relative/search", "x");
        let results = searcher.search("two words").await.unwrap();
        assert!(results.is_empty());
        assert_eq!(
            fetcher.requested(),
            vec!["relative/search?media=podcast&term=two words".to_string()]
        );
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let searcher = ItunesSearcher::with_fetcher(MockFetcher::new(503, "unavailable"));
        let result = searcher.search("daily").await;
        assert!(matches!(result, Err(SearchError::HttpStatus { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_search_malformed_body() {
        let searcher = ItunesSearcher::with_fetcher(MockFetcher::new(200, "<html>"));
        let result = searcher.search("daily").await;
        assert!(matches!(result, Err(SearchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_search_missing_results_field() {
        let searcher = ItunesSearcher::with_fetcher(MockFetcher::new(200, r#"{"resultCount":0}"#));
        let result = searcher.search("daily").await;
        assert!(matches!(result, Err(SearchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_lookup_returns_feed_url() {
        let fetcher = MockFetcher::new(
            200,
            r#"{"resultCount":1,"results":[{"feedUrl":"https://feeds.simplecast.com/the-daily","artistName":"NYT","trackName":"The Daily"}]}"#,
        );
        let searcher = ItunesSearcher::with_fetcher(fetcher.clone());
        let feed = searcher
            .lookup_url("https://podcasts.apple.com/us/podcast/the-daily/id1200361736")
            .await
            .unwrap();
        assert_eq!(feed, "https://feeds.simplecast.com/the-daily");
        assert_eq!(
            fetcher.requested(),
            vec!["https://itunes.apple.com/lookup?id=1200361736".to_string()]
        );
    }

    #[tokio::test]
    async fn test_lookup_without_feed_is_not_found() {
        let fetcher = MockFetcher::new(
            200,
            r#"{"results":[{"artistName":"Apple","trackName":"Exclusive Show"}]}"#,
        );
        let searcher = ItunesSearcher::with_fetcher(fetcher);
        let err = searcher
            .lookup_url("https://itunes.apple.com/lookup?id=7")
            .await
            .unwrap_err();
        match err {
            SearchError::FeedUrlNotFound { artist, track } => {
                assert_eq!(artist, "Apple");
                assert_eq!(track, "Exclusive Show");
            }
            other => panic!("Expected FeedUrlNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_empty_results_is_parse_error() {
        let searcher = ItunesSearcher::with_fetcher(MockFetcher::new(200, r#"{"results":[]}"#));
        let result = searcher.lookup_url("https://itunes.apple.com/lookup?id=7").await;
        assert!(matches!(result, Err(SearchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_lookup_http_error() {
        let searcher = ItunesSearcher::with_fetcher(MockFetcher::new(404, ""));
        let result = searcher.lookup_url("https://itunes.apple.com/lookup?id=7").await;
        assert!(matches!(result, Err(SearchError::HttpStatus { status: 404, .. })));
    }
}
