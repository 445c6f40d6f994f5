//! Error types for podcast discovery.

use thiserror::Error;

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while searching for or resolving podcasts.
#[derive(Error, Debug)]
pub enum SearchError {
    /// HTTP request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Query could not be encoded into a request URL.
    #[error("Failed to encode query: {0}")]
    Encoding(String),

    /// Lookup succeeded but the podcast exposes no feed.
    #[error("No feed URL found for '{track}' by '{artist}'")]
    FeedUrlNotFound { artist: String, track: String },

    /// The top list has no data for the requested country.
    #[error("iTunes does not have data for country '{0}'")]
    NoCountryData(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Parse(err.to_string())
    }
}
