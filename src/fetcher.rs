//! HTTP fetcher abstraction used by the searchers.

use async_trait::async_trait;

use crate::{Result, SearchError};

/// Status and body of a completed GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl FetchResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body, or an `HttpStatus` error naming `url` when the
    /// status is not a success.
    pub fn into_success_body(self, url: &str) -> Result<String> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(SearchError::HttpStatus {
                status: self.status,
                url: url.to_string(),
            })
        }
    }
}

/// Trait for issuing GET requests.
///
/// Transport failures are errors; any response the server sends back,
/// successful or not, is returned as a [`FetchResponse`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`.
    async fn get(&self, url: &str) -> Result<FetchResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success_range() {
        assert!(FetchResponse::new(200, "").is_success());
        assert!(FetchResponse::new(204, "").is_success());
        assert!(!FetchResponse::new(199, "").is_success());
        assert!(!FetchResponse::new(301, "").is_success());
        assert!(!FetchResponse::new(404, "").is_success());
    }

    #[test]
    fn test_into_success_body_ok() {
        let body = FetchResponse::new(200, "{}").into_success_body("u").unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn test_into_success_body_error() {
        let err = FetchResponse::new(500, "oops")
            .into_success_body("https://example.com")
            .unwrap_err();
        match err {
            SearchError::HttpStatus { status, url } => {
                assert_eq!(status, 500);
                assert_eq!(url, "https://example.com");
            }
            other => panic!("Expected HttpStatus, got {:?}", other),
        }
    }
}
