//! Podcast searcher trait.

use async_trait::async_trait;

use crate::{PodcastSearchResult, Result};

/// Trait for implementing podcast search providers.
///
/// Implementations must be safe to call concurrently; the combined searcher
/// fans the same query out to every registered provider at once.
#[async_trait]
pub trait PodcastSearcher: Send + Sync {
    /// Searches for podcasts matching `query`, most relevant first.
    async fn search(&self, query: &str) -> Result<Vec<PodcastSearchResult>>;

    /// Resolves a result URL into a directly usable feed URL.
    ///
    /// Providers whose result URLs are already feed URLs keep the default,
    /// which returns the input unchanged.
    async fn lookup_url(&self, result_url: &str) -> Result<String> {
        Ok(result_url.to_string())
    }

    /// Returns whether `url` must go through [`lookup_url`](Self::lookup_url)
    /// before it can be subscribed to. Must not block.
    fn url_needs_lookup(&self, _url: &str) -> bool {
        false
    }

    /// Returns the display name.
    fn name(&self) -> String;

    /// Marks searchers that aggregate other registered searchers.
    ///
    /// Aggregates are never dispatched by another aggregate and never take
    /// part in registry-level lookups.
    fn is_aggregate(&self) -> bool {
        false
    }
}
