//! Combined searcher: fans a query out to every registered provider.

use std::sync::Weak;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::registry::{ProviderEntry, ProviderRegistry};
use crate::{PodcastSearchResult, PodcastSearcher, RankMerger, Result};

/// Searcher that queries every active provider in its registry and merges
/// their results.
///
/// All providers run concurrently and the search waits for every one of
/// them. A failing provider contributes nothing; it never fails the
/// combined search. There is no timeout here, each provider enforces its
/// own.
pub struct CombinedSearcher {
    registry: Weak<ProviderRegistry>,
    merger: RankMerger,
}

impl CombinedSearcher {
    /// Creates a combined searcher over `registry`.
    pub fn new(registry: Weak<ProviderRegistry>) -> Self {
        Self {
            registry,
            merger: RankMerger::new(),
        }
    }
}

#[async_trait]
impl PodcastSearcher for CombinedSearcher {
    async fn search(&self, query: &str) -> Result<Vec<PodcastSearchResult>> {
        let Some(registry) = self.registry.upgrade() else {
            warn!("Provider registry dropped, returning no results");
            return Ok(Vec::new());
        };

        let providers = registry.providers();
        debug!(
            "Searching {} providers",
            providers.iter().filter(|entry| entry.is_active()).count()
        );

        let futures: Vec<_> = providers
            .iter()
            .map(|entry| async move {
                if !entry.is_active() {
                    return None;
                }
                let name = entry.searcher().name();
                match entry.searcher().search(query).await {
                    Ok(results) => {
                        debug!("Provider {} returned {} results", name, results.len());
                        Some(results)
                    }
                    Err(e) => {
                        warn!("Provider {} failed: {}", name, e);
                        None
                    }
                }
            })
            .collect();

        let slots = join_all(futures).await;

        let contributions = providers
            .iter()
            .map(ProviderEntry::weight)
            .zip(slots)
            .collect();

        Ok(self.merger.merge(contributions))
    }

    async fn lookup_url(&self, result_url: &str) -> Result<String> {
        match self.registry.upgrade() {
            Some(registry) => registry.lookup_url(result_url).await,
            None => Ok(result_url.to_string()),
        }
    }

    fn url_needs_lookup(&self, url: &str) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.url_needs_lookup(url))
    }

    fn name(&self) -> String {
        self.registry
            .upgrade()
            .map(|registry| registry.active_names().join(", "))
            .unwrap_or_default()
    }

    fn is_aggregate(&self) -> bool {
        true
    }
}
