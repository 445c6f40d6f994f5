//! Provider registry.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use tracing::debug;

use crate::aggregator::WEIGHT_EPSILON;
use crate::config::{ProviderKind, RegistryConfig};
use crate::fetcher_http::HttpFetcher;
use crate::searchers::ItunesSearcher;
use crate::{CombinedSearcher, PodcastSearcher, Result};

type SearcherFactory = Box<dyn Fn() -> Arc<dyn PodcastSearcher> + Send + Sync>;

/// A registered searcher and its ranking weight.
#[derive(Clone)]
pub struct ProviderEntry {
    searcher: Arc<dyn PodcastSearcher>,
    weight: f64,
}

impl ProviderEntry {
    /// Creates an entry.
    pub fn new(searcher: Arc<dyn PodcastSearcher>, weight: f64) -> Self {
        Self { searcher, weight }
    }

    /// Returns the searcher.
    pub fn searcher(&self) -> &Arc<dyn PodcastSearcher> {
        &self.searcher
    }

    /// Returns the ranking weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Whether the combined searcher should dispatch to this entry.
    pub fn is_active(&self) -> bool {
        self.weight > WEIGHT_EPSILON && !self.searcher.is_aggregate()
    }
}

impl fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("name", &self.searcher.name())
            .field("weight", &self.weight)
            .field("aggregate", &self.searcher.is_aggregate())
            .finish()
    }
}

/// Builder collecting searcher factories for a [`ProviderRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    pending: Vec<(f64, SearcherFactory)>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a searcher constructed on first access to the registry.
    pub fn register<S, F>(mut self, weight: f64, factory: F) -> Self
    where
        S: PodcastSearcher + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        let factory: SearcherFactory = Box::new(move || Arc::new(factory()));
        self.pending.push((weight, factory));
        self
    }

    /// Registers an already constructed searcher.
    pub fn register_arc(mut self, weight: f64, searcher: Arc<dyn PodcastSearcher>) -> Self {
        let factory: SearcherFactory = Box::new(move || Arc::clone(&searcher));
        self.pending.push((weight, factory));
        self
    }

    /// Finishes the registry. Nothing is constructed until the first
    /// call to [`ProviderRegistry::providers`].
    pub fn build(self) -> Arc<ProviderRegistry> {
        Arc::new_cyclic(|this| ProviderRegistry {
            this: this.clone(),
            pending: self.pending,
            entries: OnceLock::new(),
        })
    }
}

/// The set of searchers taking part in podcast search, with their weights.
///
/// The first entry is always the registry's own [`CombinedSearcher`].
/// Population happens once, on first access, and the list is read-only
/// afterwards.
pub struct ProviderRegistry {
    this: Weak<ProviderRegistry>,
    pending: Vec<(f64, SearcherFactory)>,
    entries: OnceLock<Vec<ProviderEntry>>,
}

impl ProviderRegistry {
    /// Returns a builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with the combined searcher and the iTunes searcher.
    pub fn with_defaults() -> Arc<Self> {
        Self::builder().register(1.0, ItunesSearcher::new).build()
    }

    /// Builds a registry from configuration. Disabled providers are kept
    /// with zero weight so they still answer lookups.
    pub fn from_config(config: &RegistryConfig) -> Arc<Self> {
        let mut builder = Self::builder();
        for provider in &config.providers {
            let timeout = provider.timeout_duration();
            builder = match provider.kind {
                ProviderKind::Itunes => builder.register(provider.effective_weight(), move || {
                    ItunesSearcher::with_fetcher(Arc::new(HttpFetcher::with_timeout(timeout)))
                }),
            };
        }
        builder.build()
    }

    /// Returns all entries in registration order, populating on first call.
    pub fn providers(&self) -> &[ProviderEntry] {
        self.entries.get_or_init(|| self.populate())
    }

    fn populate(&self) -> Vec<ProviderEntry> {
        let mut entries = Vec::with_capacity(self.pending.len() + 1);
        entries.push(ProviderEntry::new(
            Arc::new(CombinedSearcher::new(self.this.clone())),
            1.0,
        ));
        for (weight, factory) in &self.pending {
            entries.push(ProviderEntry::new(factory(), *weight));
        }
        debug!("Registry populated with {} providers", entries.len());
        entries
    }

    /// Returns the searcher that aggregates every other entry.
    pub fn combined(&self) -> Arc<dyn PodcastSearcher> {
        self.providers()
            .iter()
            .find(|entry| entry.searcher.is_aggregate())
            .map(|entry| Arc::clone(&entry.searcher))
            .unwrap_or_else(|| Arc::new(CombinedSearcher::new(self.this.clone())))
    }

    /// Display names of the entries the combined searcher dispatches to.
    pub fn active_names(&self) -> Vec<String> {
        self.providers()
            .iter()
            .filter(|entry| entry.is_active())
            .map(|entry| entry.searcher.name())
            .collect()
    }

    /// Whether any non-aggregate entry needs a lookup step for `url`.
    pub fn url_needs_lookup(&self, url: &str) -> bool {
        self.providers()
            .iter()
            .any(|entry| !entry.searcher.is_aggregate() && entry.searcher.url_needs_lookup(url))
    }

    /// Resolves `url` with the first non-aggregate entry that claims it.
    ///
    /// Later entries that would also claim the URL are not consulted. A URL
    /// nobody claims is returned unchanged.
    pub async fn lookup_url(&self, url: &str) -> Result<String> {
        let claimant = self
            .providers()
            .iter()
            .find(|entry| !entry.searcher.is_aggregate() && entry.searcher.url_needs_lookup(url));

        match claimant {
            Some(entry) => {
                debug!("Resolving {} with {}", url, entry.searcher.name());
                entry.searcher.lookup_url(url).await
            }
            None => Ok(url.to_string()),
        }
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("pending", &self.pending.len())
            .field("entries", &self.entries.get())
            .finish()
    }
}
