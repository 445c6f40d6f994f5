//! # podcast-discovery
//!
//! Podcast search across pluggable providers.
//!
//! A [`ProviderRegistry`] holds the participating searchers and their
//! weights. Its [`CombinedSearcher`] sends a query to every active provider
//! at once, waits for all of them, and merges their ranked lists with
//! weighted reciprocal-rank fusion:
//!
//! - Async parallel search execution with per-provider failure isolation
//! - Deduplication by feed URL
//! - Lookup of indirect result URLs (e.g. Apple Podcasts pages)
//! - iTunes top list with already-subscribed feeds removed
//!
//! ## Example
//!
//! ```rust,no_run
//! use podcast_discovery::ProviderRegistry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = ProviderRegistry::with_defaults();
//!     let results = registry.combined().search("history").await?;
//!
//!     for result in &results {
//!         let feed = result.feed_url.as_deref().unwrap_or_default();
//!         let feed = if registry.url_needs_lookup(feed) {
//!             registry.lookup_url(feed).await?
//!         } else {
//!             feed.to_string()
//!         };
//!         println!("{}: {}", result.title, feed);
//!     }
//!     Ok(())
//! }
//! ```

mod aggregator;
mod combined;
mod error;
mod registry;
mod result;
mod searcher;

pub mod config;
pub mod fetcher;
pub mod fetcher_http;
pub mod searchers;
pub mod toplist;

pub use aggregator::{Contribution, RankMerger, WEIGHT_EPSILON};
pub use combined::CombinedSearcher;
pub use error::{Result, SearchError};
pub use registry::{ProviderEntry, ProviderRegistry, RegistryBuilder};
pub use result::PodcastSearchResult;
pub use searcher::PodcastSearcher;
