//! Podcast searcher implementations.

mod itunes;

pub use itunes::{ItunesSearcher, ITUNES_LOOKUP_URL, ITUNES_SEARCH_URL};
