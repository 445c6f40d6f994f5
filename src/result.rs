//! Podcast search result type.

use serde::{Deserialize, Serialize};

/// One candidate podcast found by a searcher.
///
/// Results are created fresh per search call and never mutated after a
/// searcher hands them out. A result without a feed URL cannot be
/// subscribed to and is dropped before ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodcastSearchResult {
    /// Podcast title.
    pub title: String,
    /// Feed URL, if the provider knows it.
    pub feed_url: Option<String>,
    /// Artwork URL.
    pub image_url: Option<String>,
    /// Author or publisher.
    pub author: Option<String>,
    /// Short description.
    pub description: Option<String>,
    /// Number of episodes, if reported.
    pub episode_count: Option<u32>,
    /// Date of the most recent episode, as reported by the provider.
    pub last_update: Option<String>,
    /// Which provider produced this result.
    pub source: String,
}

impl PodcastSearchResult {
    /// Creates a result with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            feed_url: None,
            image_url: None,
            author: None,
            description: None,
            episode_count: None,
            last_update: None,
            source: String::new(),
        }
    }

    /// Sets the feed URL.
    pub fn with_feed_url(mut self, feed_url: impl Into<String>) -> Self {
        self.feed_url = Some(feed_url.into());
        self
    }

    /// Sets the artwork URL.
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the episode count.
    pub fn with_episode_count(mut self, count: u32) -> Self {
        self.episode_count = Some(count);
        self
    }

    /// Sets the last update date.
    pub fn with_last_update(mut self, date: impl Into<String>) -> Self {
        self.last_update = Some(date.into());
        self
    }

    /// Sets the producing source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Whether this result can be merged and subscribed to.
    pub fn has_feed_url(&self) -> bool {
        self.feed_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}
