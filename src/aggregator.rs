//! Result merging and ranking.

use std::collections::HashMap;

use crate::PodcastSearchResult;

/// Weights at or below this value disable a provider.
pub const WEIGHT_EPSILON: f64 = 0.00001;

/// One provider's contribution to a merge: its weight and its ranked
/// results, or `None` if the provider was skipped or failed.
pub type Contribution = (f64, Option<Vec<PodcastSearchResult>>);

/// Merges ranked result lists with weighted reciprocal-rank fusion.
///
/// Every result at zero-based position `p` of a provider with weight `w`
/// updates its feed URL's score as `score = (score + 1 / (p + 1)) * w`.
/// The weight multiplies the whole accumulated score, not only the new
/// contribution, so the order in which providers are merged matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct RankMerger;

#[derive(Debug)]
struct RankEntry {
    score: f64,
    result: PodcastSearchResult,
}

impl RankMerger {
    /// Creates a new merger.
    pub fn new() -> Self {
        Self
    }

    /// Merges contributions into one list, best first.
    pub fn merge(&self, contributions: Vec<Contribution>) -> Vec<PodcastSearchResult> {
        self.merge_scored(contributions)
            .into_iter()
            .map(|(result, _)| result)
            .collect()
    }

    /// Merges contributions and keeps each result's final score.
    ///
    /// Results without a feed URL are discarded. When the same feed URL
    /// appears more than once, the result seen last represents it. Ties
    /// keep the order in which feed URLs were first seen.
    pub fn merge_scored(&self, contributions: Vec<Contribution>) -> Vec<(PodcastSearchResult, f64)> {
        let mut entries: Vec<RankEntry> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (weight, results) in contributions {
            if weight <= WEIGHT_EPSILON {
                continue;
            }
            let Some(results) = results else {
                continue;
            };

            // Feed-less results are skipped but still occupy their position.
            for (position, result) in results.into_iter().enumerate() {
                let feed_url = match &result.feed_url {
                    Some(url) if !url.is_empty() => url.clone(),
                    _ => continue,
                };
                let contribution = 1.0 / (position as f64 + 1.0);

                match index.get(&feed_url).copied() {
                    Some(slot) => {
                        let entry = &mut entries[slot];
                        entry.score = (entry.score + contribution) * weight;
                        entry.result = result;
                    }
                    None => {
                        index.insert(feed_url, entries.len());
                        entries.push(RankEntry {
                            score: contribution * weight,
                            result,
                        });
                    }
                }
            }
        }

        // Stable: equal scores stay in first-seen order.
        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        entries
            .into_iter()
            .map(|entry| (entry.result, entry.score))
            .collect()
    }
}
