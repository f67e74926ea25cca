//! Aggregation use case - merge, deduplicate, rank and truncate news items

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::model::NewsItem;

/// Number of items that make it into a post
pub const TOP_N: usize = 3;

/// Drop repeated urls, keeping the first occurrence in input order
pub fn dedup_by_url(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.url.clone()))
        .collect()
}

/// Sort newest first by parsed publication time.
///
/// Unparsable timestamps sort after every parsed one. The sort is stable so
/// ties keep their input order.
pub fn rank_by_recency(items: &mut [NewsItem]) {
    items.sort_by_key(|item| Reverse(item.published_timestamp()));
}

/// Full aggregation: dedup, rank, keep the top [`TOP_N`]
pub fn aggregate(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let fetched = items.len();
    let mut unique = dedup_by_url(items);

    tracing::debug!(
        fetched = fetched,
        unique = unique.len(),
        "Deduplicated news items"
    );

    rank_by_recency(&mut unique);
    unique.truncate(TOP_N);
    unique
}
