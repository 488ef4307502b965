/// Multi-source place aggregation
///
/// Fans out one query to every registered source concurrently, flattens the
/// contributions in registration order, deduplicates by case-insensitive
/// name, and paginates. Sources are registered in deliberate priority order:
/// when two sources return the same place name, the earlier-registered
/// source wins.
use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{Place, SearchResult};
use crate::services::providers::PlaceSource;

pub struct Aggregator {
    sources: Vec<Arc<dyn PlaceSource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn PlaceSource>>) -> Self {
        Self { sources }
    }

    /// Runs a search across all sources.
    ///
    /// Never fails: a source error degrades to an empty contribution from
    /// that source, and if every source fails the result is an empty, valid
    /// envelope. Fan-out waits for all sources to settle; no source can
    /// abort the group.
    pub async fn search(&self, query: &str, page: usize, page_size: usize) -> SearchResult<Place> {
        let page = page.max(1);
        let page_size = page_size.max(1);

        let mut tasks = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let source = Arc::clone(source);
            let query = query.to_string();
            tasks.push(tokio::spawn(async move { source.fetch(&query).await }));
        }

        // Awaiting in registration order keeps the flatten stable
        let mut candidates = Vec::new();
        for (task, source) in tasks.into_iter().zip(&self.sources) {
            match task.await {
                Ok(Ok(places)) => candidates.extend(places),
                Ok(Err(e)) => {
                    tracing::warn!(source = %source.name(), error = %e, "Source fetch failed");
                }
                Err(e) => {
                    tracing::error!(source = %source.name(), error = %e, "Source task join error");
                }
            }
        }

        let deduplicated = dedup_by_name(candidates);
        let total = deduplicated.len();
        let total_pages = total.div_ceil(page_size);

        let places: Vec<Place> = deduplicated
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        tracing::info!(
            query = %query,
            total,
            page,
            returned = places.len(),
            "Search aggregation completed"
        );

        SearchResult {
            places,
            total,
            page,
            page_size,
            total_pages,
            query: query.to_string(),
        }
    }
}

/// Keeps the first occurrence of each case-insensitive name, in input order
fn dedup_by_name(places: Vec<Place>) -> Vec<Place> {
    let mut seen = HashSet::new();
    places
        .into_iter()
        .filter(|place| seen.insert(place.name.to_lowercase()))
        .collect()
}
