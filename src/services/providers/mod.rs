/// Place source abstraction
///
/// This module provides a pluggable architecture for the external sources a
/// search fans out to (scraped travel blogs and listing sites). Each source
/// turns a free-text query into normalized [`Place`] records; the aggregator
/// treats every source as an isolated failure domain.
use crate::{error::AppResult, models::Place};

pub mod normalize;
pub mod scraped;

pub use scraped::{ScrapedSource, SelectorConfig, SourceConfig};

/// Trait for place sources
///
/// Implementations may suspend on network I/O. A failing source returns an
/// error; the aggregator converts it to an empty contribution rather than
/// letting it cross the fan-out boundary.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaceSource: Send + Sync {
    /// Fetch candidate places for a query
    async fn fetch(&self, query: &str) -> AppResult<Vec<Place>>;

    /// Source tag for logging and the `source` field on produced places
    fn name(&self) -> &str;
}
