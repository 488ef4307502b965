/// Selector-driven HTML source adapter
///
/// One `ScrapedSource` instance covers one external listing/blog site. The
/// CSS selectors are configuration data describing that site's markup, not
/// algorithmic logic; swapping a site means swapping its `SourceConfig`.
use std::time::Duration;

use chrono::Utc;
use reqwest::Client as HttpClient;
use scraper::{Html, Selector};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Place,
    services::providers::{normalize, PlaceSource},
};

/// Cap on results extracted per source per query
const MAX_RESULTS: usize = 10;

/// CSS selectors describing where place data lives in a source's markup
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    pub container: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub image: String,
}

/// Static description of one scraping target
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Source tag, also used on produced places
    pub name: String,
    /// Base URL for resolving relative links
    pub base_url: String,
    /// Search URL template containing a `{query}` placeholder
    pub search_url: String,
    pub selectors: SelectorConfig,
}

struct CompiledSelectors {
    container: Selector,
    title: Selector,
    description: Selector,
    link: Selector,
    image: Selector,
}

/// A source adapter backed by HTML scraping of one external site
pub struct ScrapedSource {
    name: String,
    base_url: String,
    search_url: String,
    client: HttpClient,
    selectors: CompiledSelectors,
}

fn compile(selector: &str) -> AppResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| AppError::Parse(format!("invalid selector {:?}: {}", selector, e)))
}

impl ScrapedSource {
    /// Builds an adapter from a source description.
    ///
    /// Fails only on malformed configuration (bad selector syntax); runtime
    /// fetch/parse problems degrade to empty results at the aggregation
    /// boundary instead.
    pub fn new(config: SourceConfig, timeout: Duration) -> AppResult<Self> {
        let client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            name: config.name,
            base_url: config.base_url,
            search_url: config.search_url,
            client,
            selectors: CompiledSelectors {
                container: compile(&config.selectors.container)?,
                title: compile(&config.selectors.title)?,
                description: compile(&config.selectors.description)?,
                link: compile(&config.selectors.link)?,
                image: compile(&config.selectors.image)?,
            },
        })
    }

    fn search_url_for(&self, query: &str) -> String {
        self.search_url.replace("{query}", &query.replace(' ', "+"))
    }

    /// Extracts normalized places from a fetched document.
    ///
    /// Kept synchronous so the non-`Send` parsed DOM never lives across an
    /// await point.
    fn extract_places(&self, query: &str, html: &str) -> Vec<Place> {
        let document = Html::parse_document(html);
        let mut places = Vec::new();

        for container in document.select(&self.selectors.container).take(MAX_RESULTS) {
            let title: String = match container.select(&self.selectors.title).next() {
                Some(el) => el.text().collect::<String>().trim().to_string(),
                None => continue,
            };
            if title.len() < 2 {
                continue;
            }

            let description = container
                .select(&self.selectors.description)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            let website = container
                .select(&self.selectors.link)
                .next()
                .and_then(|el| el.value().attr("href"))
                .and_then(|href| normalize::resolve_url(&self.base_url, href));

            let photo_url = container
                .select(&self.selectors.image)
                .next()
                .and_then(|el| el.value().attr("src"))
                .and_then(|src| normalize::resolve_url(&self.base_url, src));

            let combined = format!("{} {} {}", query, title, description);
            let (latitude, longitude) = normalize::locate(query);

            places.push(Place {
                id: Uuid::new_v4(),
                name: title,
                description,
                address: None,
                latitude,
                longitude,
                rating: normalize::placeholder_rating(),
                price_level: normalize::placeholder_price_level(),
                category: normalize::infer_category(&combined).to_string(),
                photo_url,
                phone: None,
                website,
                source: self.name.clone(),
                scraped_at: Utc::now(),
            });
        }

        places
    }
}

#[async_trait::async_trait]
impl PlaceSource for ScrapedSource {
    async fn fetch(&self, query: &str) -> AppResult<Vec<Place>> {
        let url = self.search_url_for(query);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "{} returned status {}",
                self.name,
                response.status()
            )));
        }

        let body = response.text().await?;
        let places = self.extract_places(query, &body);

        tracing::info!(
            source = %self.name,
            query = %query,
            results = places.len(),
            "Source fetch completed"
        );

        Ok(places)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
