use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppResult;
use crate::services::enhancer::GenerativeModel;
use crate::services::gemini::GeminiModel;
use crate::services::openai::OpenAiModel;
use crate::services::providers::{PlaceSource, ScrapedSource, SelectorConfig, SourceConfig};
use crate::services::{Aggregator, PlaceEnhancer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub enhancer: Arc<PlaceEnhancer>,
}

impl AppState {
    /// Assembles state from already-built components (used by tests to
    /// inject stub sources and models)
    pub fn new(aggregator: Aggregator, enhancer: PlaceEnhancer) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            enhancer: Arc::new(enhancer),
        }
    }

    /// Wires the default source roster and optional Gemini model from
    /// configuration.
    ///
    /// Sources are registered in priority order: on duplicate place names
    /// the earlier source wins during aggregation.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.source_timeout_secs);

        let sources: Vec<Arc<dyn PlaceSource>> = default_source_configs()
            .into_iter()
            .map(|source_config| {
                ScrapedSource::new(source_config, timeout)
                    .map(|source| Arc::new(source) as Arc<dyn PlaceSource>)
            })
            .collect::<AppResult<_>>()?;

        let model = build_model(config);

        if model.is_none() {
            tracing::info!(
                provider = %config.ai_provider,
                "No API key configured for the selected provider; AI enhancement disabled"
            );
        }

        Ok(Self::new(
            Aggregator::new(sources),
            PlaceEnhancer::new(model),
        ))
    }
}

/// Picks the generative model named by `ai_provider`. Any value other than
/// "openai" selects Gemini, matching the configuration default.
fn build_model(config: &Config) -> Option<Arc<dyn GenerativeModel>> {
    match config.ai_provider.as_str() {
        "openai" => config.openai_api_key.as_ref().map(|key| {
            Arc::new(OpenAiModel::new(key.clone(), config.openai_api_url.clone()))
                as Arc<dyn GenerativeModel>
        }),
        _ => config.gemini_api_key.as_ref().map(|key| {
            Arc::new(GeminiModel::new(key.clone(), config.gemini_api_url.clone()))
                as Arc<dyn GenerativeModel>
        }),
    }
}

/// Scraping targets in priority order. The selectors describe each site's
/// current markup and are expected to need occasional upkeep.
fn default_source_configs() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            name: "wanderguide".to_string(),
            base_url: "https://www.wanderguide.com".to_string(),
            search_url: "https://www.wanderguide.com/search?q={query}".to_string(),
            selectors: SelectorConfig {
                container: "article.search-result".to_string(),
                title: "h3.result-title".to_string(),
                description: "p.result-snippet".to_string(),
                link: "a.result-link".to_string(),
                image: "img.result-thumb".to_string(),
            },
        },
        SourceConfig {
            name: "atlasobscura".to_string(),
            base_url: "https://www.atlasobscura.com".to_string(),
            search_url: "https://www.atlasobscura.com/search?q={query}".to_string(),
            selectors: SelectorConfig {
                container: "div.content-card".to_string(),
                title: "h3".to_string(),
                description: "div.content-card-subtitle".to_string(),
                link: "a".to_string(),
                image: "img".to_string(),
            },
        },
        SourceConfig {
            name: "timeout".to_string(),
            base_url: "https://www.timeout.com".to_string(),
            search_url: "https://www.timeout.com/search?query={query}".to_string(),
            selectors: SelectorConfig {
                container: "article".to_string(),
                title: "h3".to_string(),
                description: "p".to_string(),
                link: "a".to_string(),
                image: "img".to_string(),
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            ai_provider: "gemini".to_string(),
            gemini_api_key: None,
            gemini_api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            openai_api_key: None,
            openai_api_url: "https://api.openai.com/v1".to_string(),
            source_timeout_secs: 10,
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }

    #[test]
    fn test_from_config_compiles_default_sources() {
        // All bundled selector configs must compile
        assert!(AppState::from_config(&config()).is_ok());
    }

    #[test]
    fn test_build_model_selects_provider_by_key() {
        // No key for the selected provider disables enhancement
        assert!(build_model(&config()).is_none());

        let mut with_gemini = config();
        with_gemini.gemini_api_key = Some("k".to_string());
        assert!(build_model(&with_gemini).is_some());

        // An OpenAI key alone does nothing while Gemini is selected
        let mut wrong_provider = config();
        wrong_provider.openai_api_key = Some("k".to_string());
        assert!(build_model(&wrong_provider).is_none());

        let mut with_openai = config();
        with_openai.ai_provider = "openai".to_string();
        with_openai.openai_api_key = Some("k".to_string());
        assert!(build_model(&with_openai).is_some());
    }
}
