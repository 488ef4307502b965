/// AI place enhancement
///
/// Attaches a structured recommendation and a derived rank to each place by
/// calling a generative model. The model is a constructor-injected
/// capability; when none is configured, places pass through untouched with
/// zero confidence and rank. Enhancement is fail-open end to end: a model
/// error or unparseable output degrades one place to default recommendation
/// values and never fails the batch.
use std::sync::Arc;

use serde::Deserialize;

use crate::error::AppResult;
use crate::models::{AiRecommendation, EnhancedPlace, Place};

/// Text-completion capability consumed by the enhancer
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Sends a prompt and returns the model's free-text output, which is
    /// expected (but not guaranteed) to contain one JSON object
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

pub struct PlaceEnhancer {
    model: Option<Arc<dyn GenerativeModel>>,
}

impl PlaceEnhancer {
    pub fn new(model: Option<Arc<dyn GenerativeModel>>) -> Self {
        Self { model }
    }

    /// Enhances every place concurrently, then sorts descending by rank
    /// (stable, so ties keep their aggregation order)
    pub async fn enhance_all(&self, places: Vec<Place>, query: &str) -> Vec<EnhancedPlace> {
        let model = match &self.model {
            Some(model) => Arc::clone(model),
            None => {
                // Supported non-error mode: no credential configured
                return places.into_iter().map(EnhancedPlace::unenhanced).collect();
            }
        };

        let mut tasks = Vec::with_capacity(places.len());
        for place in &places {
            let model = Arc::clone(&model);
            let place = place.clone();
            let query = query.to_string();
            tasks.push(tokio::spawn(async move {
                enhance_place(model, place, &query).await
            }));
        }

        let mut enhanced = Vec::with_capacity(places.len());
        for (task, original) in tasks.into_iter().zip(places) {
            match task.await {
                Ok(place) => enhanced.push(place),
                Err(e) => {
                    tracing::error!(error = %e, "Enhancement task join error");
                    enhanced.push(EnhancedPlace::unenhanced(original));
                }
            }
        }

        enhanced.sort_by(|a, b| b.ai_rank.cmp(&a.ai_rank));
        enhanced
    }
}

async fn enhance_place(
    model: Arc<dyn GenerativeModel>,
    place: Place,
    query: &str,
) -> EnhancedPlace {
    let prompt = build_prompt(&place, query);

    let recommendation = match model.generate(&prompt).await {
        Ok(text) => parse_recommendation(&text),
        Err(e) => {
            tracing::warn!(place = %place.name, error = %e, "Model call failed");
            fallback_recommendation()
        }
    };

    let ai_confidence = recommendation.confidence;
    let ai_rank = rank(&recommendation);

    EnhancedPlace {
        place,
        recommendation: Some(recommendation),
        ai_confidence,
        ai_rank,
    }
}

fn build_prompt(place: &Place, query: &str) -> String {
    format!(
        r#"You are a local guide helping someone who searched for "{query}".

Evaluate this place for them:
Name: {name}
Description: {description}
Category: {category}
Rating: {rating:.1}
Price level: {price_level} (0 = cheap, 3 = expensive)
Source: {source}

Respond with a single JSON object with these fields:
{{
  "confidence": <0-100 how well this matches the search>,
  "reasoning": "<why this place fits or doesn't>",
  "personalized_notes": "<notes tailored to the search>",
  "best_for": ["<audience or occasion>"],
  "avoid_if": ["<who should skip it>"],
  "best_time_to_visit": "<when to go>",
  "local_tips": ["<insider tip>"]
}}"#,
        query = query,
        name = place.name,
        description = place.description,
        category = place.category,
        rating = place.rating,
        price_level = place.price_level,
        source = place.source,
    )
}

/// Per-field defaults applied when the model's JSON omits something
#[derive(Debug, Deserialize)]
struct PartialRecommendation {
    confidence: Option<f64>,
    reasoning: Option<String>,
    personalized_notes: Option<String>,
    best_for: Option<Vec<String>>,
    avoid_if: Option<Vec<String>>,
    best_time_to_visit: Option<String>,
    local_tips: Option<Vec<String>>,
}

/// Best-effort parse of free model text: locate the first balanced JSON
/// object, deserialize it, and fill missing fields with fixed defaults. The
/// upstream text is not contractually valid JSON, so total failure falls
/// back to a complete default recommendation.
fn parse_recommendation(text: &str) -> AiRecommendation {
    let parsed = extract_json_object(text)
        .and_then(|json| serde_json::from_str::<PartialRecommendation>(json).ok());

    match parsed {
        Some(partial) => AiRecommendation {
            confidence: partial
                .confidence
                .map(|c| c.round().clamp(0.0, 100.0) as u32)
                .unwrap_or(75),
            reasoning: partial
                .reasoning
                .unwrap_or_else(|| "AI analysis available".to_string()),
            personalized_notes: partial.personalized_notes.unwrap_or_default(),
            best_for: partial
                .best_for
                .unwrap_or_else(|| vec!["General visit".to_string()]),
            avoid_if: partial
                .avoid_if
                .unwrap_or_else(|| vec!["No specific concerns".to_string()]),
            best_time_to_visit: partial
                .best_time_to_visit
                .unwrap_or_else(|| "Anytime".to_string()),
            local_tips: partial
                .local_tips
                .unwrap_or_else(|| vec!["Check current hours".to_string()]),
        },
        None => fallback_recommendation(),
    }
}

/// Complete fixed default used when the model call or parse fails entirely
fn fallback_recommendation() -> AiRecommendation {
    AiRecommendation {
        confidence: 70,
        reasoning: "AI analysis available".to_string(),
        personalized_notes: String::new(),
        best_for: vec!["General visit".to_string()],
        avoid_if: vec!["No specific concerns".to_string()],
        best_time_to_visit: "Anytime".to_string(),
        local_tips: vec!["Check current hours".to_string()],
    }
}

/// Finds the first balanced `{...}` substring, aware of strings and escapes
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Weighted composite rank: rewards confidence, longer reasoning, and more
/// tips, with the latter two capped so verbosity past the threshold earns
/// nothing extra
fn rank(recommendation: &AiRecommendation) -> u32 {
    let confidence = f64::from(recommendation.confidence) / 100.0;
    let reasoning = (recommendation.reasoning.len() as f64 / 100.0).min(1.0);
    let tips = (recommendation.local_tips.len() as f64 / 5.0).min(1.0);

    (100.0 * (0.4 * confidence + 0.3 * reasoning + 0.3 * tips)).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use chrono::Utc;
    use uuid::Uuid;

    fn place(name: &str) -> Place {
        Place {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: "A spot".to_string(),
            address: None,
            latitude: 37.7749,
            longitude: -122.4194,
            rating: 4.4,
            price_level: 2,
            category: "cafe".to_string(),
            photo_url: None,
            phone: None,
            website: None,
            source: "cityguide".to_string(),
            scraped_at: Utc::now(),
        }
    }

    fn recommendation(confidence: u32, reasoning: &str, tips: usize) -> AiRecommendation {
        AiRecommendation {
            confidence,
            reasoning: reasoning.to_string(),
            personalized_notes: String::new(),
            best_for: vec![],
            avoid_if: vec![],
            best_time_to_visit: "Anytime".to_string(),
            local_tips: (0..tips).map(|i| format!("tip {}", i)).collect(),
        }
    }

    #[tokio::test]
    async fn test_no_model_passes_places_through() {
        let enhancer = PlaceEnhancer::new(None);
        let places = vec![place("Cafe X"), place("Cafe Y")];

        let enhanced = enhancer.enhance_all(places.clone(), "coffee").await;
        assert_eq!(enhanced.len(), 2);
        for (enhanced, original) in enhanced.iter().zip(&places) {
            assert_eq!(enhanced.place, *original);
            assert_eq!(enhanced.ai_confidence, 0);
            assert_eq!(enhanced.ai_rank, 0);
            assert!(enhanced.recommendation.is_none());
        }
    }

    #[tokio::test]
    async fn test_model_error_degrades_to_fallback() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .returning(|_| Err(AppError::ExternalApi("quota exceeded".to_string())));

        let enhancer = PlaceEnhancer::new(Some(Arc::new(model)));
        let enhanced = enhancer.enhance_all(vec![place("Cafe X")], "coffee").await;

        assert_eq!(enhanced.len(), 1);
        assert_eq!(enhanced[0].ai_confidence, 70);
        let rec = enhanced[0].recommendation.as_ref().unwrap();
        assert_eq!(rec.local_tips, vec!["Check current hours"]);
    }

    #[tokio::test]
    async fn test_model_output_parsed_with_defaults_filled() {
        let mut model = MockGenerativeModel::new();
        model.expect_generate().returning(|_| {
            Ok(r#"Sure! Here's my take: {"confidence": 88, "reasoning": "Great match"} hope that helps."#
                .to_string())
        });

        let enhancer = PlaceEnhancer::new(Some(Arc::new(model)));
        let enhanced = enhancer.enhance_all(vec![place("Cafe X")], "coffee").await;

        let rec = enhanced[0].recommendation.as_ref().unwrap();
        assert_eq!(rec.confidence, 88);
        assert_eq!(rec.reasoning, "Great match");
        assert_eq!(rec.best_for, vec!["General visit"]);
        assert_eq!(rec.avoid_if, vec!["No specific concerns"]);
        assert_eq!(rec.best_time_to_visit, "Anytime");
        assert_eq!(rec.local_tips, vec!["Check current hours"]);
        assert_eq!(enhanced[0].ai_confidence, 88);
    }

    #[tokio::test]
    async fn test_garbage_model_output_uses_complete_fallback() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .returning(|_| Ok("I could not produce JSON today.".to_string()));

        let enhancer = PlaceEnhancer::new(Some(Arc::new(model)));
        let enhanced = enhancer.enhance_all(vec![place("Cafe X")], "coffee").await;

        assert_eq!(enhanced[0].ai_confidence, 70);
    }

    #[tokio::test]
    async fn test_ranking_prefers_detailed_output_over_raw_confidence() {
        // First place answers with high confidence but little substance;
        // second with lower confidence but long reasoning and five tips.
        let long_reasoning = "x".repeat(120);
        let detailed = format!(
            r#"{{"confidence": 70, "reasoning": "{}", "local_tips": ["a","b","c","d","e"]}}"#,
            long_reasoning
        );

        let mut model = MockGenerativeModel::new();
        model.expect_generate().returning(move |prompt| {
            if prompt.contains("Name: Terse") {
                Ok(r#"{"confidence": 90, "reasoning": "Good."}"#.to_string())
            } else {
                Ok(detailed.clone())
            }
        });

        let enhancer = PlaceEnhancer::new(Some(Arc::new(model)));
        let enhanced = enhancer
            .enhance_all(vec![place("Terse"), place("Detailed")], "coffee")
            .await;

        // 0.4*0.7 + 0.3*1.0 + 0.3*1.0 = 0.88 beats 0.4*0.9 + small terms
        assert_eq!(enhanced[0].place.name, "Detailed");
        assert_eq!(enhanced[0].ai_rank, 88);
        assert_eq!(enhanced[1].place.name, "Terse");
        assert!(enhanced[1].ai_rank < 50);
    }

    #[test]
    fn test_rank_formula_components() {
        // Confidence only
        assert_eq!(rank(&recommendation(100, "", 0)), 40);
        // Reasoning capped at 100 chars
        let rec = recommendation(0, &"y".repeat(250), 0);
        assert_eq!(rank(&rec), 30);
        // Tips capped at 5
        assert_eq!(rank(&recommendation(0, "", 10)), 30);
        // All maxed
        let rec = recommendation(100, &"y".repeat(100), 5);
        assert_eq!(rank(&rec), 100);
    }

    #[test]
    fn test_extract_json_object_plain() {
        assert_eq!(extract_json_object(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn test_extract_json_object_surrounded_by_prose() {
        let text = r#"Here you go: {"a": {"b": 2}} -- enjoy"#;
        assert_eq!(extract_json_object(text), Some(r#"{"a": {"b": 2}}"#));
    }

    #[test]
    fn test_extract_json_object_braces_inside_strings() {
        let text = r#"{"a": "close} brace", "b": 1}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_extract_json_object_escaped_quote() {
        let text = r#"{"a": "quote \" and } brace"}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_extract_json_object_unbalanced_returns_none() {
        assert_eq!(extract_json_object(r#"{"a": 1"#), None);
        assert_eq!(extract_json_object("no braces at all"), None);
    }

    #[test]
    fn test_parse_recommendation_clamps_confidence() {
        let rec = parse_recommendation(r#"{"confidence": 250}"#);
        assert_eq!(rec.confidence, 100);
    }
}
