use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Normalized point-of-interest record produced by a source adapter.
///
/// Places are created fresh per search request and never persisted. Two
/// places with case-insensitive-equal names are treated as duplicates during
/// aggregation regardless of which source produced them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    /// Unique within one search run
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// 0.0 to 5.0; synthesized when the source provides none
    pub rating: f64,
    /// 0 (free/cheap) to 3 (expensive); synthesized when the source provides none
    pub price_level: u8,
    /// Lower-case category derived from keyword heuristics
    pub category: String,
    pub photo_url: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// Originating source tag
    pub source: String,
    pub scraped_at: DateTime<Utc>,
}

/// Structured recommendation returned by the generative model for one place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiRecommendation {
    /// 0 to 100
    pub confidence: u32,
    pub reasoning: String,
    pub personalized_notes: String,
    pub best_for: Vec<String>,
    pub avoid_if: Vec<String>,
    pub best_time_to_visit: String,
    pub local_tips: Vec<String>,
}

/// A place plus its (optional) AI recommendation and derived rank.
///
/// When enhancement is disabled or fails, the base place survives untouched
/// with `ai_confidence` and `ai_rank` both zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnhancedPlace {
    #[serde(flatten)]
    pub place: Place,
    pub recommendation: Option<AiRecommendation>,
    pub ai_confidence: u32,
    pub ai_rank: u32,
}

impl EnhancedPlace {
    /// Wraps a place without any AI data attached
    pub fn unenhanced(place: Place) -> Self {
        Self {
            place,
            recommendation: None,
            ai_confidence: 0,
            ai_rank: 0,
        }
    }
}

/// Paginated search envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult<T> {
    pub places: Vec<T>,
    /// Post-dedup, pre-pagination count
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub query: String,
}

impl<T> SearchResult<T> {
    /// Maps the place list while keeping the envelope metadata intact
    pub fn map_places<U>(self, f: impl FnMut(T) -> U) -> SearchResult<U> {
        SearchResult {
            places: self.places.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            query: self.query,
        }
    }
}

/// Travel mode accepted by the directions endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
    Transit,
    Bicycling,
}

impl FromStr for TravelMode {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driving" => Ok(TravelMode::Driving),
            "walking" => Ok(TravelMode::Walking),
            "transit" => Ok(TravelMode::Transit),
            "bicycling" => Ok(TravelMode::Bicycling),
            _ => Err(crate::error::AppError::InvalidInput(
                "Invalid mode. Must be one of: driving, walking, transit, bicycling".to_string(),
            )),
        }
    }
}

impl Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Transit => "transit",
            TravelMode::Bicycling => "bicycling",
        };
        write!(f, "{}", s)
    }
}

/// One instruction in a synthesized route
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectionStep {
    pub instruction: String,
    pub distance: String,
    pub duration: String,
}

/// Synthesized directions between two points.
///
/// Steps and totals are scaled independently from the same template, so step
/// values approximate rather than exactly sum to the totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directions {
    pub steps: Vec<DirectionStep>,
    pub total_distance: String,
    pub total_duration: String,
    pub mode: String,
}
