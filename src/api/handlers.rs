use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{Directions, EnhancedPlace, SearchResult, TravelMode};
use crate::services::directions;

use super::AppState;

// Request types

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// GET variant of the search request, for manual testing
#[derive(Debug, Deserialize)]
pub struct SearchQueryParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Accepted as a POST body or as GET query parameters
#[derive(Debug, Deserialize)]
pub struct DirectionsRequest {
    pub origin_lat: Option<f64>,
    pub origin_lng: Option<f64>,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub mode: Option<String>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Aggregated place search with optional AI enhancement
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Json<SearchResult<EnhancedPlace>>> {
    run_search(&state, request.query, request.page, request.page_size).await
}

/// GET variant accepting `q`, `page`, `page_size` query parameters
pub async fn search_get(
    State(state): State<AppState>,
    Query(params): Query<SearchQueryParams>,
) -> AppResult<Json<SearchResult<EnhancedPlace>>> {
    run_search(&state, params.q, params.page, params.page_size).await
}

async fn run_search(
    state: &AppState,
    query: Option<String>,
    page: usize,
    page_size: usize,
) -> AppResult<Json<SearchResult<EnhancedPlace>>> {
    let query = query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("Query parameter is required".to_string()))?;

    let aggregated = state.aggregator.search(&query, page, page_size).await;

    let SearchResult {
        places,
        total,
        page,
        page_size,
        total_pages,
        query,
    } = aggregated;

    let enhanced = state.enhancer.enhance_all(places, &query).await;

    Ok(Json(SearchResult {
        places: enhanced,
        total,
        page,
        page_size,
        total_pages,
        query,
    }))
}

/// Synthesized directions between two coordinates
pub async fn get_directions(
    Json(request): Json<DirectionsRequest>,
) -> AppResult<Json<Directions>> {
    run_directions(request)
}

/// GET variant accepting the same fields as query parameters
pub async fn get_directions_get(
    Query(request): Query<DirectionsRequest>,
) -> AppResult<Json<Directions>> {
    run_directions(request)
}

fn run_directions(request: DirectionsRequest) -> AppResult<Json<Directions>> {
    let (origin_lat, origin_lng, destination_lat, destination_lng) = match (
        request.origin_lat,
        request.origin_lng,
        request.destination_lat,
        request.destination_lng,
    ) {
        (Some(olat), Some(olng), Some(dlat), Some(dlng)) => (olat, olng, dlat, dlng),
        _ => {
            return Err(AppError::InvalidInput(
                "Origin and destination coordinates are required".to_string(),
            ))
        }
    };

    let mode: TravelMode = request.mode.as_deref().unwrap_or("driving").parse()?;

    Ok(Json(directions::synthesize(
        origin_lat,
        origin_lng,
        destination_lat,
        destination_lng,
        mode,
    )))
}
