//! Normalization duties shared by every source adapter.
//!
//! Scraped sources rarely expose structured coordinates, ratings, or price
//! data, so this module synthesizes placeholder values where the source is
//! silent. Anything named `placeholder_*` (and the coordinate jitter) is
//! synthesized presentation data, not a measurement.

use rand::Rng;

/// Ordered category rules; first case-insensitive substring match wins
const CATEGORY_RULES: &[(&[&str], &str)] = &[
    (&["restaurant", "food", "dining"], "restaurant"),
    (&["cafe", "coffee"], "cafe"),
    (&["hotel", "accommodation"], "hotel"),
    (&["museum", "gallery"], "museum"),
    (&["park", "garden"], "park"),
    (&["bar", "pub"], "bar"),
    (&["shop", "store"], "shop"),
    (&["attraction", "sight"], "attraction"),
];

/// Known city centroids for query-based coordinate lookup
const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("new york", 40.7128, -74.0060),
    ("los angeles", 34.0522, -118.2437),
    ("chicago", 41.8781, -87.6298),
    ("san francisco", 37.7749, -122.4194),
    ("seattle", 47.6062, -122.3321),
    ("boston", 42.3601, -71.0589),
    ("austin", 30.2672, -97.7431),
    ("london", 51.5074, -0.1278),
    ("paris", 48.8566, 2.3522),
    ("tokyo", 35.6762, 139.6503),
];

/// Fallback centroid when no known city appears in the query (San Francisco)
const FALLBACK_COORDINATES: (f64, f64) = (37.7749, -122.4194);

/// Maximum jitter applied per axis, in degrees
const JITTER_DEGREES: f64 = 0.005;

/// Derives a place category from keyword heuristics over the combined
/// query, title, and description text
pub fn infer_category(text: &str) -> &'static str {
    let text = text.to_lowercase();
    for (keywords, category) in CATEGORY_RULES {
        if keywords.iter().any(|k| text.contains(k)) {
            return category;
        }
    }
    "place"
}

/// Resolves query text to coordinates via the city table, with a small
/// random jitter so places sharing a centroid don't stack exactly
pub fn locate(query: &str) -> (f64, f64) {
    let query = query.to_lowercase();
    let (lat, lng) = CITY_COORDINATES
        .iter()
        .find(|(city, _, _)| query.contains(city))
        .map(|(_, lat, lng)| (*lat, *lng))
        .unwrap_or(FALLBACK_COORDINATES);

    let mut rng = rand::thread_rng();
    (
        lat + rng.gen_range(-JITTER_DEGREES..=JITTER_DEGREES),
        lng + rng.gen_range(-JITTER_DEGREES..=JITTER_DEGREES),
    )
}

/// Synthesized rating in [4.0, 5.0) for sources that provide none
pub fn placeholder_rating() -> f64 {
    rand::thread_rng().gen_range(4.0..5.0)
}

/// Synthesized price level in [0, 3] for sources that provide none
pub fn placeholder_price_level() -> u8 {
    rand::thread_rng().gen_range(0..=3)
}

/// Resolves a possibly-relative URL against the source's base URL
pub fn resolve_url(base_url: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base = reqwest::Url::parse(base_url).ok()?;
    base.join(href).ok().map(String::from)
}
