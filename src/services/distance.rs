//! Great-circle distance estimation.

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_MILE: f64 = 1.60934;

/// Haversine distance between two coordinates, in kilometers.
///
/// Total for all finite inputs, symmetric, and zero only for identical
/// points (up to floating-point precision).
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Converts kilometers to miles for display
pub fn km_to_miles(km: f64) -> f64 {
    km / KM_PER_MILE
}
