use crate::marketplace::domain::Coordinates;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Upper bound on any radius search.
pub const MAX_RADIUS_KM: f64 = 500.0;

/// Great-circle distance in kilometres (haversine).
pub fn distance_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn capped_radius(requested: f64) -> f64 {
    requested.min(MAX_RADIUS_KM)
}

pub fn is_valid(coordinates: Coordinates) -> bool {
    coordinates.latitude.is_finite()
        && coordinates.longitude.is_finite()
        && (-90.0..=90.0).contains(&coordinates.latitude)
        && (-180.0..=180.0).contains(&coordinates.longitude)
}
