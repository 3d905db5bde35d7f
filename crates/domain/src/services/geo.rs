//! Great-circle distance on a spherical earth.

use crate::models::Coordinates;

/// Mean earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in meters between two points given in decimal degrees.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).abs().to_radians();
    let d_lambda = (lon2 - lon1).abs().to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_METERS * c
}

/// Distance in meters between two coordinate pairs.
pub fn distance_between(a: Coordinates, b: Coordinates) -> f64 {
    distance_meters(a.latitude, a.longitude, b.latitude, b.longitude)
}
