//! Geodesy helpers.

use std::f64::consts::PI;

/// Earth radius in kilometers for haversine calculations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the great-circle distance between two points using the haversine formula.
///
/// Returns distance in kilometers.
#[must_use]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1 * PI / 180.0;
    let lat2_rad = lat2 * PI / 180.0;
    let delta_lat = (lat2 - lat1) * PI / 180.0;
    let delta_lon = (lon2 - lon1) * PI / 180.0;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Straight-line distance from a surface point to a hypocenter `depth_km` below
/// a point `surface_km` away.
#[must_use]
pub fn hypocentral_distance(surface_km: f64, depth_km: f64) -> f64 {
    surface_km.hypot(depth_km)
}
