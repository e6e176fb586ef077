//! Great-circle distance and impossible-travel detection

use crate::profile::GeoLocation;

/// Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Maximum plausible travel speed between observations (km/h)
pub const MAX_TRAVEL_SPEED_KMH: f64 = 900.0;

/// Approximate distance between two geographic points in kilometers,
/// using the Haversine formula.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Whether consecutive observations imply travel faster than
/// [`MAX_TRAVEL_SPEED_KMH`].
///
/// Pairs missing coordinates or separated by zero time are skipped.
pub fn detect_impossible_travel(locations: &[GeoLocation]) -> bool {
    if locations.len() < 2 {
        return false;
    }

    for pair in locations.windows(2) {
        let (current, previous) = (&pair[0], &pair[1]);

        let (Some(lat1), Some(lon1), Some(lat2), Some(lon2)) = (
            current.latitude,
            current.longitude,
            previous.latitude,
            previous.longitude,
        ) else {
            continue;
        };

        let distance_km = haversine_km(lat1, lon1, lat2, lon2);

        let time_diff_hours =
            (current.timestamp - previous.timestamp).num_seconds().abs() as f64 / 3600.0;

        if time_diff_hours == 0.0 {
            continue;
        }

        if distance_km / time_diff_hours > MAX_TRAVEL_SPEED_KMH {
            return true;
        }
    }

    false
}
