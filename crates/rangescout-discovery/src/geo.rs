//! Great-circle distance and metre/degree conversions.

use rangescout_core::Coordinates;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Approximate length of one degree of latitude in meters.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Lower bound for `cos(lat)` so longitude conversion stays finite at the poles.
const MIN_COS_LAT: f64 = 1e-12;

/// Haversine distance between two points in meters.
#[must_use]
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

#[must_use]
pub fn meters_to_lat_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

#[must_use]
pub fn meters_to_lng_degrees(meters: f64, at_lat: f64) -> f64 {
    let cos_lat = at_lat.to_radians().cos().abs().max(MIN_COS_LAT);
    meters / (METERS_PER_DEGREE * cos_lat)
}

/// Moves `origin` by the given metre offsets (north and east positive).
#[must_use]
pub fn offset(origin: Coordinates, north_meters: f64, east_meters: f64) -> Coordinates {
    Coordinates::wrapped(
        origin.lat + meters_to_lat_degrees(north_meters),
        origin.lng + meters_to_lng_degrees(east_meters, origin.lat),
    )
}
