use crate::models::location::Location;

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Trinidad, Beni. Used whenever the device has not produced a fix.
pub const DEFAULT_LOCATION: Location = Location::new(-14.8333, -64.9);

/// Where a freshly opened order places the courier relative to the customer.
pub const COURIER_START_OFFSET: (f64, f64) = (0.015, -0.015);

pub fn courier_start(customer: &Location) -> Location {
    customer.offset(COURIER_START_OFFSET.0, COURIER_START_OFFSET.1)
}

/// Straight-line distance in coordinate degrees. Only meaningful for the
/// illustrative motion simulation; use `haversine_km` for anything shown as a
/// real distance.
pub fn planar_distance(a: &Location, b: &Location) -> f64 {
    let delta_lat = b.lat - a.lat;
    let delta_lng = b.lng - a.lng;
    (delta_lat * delta_lat + delta_lng * delta_lng).sqrt()
}

pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}
