//! Geographic coordinates and great-circle helpers.
//!
//! Distances use the haversine formula on a spherical Earth, which is what the
//! route engine needs for its distance thresholds. The same formula drives the
//! straight-line geometry produced for airplane legs.

mod types;

pub use types::{CoordError, Coordinate, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;
const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

/// Calculate the great-circle distance between two coordinates.
///
/// # Returns
///
/// Distance in meters.
///
/// # Example
///
/// ```
/// use waymark::coord::{distance_meters, Coordinate};
///
/// let a = Coordinate { lat: 0.0, lon: 0.0 };
/// let b = Coordinate { lat: 1.0, lon: 0.0 };
/// let dist = distance_meters(a, b);
/// assert!((dist - 111_195.0).abs() < 100.0); // 1 degree of latitude
/// ```
pub fn distance_meters(from: Coordinate, to: Coordinate) -> f64 {
    EARTH_RADIUS_M * central_angle(from, to)
}

/// Angular distance between two coordinates in radians.
fn central_angle(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat * DEG_TO_RAD;
    let lat2 = to.lat * DEG_TO_RAD;
    let delta_lat = (to.lat - from.lat) * DEG_TO_RAD;
    let delta_lon = (to.lon - from.lon) * DEG_TO_RAD;

    // Haversine formula
    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    2.0 * a.sqrt().min(1.0).asin()
}

/// Interpolate a point at `fraction` (0.0 to 1.0) along the great circle
/// from `from` to `to`.
pub fn interpolate(from: Coordinate, to: Coordinate, fraction: f64) -> Coordinate {
    let delta = central_angle(from, to);
    if delta < 1e-12 {
        return from;
    }

    let lat1 = from.lat * DEG_TO_RAD;
    let lon1 = from.lon * DEG_TO_RAD;
    let lat2 = to.lat * DEG_TO_RAD;
    let lon2 = to.lon * DEG_TO_RAD;

    let a = ((1.0 - fraction) * delta).sin() / delta.sin();
    let b = (fraction * delta).sin() / delta.sin();

    let x = a * lat1.cos() * lon1.cos() + b * lat2.cos() * lon2.cos();
    let y = a * lat1.cos() * lon1.sin() + b * lat2.cos() * lon2.sin();
    let z = a * lat1.sin() + b * lat2.sin();

    Coordinate {
        lat: z.atan2((x * x + y * y).sqrt()) * RAD_TO_DEG,
        lon: y.atan2(x) * RAD_TO_DEG,
    }
}

/// Build a great-circle polyline from `from` to `to` with points spaced no
/// more than `max_segment_m` apart.
///
/// Always returns at least the two endpoints.
pub fn great_circle_path(from: Coordinate, to: Coordinate, max_segment_m: f64) -> Vec<Coordinate> {
    let distance = distance_meters(from, to);
    let segments = if max_segment_m > 0.0 {
        (distance / max_segment_m).ceil().max(1.0) as usize
    } else {
        1
    };

    let mut points = Vec::with_capacity(segments + 1);
    points.push(from);
    for i in 1..segments {
        points.push(interpolate(from, to, i as f64 / segments as f64));
    }
    points.push(to);
    points
}
