//! Route keys and resolved route values.
//!
//! [`RouteKey`] identifies a directional coordinate pair; [`RouteEntry`] is
//! the immutable result of resolving one.

mod entry;
mod key;

pub use entry::{RouteEntry, TransportMode, DEFAULT_ROUTE_TTL};
pub use key::{RouteKey, KEY_PRECISION};

use std::sync::Arc;

/// Sum of the route distances in meters.
pub fn total_distance(routes: &[Arc<RouteEntry>]) -> f64 {
    routes.iter().map(|r| r.distance_meters).sum()
}

/// Sum of the expected travel times in seconds.
pub fn total_travel_time(routes: &[Arc<RouteEntry>]) -> f64 {
    routes.iter().map(|r| r.expected_travel_time_seconds).sum()
}
