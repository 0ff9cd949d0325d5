//! Deterministic cache keys for directional coordinate pairs.

use crate::coord::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places kept for each key component (~0.1 m).
pub const KEY_PRECISION: i32 = 6;

/// Key identifying a source -> destination route.
///
/// Built from both coordinates rounded to [`KEY_PRECISION`] decimal places,
/// so coordinates differing only by floating point noise share a key. The key
/// is directional: `a -> b` and `b -> a` are different routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteKey(String);

impl RouteKey {
    /// Derive the key for a source/destination pair.
    ///
    /// # Example
    ///
    /// ```
    /// use waymark::coord::Coordinate;
    /// use waymark::route::RouteKey;
    ///
    /// let a = Coordinate { lat: 31.2304, lon: 121.4737 };
    /// let b = Coordinate { lat: 30.2741, lon: 120.1551 };
    ///
    /// assert_eq!(RouteKey::new(a, b), RouteKey::new(a, b));
    /// assert_ne!(RouteKey::new(a, b), RouteKey::new(b, a));
    /// assert_eq!(RouteKey::new(a, b).as_str(), "31.230400,121.473700->30.274100,120.155100");
    /// ```
    pub fn new(source: Coordinate, destination: Coordinate) -> Self {
        Self(format!(
            "{},{}->{},{}",
            component(source.lat),
            component(source.lon),
            component(destination.lat),
            component(destination.lon)
        ))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Round one component and render it with a fixed number of decimals.
fn component(value: f64) -> String {
    let scale = 10f64.powi(KEY_PRECISION);
    let rounded = (value * scale).round() / scale;
    // -0.0 and 0.0 must produce the same key
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.*}", KEY_PRECISION as usize, rounded)
}
