//! Resolved route value type.

use crate::coord::{distance_meters, interpolate, Coordinate};
use std::fmt;
use std::time::{Duration, SystemTime};

/// How long a resolved route stays valid (30 days).
pub const DEFAULT_ROUTE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Transport mode a route was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportMode {
    /// Road route by car (default for short and medium legs)
    Automobile,
    /// Pedestrian route
    Walking,
    /// Public transport route
    Transit,
    /// Whatever mode the provider finds (used for long legs)
    Any,
    /// Straight great-circle leg, computed locally
    Airplane,
}

impl TransportMode {
    /// Stable numeric code stored in the persisted cache file.
    pub fn code(&self) -> u32 {
        match self {
            TransportMode::Automobile => 1,
            TransportMode::Walking => 2,
            TransportMode::Transit => 4,
            TransportMode::Any => 0x0FFF_FFFF,
            TransportMode::Airplane => 0x1000_0000,
        }
    }

    /// Inverse of [`TransportMode::code`]. Unknown codes yield `None`.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(TransportMode::Automobile),
            2 => Some(TransportMode::Walking),
            4 => Some(TransportMode::Transit),
            0x0FFF_FFFF => Some(TransportMode::Any),
            0x1000_0000 => Some(TransportMode::Airplane),
            _ => None,
        }
    }

    /// Lowercase name used in logs, config and the CLI.
    pub fn name(&self) -> &'static str {
        match self {
            TransportMode::Automobile => "automobile",
            TransportMode::Walking => "walking",
            TransportMode::Transit => "transit",
            TransportMode::Any => "any",
            TransportMode::Airplane => "airplane",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "automobile" | "car" | "driving" => Ok(TransportMode::Automobile),
            "walking" | "walk" | "foot" => Ok(TransportMode::Walking),
            "transit" => Ok(TransportMode::Transit),
            "any" => Ok(TransportMode::Any),
            "airplane" | "plane" | "flight" => Ok(TransportMode::Airplane),
            other => Err(format!(
                "unknown transport mode '{}' (expected automobile, walking, transit, any or airplane)",
                other
            )),
        }
    }
}

/// One resolved route.
///
/// Created only from a successful provider response (or a locally computed
/// airplane leg) and never mutated afterwards. Shared as `Arc<RouteEntry>`
/// between the memory cache and the persistent store.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    pub source: Coordinate,
    pub destination: Coordinate,
    /// Route length in meters
    pub distance_meters: f64,
    /// Expected travel time in seconds
    pub expected_travel_time_seconds: f64,
    pub transport_mode: TransportMode,
    /// Path geometry, at least two points when valid
    pub polyline: Vec<Coordinate>,
    pub created_at: SystemTime,
}

impl RouteEntry {
    /// Returns true if the entry may still be served at `now`.
    ///
    /// An entry is valid while its age does not exceed `ttl` and its polyline
    /// has at least two points. Entries stamped in the future (clock moved
    /// backwards) count as fresh.
    pub fn is_valid_at(&self, now: SystemTime, ttl: Duration) -> bool {
        if self.polyline.len() < 2 {
            return false;
        }
        match now.duration_since(self.created_at) {
            Ok(age) => age <= ttl,
            Err(_) => true,
        }
    }

    /// Returns true if the entry is older than `ttl` at `now`.
    pub fn is_expired_at(&self, now: SystemTime, ttl: Duration) -> bool {
        !self.is_valid_at(now, ttl)
    }

    /// The point halfway along the polyline, measured by distance rather
    /// than by point index. Used to place distance labels on a route.
    pub fn midpoint(&self) -> Option<Coordinate> {
        match self.polyline.as_slice() {
            [] => None,
            [only] => Some(*only),
            points => {
                let lengths: Vec<f64> = points
                    .windows(2)
                    .map(|pair| distance_meters(pair[0], pair[1]))
                    .collect();
                let half = lengths.iter().sum::<f64>() / 2.0;

                let mut walked = 0.0;
                for (pair, length) in points.windows(2).zip(&lengths) {
                    if walked + length >= half {
                        let fraction = if *length > 0.0 {
                            (half - walked) / length
                        } else {
                            0.0
                        };
                        return Some(interpolate(pair[0], pair[1], fraction));
                    }
                    walked += length;
                }
                points.last().copied()
            }
        }
    }
}
