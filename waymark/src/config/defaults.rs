//! Default values and constants for all configuration settings.

use std::path::PathBuf;

use super::settings::*;
use crate::limiter::{DEFAULT_MAX_CONCURRENT, DEFAULT_MIN_INTERVAL};
use crate::provider::{DEFAULT_OSRM_URL, DEFAULT_TIMEOUT_SECS};

pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = DEFAULT_MAX_CONCURRENT;
pub const DEFAULT_MIN_REQUEST_INTERVAL_MS: u64 = DEFAULT_MIN_INTERVAL.as_millis() as u64;

/// Straight-line distance above which no route is requested.
pub const DEFAULT_MAX_ROUTE_DISTANCE_KM: f64 = 5_000.0;

/// Straight-line distance above which any transport mode is accepted.
pub const DEFAULT_LONG_DISTANCE_THRESHOLD_KM: f64 = 1_000.0;

pub const DEFAULT_ROUTE_TTL_DAYS: u64 = 30;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT_SECS;

/// Default cache root: the platform data directory, which cache cleaners
/// leave alone (`~/.local/share/waymark` on Linux).
pub fn default_cache_directory() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("waymark")
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            routing: RoutingSettings {
                max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
                min_request_interval_ms: DEFAULT_MIN_REQUEST_INTERVAL_MS,
                max_route_distance_km: DEFAULT_MAX_ROUTE_DISTANCE_KM,
                long_distance_threshold_km: DEFAULT_LONG_DISTANCE_THRESHOLD_KM,
            },
            cache: CacheSettings {
                directory: default_cache_directory(),
                ttl_days: DEFAULT_ROUTE_TTL_DAYS,
            },
            provider: ProviderSettings {
                url: DEFAULT_OSRM_URL.to_string(),
                timeout: DEFAULT_PROVIDER_TIMEOUT_SECS,
            },
        }
    }
}
