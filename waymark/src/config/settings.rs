//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Route resolution limits
    pub routing: RoutingSettings,
    /// Route cache settings
    pub cache: CacheSettings,
    /// Directions provider settings
    pub provider: ProviderSettings,
}

/// `[routing]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingSettings {
    /// Maximum concurrent provider calls
    pub max_concurrent_requests: usize,
    /// Minimum spacing between provider call starts, in milliseconds
    pub min_request_interval_ms: u64,
    /// Pairs farther apart than this (straight line) are never requested
    pub max_route_distance_km: f64,
    /// Above this distance the provider is asked for any transport mode
    pub long_distance_threshold_km: f64,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Root directory; routes live in `<directory>/routes/`
    pub directory: PathBuf,
    /// Route time-to-live in days
    pub ttl_days: u64,
}

/// `[provider]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// OSRM server base URL
    pub url: String,
    /// HTTP timeout in seconds
    pub timeout: u64,
}
