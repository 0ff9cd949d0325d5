//! Route resolution configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::defaults::*;
use super::settings::ConfigFile;
use crate::cache::route_cache_path;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Tunables for the route resolver.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use waymark::config::RoutingConfig;
///
/// let config = RoutingConfig::new()
///     .with_max_concurrent_requests(2)
///     .with_min_request_interval(Duration::from_millis(250));
/// assert_eq!(config.max_concurrent_requests(), 2);
/// assert_eq!(config.max_route_distance_meters(), 5_000_000.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    max_concurrent_requests: usize,
    min_request_interval: Duration,
    max_route_distance_meters: f64,
    long_distance_threshold_meters: f64,
    route_ttl: Duration,
    cache_directory: PathBuf,
}

impl RoutingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum concurrent provider calls. Default: 5.
    pub fn with_max_concurrent_requests(mut self, n: usize) -> Self {
        self.max_concurrent_requests = n;
        self
    }

    /// Minimum gap between provider call starts. Default: 100 ms.
    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// Straight-line distance above which no route is requested.
    /// Default: 5,000 km.
    pub fn with_max_route_distance_meters(mut self, meters: f64) -> Self {
        self.max_route_distance_meters = meters;
        self
    }

    /// Straight-line distance above which the provider is asked for any
    /// transport mode instead of driving. Default: 1,000 km.
    pub fn with_long_distance_threshold_meters(mut self, meters: f64) -> Self {
        self.long_distance_threshold_meters = meters;
        self
    }

    /// How long a resolved route stays valid. Default: 30 days.
    pub fn with_route_ttl(mut self, ttl: Duration) -> Self {
        self.route_ttl = ttl;
        self
    }

    /// Root directory of the persisted cache.
    pub fn with_cache_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_directory = dir.into();
        self
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
    }

    pub fn min_request_interval(&self) -> Duration {
        self.min_request_interval
    }

    pub fn max_route_distance_meters(&self) -> f64 {
        self.max_route_distance_meters
    }

    pub fn long_distance_threshold_meters(&self) -> f64 {
        self.long_distance_threshold_meters
    }

    pub fn route_ttl(&self) -> Duration {
        self.route_ttl
    }

    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    /// Full path of the persisted route cache file.
    pub fn route_cache_file(&self) -> PathBuf {
        route_cache_path(&self.cache_directory)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self::from(&ConfigFile::default())
    }
}

impl From<&ConfigFile> for RoutingConfig {
    fn from(file: &ConfigFile) -> Self {
        Self {
            max_concurrent_requests: file.routing.max_concurrent_requests,
            min_request_interval: Duration::from_millis(file.routing.min_request_interval_ms),
            max_route_distance_meters: file.routing.max_route_distance_km * 1000.0,
            long_distance_threshold_meters: file.routing.long_distance_threshold_km * 1000.0,
            route_ttl: Duration::from_secs(file.cache.ttl_days.saturating_mul(SECS_PER_DAY)),
            cache_directory: file.cache.directory.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::DEFAULT_ROUTE_TTL;

    #[test]
    fn test_defaults() {
        let config = RoutingConfig::default();
        assert_eq!(config.max_concurrent_requests(), DEFAULT_MAX_CONCURRENT_REQUESTS);
        assert_eq!(config.min_request_interval(), Duration::from_millis(100));
        assert_eq!(config.max_route_distance_meters(), 5_000_000.0);
        assert_eq!(config.long_distance_threshold_meters(), 1_000_000.0);
        assert_eq!(config.route_ttl(), DEFAULT_ROUTE_TTL);
        assert_eq!(config.cache_directory(), default_cache_directory());
    }

    #[test]
    fn test_new_equals_default() {
        assert_eq!(RoutingConfig::new(), RoutingConfig::default());
    }

    #[test]
    fn test_builders_leave_other_fields() {
        let config = RoutingConfig::new().with_route_ttl(Duration::from_secs(60));
        assert_eq!(config.route_ttl(), Duration::from_secs(60));
        assert_eq!(config.max_concurrent_requests(), DEFAULT_MAX_CONCURRENT_REQUESTS);
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.routing.max_route_distance_km = 42.0;
        file.cache.ttl_days = 2;
        file.cache.directory = PathBuf::from("/tmp/wm");

        let config = RoutingConfig::from(&file);
        assert_eq!(config.max_route_distance_meters(), 42_000.0);
        assert_eq!(config.route_ttl(), Duration::from_secs(2 * 24 * 60 * 60));
        assert_eq!(
            config.route_cache_file(),
            PathBuf::from("/tmp/wm/routes/route_cache.json")
        );
    }
}
