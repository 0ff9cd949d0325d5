//! Construction of [`RouteService`].

use super::error::ServiceError;
use super::facade::RouteService;
use crate::cache::{PersistentRouteStore, RouteFile};
use crate::config::{ConfigFile, RoutingConfig};
use crate::engine::RouteResolver;
use crate::provider::{AsyncReqwestClient, DirectionsProvider, OsrmProvider};
use std::sync::Arc;
use tracing::info;

/// Builds a [`RouteService`] from a provider and a [`RoutingConfig`].
///
/// Opening the store reads and sweeps the cache file, so call
/// [`build`](Self::build) from inside a Tokio runtime to get background
/// persistence.
///
/// # Example
///
/// ```no_run
/// use waymark::config::RoutingConfig;
/// use waymark::provider::{AsyncReqwestClient, OsrmProvider};
/// use waymark::service::RouteServiceBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = OsrmProvider::new(AsyncReqwestClient::new()?);
/// let service = RouteServiceBuilder::new(provider)
///     .config(RoutingConfig::new().with_max_concurrent_requests(3))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct RouteServiceBuilder<P: DirectionsProvider> {
    provider: P,
    config: RoutingConfig,
}

impl<P: DirectionsProvider> RouteServiceBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: RoutingConfig::default(),
        }
    }

    pub fn config(mut self, config: RoutingConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration, open the store, and assemble the service.
    pub fn build(self) -> Result<RouteService<P>, ServiceError> {
        validate(&self.config)?;

        let file = RouteFile::new(self.config.route_cache_file(), self.config.route_ttl());
        let store = PersistentRouteStore::open(file);
        info!(
            path = %store.path().display(),
            routes = store.len(),
            provider = self.provider.name(),
            "Route service starting"
        );

        let resolver = RouteResolver::new(self.provider, store, &self.config);
        Ok(RouteService::new(Arc::new(resolver)))
    }
}

fn validate(config: &RoutingConfig) -> Result<(), ServiceError> {
    if config.max_concurrent_requests() == 0 {
        return Err(ServiceError::ConfigError(
            "max_concurrent_requests must be at least 1".to_string(),
        ));
    }
    for (name, value) in [
        ("max_route_distance", config.max_route_distance_meters()),
        ("long_distance_threshold", config.long_distance_threshold_meters()),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(ServiceError::ConfigError(format!(
                "{} must be a positive distance, got {}",
                name, value
            )));
        }
    }
    if config.route_ttl().is_zero() {
        return Err(ServiceError::ConfigError("route TTL must be non-zero".to_string()));
    }
    Ok(())
}

/// Service type backed by the bundled OSRM provider.
pub type OsrmRouteService = RouteService<OsrmProvider<AsyncReqwestClient>>;

/// Build an OSRM-backed service from a loaded config file.
pub fn osrm_service(file: &ConfigFile) -> Result<OsrmRouteService, ServiceError> {
    let client = AsyncReqwestClient::with_timeout(file.provider.timeout)?;
    let provider = OsrmProvider::with_base_url(client, file.provider.url.clone());
    RouteServiceBuilder::new(provider)
        .config(RoutingConfig::from(file))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::provider::{ProviderError, ProviderRoute};
    use crate::route::TransportMode;
    use std::time::Duration;
    use tempfile::TempDir;

    struct NullProvider;

    impl DirectionsProvider for NullProvider {
        async fn compute_route(
            &self,
            _source: Coordinate,
            _destination: Coordinate,
            _mode: TransportMode,
        ) -> Result<Vec<ProviderRoute>, ProviderError> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let dir = TempDir::new().unwrap();
        let result = RouteServiceBuilder::new(NullProvider)
            .config(
                RoutingConfig::new()
                    .with_cache_directory(dir.path())
                    .with_max_concurrent_requests(0),
            )
            .build();
        assert!(matches!(result, Err(ServiceError::ConfigError(_))));
    }

    #[test]
    fn test_bad_distance_rejected() {
        let dir = TempDir::new().unwrap();
        let result = RouteServiceBuilder::new(NullProvider)
            .config(
                RoutingConfig::new()
                    .with_cache_directory(dir.path())
                    .with_max_route_distance_meters(f64::NAN),
            )
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let dir = TempDir::new().unwrap();
        let result = RouteServiceBuilder::new(NullProvider)
            .config(
                RoutingConfig::new()
                    .with_cache_directory(dir.path())
                    .with_route_ttl(Duration::ZERO),
            )
            .build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_osrm_service_from_config_file() {
        let dir = TempDir::new().unwrap();
        let mut file = ConfigFile::default();
        file.cache.directory = dir.path().to_path_buf();
        file.provider.url = "http://localhost:5000".to_string();

        let service = osrm_service(&file).unwrap();
        assert_eq!(
            service.cache_path(),
            dir.path().join("routes").join("route_cache.json")
        );
    }
}
