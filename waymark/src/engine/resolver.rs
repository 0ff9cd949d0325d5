//! Per-pair route resolution.
//!
//! [`RouteResolver::resolve`] walks a fixed sequence for each ordered pair:
//!
//! 1. failure memo and distance cap (no network)
//! 2. in-memory cache, then the persisted store
//! 3. join an identical in-flight computation, if any
//! 4. concurrency permit, then throttle turn
//! 5. provider call, racing the shutdown token
//! 6. classify the outcome: cache successes, memoize permanent failures
//!
//! The permit is taken before the throttle turn, so throttle grants map
//! one-to-one onto call starts.

use super::coalesce::{wait_for_leader, Registration, RouteCoalescer, RouteOutcome};
use super::error::RouteFailure;
use super::stats::{ResolverStats, ResolverStatsSnapshot};
use crate::cache::{FailureMemo, InMemoryRouteCache, PersistentRouteStore};
use crate::config::RoutingConfig;
use crate::coord::{distance_meters, great_circle_path, Coordinate};
use crate::limiter::{ConcurrencyLimiter, RequestThrottle};
use crate::provider::{DirectionsProvider, ErrorClass, ProviderError, ProviderRoute};
use crate::route::{RouteEntry, RouteKey, TransportMode};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::SystemTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Cruise speed assumed for locally computed flight routes.
pub const FLIGHT_SPEED_KMH: f64 = 800.0;

/// Maximum spacing between polyline points on a flight route.
pub const FLIGHT_SEGMENT_METERS: f64 = 50_000.0;

/// Which cache layer answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLayer {
    Memory,
    Persisted,
}

/// Resolves single source/destination pairs into routes.
pub struct RouteResolver<P: DirectionsProvider> {
    provider: P,
    memory: InMemoryRouteCache,
    store: PersistentRouteStore,
    failures: FailureMemo,
    limiter: ConcurrencyLimiter,
    throttle: RequestThrottle,
    coalescer: RouteCoalescer,
    overrides: DashMap<RouteKey, TransportMode>,
    stats: ResolverStats,
    cancel: CancellationToken,
    max_route_distance_meters: f64,
    long_distance_threshold_meters: f64,
}

impl<P: DirectionsProvider> RouteResolver<P> {
    /// Build a resolver around an opened store.
    ///
    /// The in-memory cache is seeded with everything the store loaded.
    ///
    /// # Panics
    ///
    /// Panics if `config.max_concurrent_requests()` is 0.
    pub fn new(provider: P, store: PersistentRouteStore, config: &RoutingConfig) -> Self {
        let memory = InMemoryRouteCache::new(config.route_ttl());
        memory.seed(store.snapshot());
        debug!(
            provider = provider.name(),
            seeded = memory.len(),
            max_concurrent = config.max_concurrent_requests(),
            "Route resolver ready"
        );

        Self {
            provider,
            memory,
            store,
            failures: FailureMemo::new(),
            limiter: ConcurrencyLimiter::new(config.max_concurrent_requests(), "directions"),
            throttle: RequestThrottle::new(config.min_request_interval()),
            coalescer: RouteCoalescer::new(),
            overrides: DashMap::new(),
            stats: ResolverStats::new(),
            cancel: CancellationToken::new(),
            max_route_distance_meters: config.max_route_distance_meters(),
            long_distance_threshold_meters: config.long_distance_threshold_meters(),
        }
    }

    /// Resolve the route from `source` to `destination`.
    pub async fn resolve(
        &self,
        source: Coordinate,
        destination: Coordinate,
    ) -> Result<Arc<RouteEntry>, RouteFailure> {
        self.stats.record_request();
        let key = RouteKey::new(source, destination);
        let distance = distance_meters(source, destination);
        let mode_override = self.overrides.get(&key).map(|mode| *mode);

        if self.failures.contains(&key) {
            self.stats.record_known_unroutable();
            debug!(key = %key, "Skipping known unroutable pair");
            return Err(RouteFailure::KnownUnroutable);
        }

        if mode_override != Some(TransportMode::Airplane)
            && distance > self.max_route_distance_meters
        {
            self.failures.mark(key.clone());
            self.stats.record_too_far();
            debug!(key = %key, distance_m = distance, "Pair beyond routable distance");
            return Err(RouteFailure::TooFar {
                distance_meters: distance,
            });
        }

        if let Some(entry) = self.lookup_cached(&key) {
            return Ok(entry);
        }

        if mode_override == Some(TransportMode::Airplane) {
            return Ok(self.resolve_flight(key, source, destination, distance));
        }

        let leader = loop {
            match self.coalescer.register(&key) {
                Registration::Leader(guard) => break guard,
                Registration::Follower(rx) => {
                    self.stats.record_coalesced();
                    if let Some(outcome) = wait_for_leader(rx).await {
                        return outcome;
                    }
                    debug!(key = %key, "Coalesced leader abandoned, retrying");
                }
            }
        };

        // A previous leader may have finished between our cache check and
        // registration.
        if let Some(entry) = self.memory.get(&key) {
            self.stats.record_memory_hit();
            leader.complete(Ok(Arc::clone(&entry)));
            return Ok(entry);
        }
        if self.failures.contains(&key) {
            self.stats.record_known_unroutable();
            leader.complete(Err(RouteFailure::KnownUnroutable));
            return Err(RouteFailure::KnownUnroutable);
        }

        let mode = mode_override.unwrap_or(if distance > self.long_distance_threshold_meters {
            TransportMode::Any
        } else {
            TransportMode::Automobile
        });

        let outcome = self
            .compute(key, source, destination, mode, mode_override)
            .await;
        leader.complete(outcome.clone());
        outcome
    }

    /// Cached route for the pair without touching the network.
    pub fn peek_cached(&self, source: Coordinate, destination: Coordinate) -> Option<Arc<RouteEntry>> {
        self.find_cached(&RouteKey::new(source, destination))
            .map(|(entry, _)| entry)
    }

    fn lookup_cached(&self, key: &RouteKey) -> Option<Arc<RouteEntry>> {
        let (entry, layer) = self.find_cached(key)?;
        match layer {
            CacheLayer::Memory => self.stats.record_memory_hit(),
            CacheLayer::Persisted => self.stats.record_persisted_hit(),
        }
        debug!(key = %key, layer = ?layer, "Route cache hit");
        Some(entry)
    }

    fn find_cached(&self, key: &RouteKey) -> Option<(Arc<RouteEntry>, CacheLayer)> {
        let now = SystemTime::now();
        if let Some(entry) = self.memory.get_at(key, now) {
            return Some((entry, CacheLayer::Memory));
        }

        let entry = self.store.get(key)?;
        if entry.is_valid_at(now, self.store.ttl()) {
            self.memory.put(key.clone(), Arc::clone(&entry));
            Some((entry, CacheLayer::Persisted))
        } else {
            debug!(key = %key, "Dropping expired persisted route");
            self.store.remove(key);
            None
        }
    }

    async fn compute(
        &self,
        key: RouteKey,
        source: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        requested: Option<TransportMode>,
    ) -> RouteOutcome {
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ProviderError::Cancelled),
            result = self.call_provider(source, destination, mode) => result,
        };

        match result {
            Ok(routes) => match usable_route(routes) {
                Some(route) => Ok(self.store_route(key, source, destination, mode, requested, route)),
                None => {
                    self.memoize_failure(&key, requested);
                    self.stats.record_no_route();
                    info!(key = %key, "Provider returned no usable route");
                    Err(RouteFailure::NoRoute("no usable route in response".to_string()))
                }
            },
            Err(e) => match e.class() {
                ErrorClass::Cancelled => {
                    self.stats.record_cancelled();
                    debug!(key = %key, "Route computation cancelled");
                    Err(RouteFailure::Cancelled)
                }
                ErrorClass::Unroutable => {
                    self.memoize_failure(&key, requested);
                    self.stats.record_no_route();
                    info!(key = %key, error = %e, "Pair is unroutable");
                    Err(RouteFailure::NoRoute(e.to_string()))
                }
                ErrorClass::Transient => {
                    self.stats.record_transient();
                    warn!(key = %key, error = %e, "Route computation failed");
                    Err(RouteFailure::Transient(e))
                }
            },
        }
    }

    async fn call_provider(
        &self,
        source: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> Result<Vec<ProviderRoute>, ProviderError> {
        let Some(_permit) = self.limiter.acquire().await else {
            return Err(ProviderError::Cancelled);
        };
        self.throttle.wait_turn().await;
        self.stats.record_provider_call();
        self.provider.compute_route(source, destination, mode).await
    }

    fn store_route(
        &self,
        key: RouteKey,
        source: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        requested: Option<TransportMode>,
        route: ProviderRoute,
    ) -> Arc<RouteEntry> {
        let entry = Arc::new(RouteEntry {
            source,
            destination,
            distance_meters: route.distance_meters,
            expected_travel_time_seconds: route.expected_travel_time_seconds,
            transport_mode: mode,
            polyline: route.polyline,
            created_at: SystemTime::now(),
        });
        info!(
            key = %key,
            provider = self.provider.name(),
            mode = %mode,
            distance_m = entry.distance_meters,
            points = entry.polyline.len(),
            "Route computed"
        );
        if self.override_unchanged(&key, requested) {
            self.memory.put(key.clone(), Arc::clone(&entry));
            self.store.insert(key, Arc::clone(&entry));
        } else {
            debug!(key = %key, "Transport override changed during computation, route not cached");
        }
        self.stats.record_success();
        entry
    }

    fn memoize_failure(&self, key: &RouteKey, requested: Option<TransportMode>) {
        if self.override_unchanged(key, requested) {
            self.failures.mark(key.clone());
        }
    }

    /// Whether the pair's override is still the one a computation started with.
    fn override_unchanged(&self, key: &RouteKey, requested: Option<TransportMode>) -> bool {
        self.overrides.get(key).map(|mode| *mode) == requested
    }

    fn resolve_flight(
        &self,
        key: RouteKey,
        source: Coordinate,
        destination: Coordinate,
        distance: f64,
    ) -> Arc<RouteEntry> {
        let entry = Arc::new(RouteEntry {
            source,
            destination,
            distance_meters: distance,
            expected_travel_time_seconds: distance / (FLIGHT_SPEED_KMH / 3.6),
            transport_mode: TransportMode::Airplane,
            polyline: great_circle_path(source, destination, FLIGHT_SEGMENT_METERS),
            created_at: SystemTime::now(),
        });
        debug!(key = %key, distance_m = distance, "Flight route computed locally");
        // Memory only: the override that produced it does not survive a restart
        self.memory.put(key, Arc::clone(&entry));
        self.stats.record_success();
        entry
    }

    /// Force a transport mode for one ordered pair.
    ///
    /// Changing the mode evicts the pair's cached route and forgets a
    /// memoized failure so the next resolution uses the new mode.
    pub fn set_transport_mode(&self, source: Coordinate, destination: Coordinate, mode: TransportMode) {
        let key = RouteKey::new(source, destination);
        if self.overrides.insert(key.clone(), mode) != Some(mode) {
            self.invalidate(&key);
        }
    }

    /// Remove a transport override, returning the previous mode.
    pub fn clear_transport_mode(&self, source: Coordinate, destination: Coordinate) -> Option<TransportMode> {
        let key = RouteKey::new(source, destination);
        let (_, previous) = self.overrides.remove(&key)?;
        self.invalidate(&key);
        Some(previous)
    }

    pub fn transport_mode(&self, source: Coordinate, destination: Coordinate) -> Option<TransportMode> {
        self.overrides
            .get(&RouteKey::new(source, destination))
            .map(|mode| *mode)
    }

    fn invalidate(&self, key: &RouteKey) {
        self.memory.remove(key);
        self.store.remove(key);
        self.failures.forget(key);
        debug!(key = %key, "Invalidated cached route");
    }

    /// Drop every cached route and memoized failure.
    pub fn clear_cache(&self) {
        self.memory.clear();
        self.store.clear();
        self.failures.clear();
        info!(path = %self.store.path().display(), "Route cache cleared");
    }

    /// Drop expired routes from memory and disk. Returns the number of
    /// persisted entries removed.
    pub fn prune_expired(&self) -> usize {
        let now = SystemTime::now();
        self.memory.prune_expired(now);
        let removed = self.store.prune_expired(now);
        if removed > 0 {
            info!(removed, "Pruned expired routes");
        }
        removed
    }

    /// Wait for pending store writes to land.
    pub async fn flush(&self) {
        self.store.flush().await;
    }

    /// Cancel in-flight provider calls, refuse new ones, and flush the store.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.limiter.close();
        self.store.flush().await;
        info!(stats = ?self.stats.snapshot(), "Route resolver shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn stats(&self) -> ResolverStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    pub fn store(&self) -> &PersistentRouteStore {
        &self.store
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn in_flight_count(&self) -> usize {
        self.coalescer.in_flight_count()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// First route with a drawable polyline.
fn usable_route(routes: Vec<ProviderRoute>) -> Option<ProviderRoute> {
    routes.into_iter().next().filter(|route| route.polyline.len() >= 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RouteFile;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Provider returning one fixed answer and counting calls.
    struct FixedProvider {
        answer: Result<Vec<ProviderRoute>, ProviderError>,
        delay: Duration,
        calls: AtomicUsize,
        modes: Mutex<Vec<TransportMode>>,
    }

    impl FixedProvider {
        fn new(answer: Result<Vec<ProviderRoute>, ProviderError>) -> Self {
            Self {
                answer,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                modes: Mutex::new(Vec::new()),
            }
        }

        fn straight() -> Self {
            Self::new(Ok(vec![ProviderRoute {
                distance_meters: 12_000.0,
                expected_travel_time_seconds: 900.0,
                polyline: vec![a(), b()],
            }]))
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl DirectionsProvider for FixedProvider {
        async fn compute_route(
            &self,
            _source: Coordinate,
            _destination: Coordinate,
            mode: TransportMode,
        ) -> Result<Vec<ProviderRoute>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.modes.lock().unwrap().push(mode);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer.clone()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn a() -> Coordinate {
        Coordinate { lat: 48.8566, lon: 2.3522 }
    }

    fn b() -> Coordinate {
        Coordinate { lat: 48.9, lon: 2.45 }
    }

    fn resolver(dir: &TempDir, provider: FixedProvider) -> RouteResolver<FixedProvider> {
        let config = RoutingConfig::new()
            .with_cache_directory(dir.path())
            .with_min_request_interval(Duration::ZERO);
        let store = PersistentRouteStore::open(RouteFile::new(
            config.route_cache_file(),
            config.route_ttl(),
        ));
        RouteResolver::new(provider, store, &config)
    }

    #[tokio::test]
    async fn test_success_is_cached() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::straight());

        let first = resolver.resolve(a(), b()).await.unwrap();
        let second = resolver.resolve(a(), b()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.transport_mode, TransportMode::Automobile);

        let stats = resolver.stats();
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.memory_hits, 1);
        assert_eq!(stats.successes, 1);
    }

    #[tokio::test]
    async fn test_no_route_memoized() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(
            &dir,
            FixedProvider::new(Err(ProviderError::NoRoute("water".into()))),
        );

        let err = resolver.resolve(a(), b()).await.unwrap_err();
        assert!(matches!(err, RouteFailure::NoRoute(_)));
        let err = resolver.resolve(a(), b()).await.unwrap_err();
        assert_eq!(err, RouteFailure::KnownUnroutable);
        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_response_memoized() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::new(Ok(Vec::new())));

        assert!(matches!(
            resolver.resolve(a(), b()).await,
            Err(RouteFailure::NoRoute(_))
        ));
        assert_eq!(resolver.failure_count(), 1);
    }

    #[tokio::test]
    async fn test_single_point_polyline_is_no_route() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(
            &dir,
            FixedProvider::new(Ok(vec![ProviderRoute {
                distance_meters: 0.0,
                expected_travel_time_seconds: 0.0,
                polyline: vec![a()],
            }])),
        );

        assert!(matches!(
            resolver.resolve(a(), b()).await,
            Err(RouteFailure::NoRoute(_))
        ));
        assert!(resolver.peek_cached(a(), b()).is_none());
    }

    #[tokio::test]
    async fn test_transient_not_memoized() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::new(Err(ProviderError::RateLimited)));

        for _ in 0..2 {
            assert_eq!(
                resolver.resolve(a(), b()).await,
                Err(RouteFailure::Transient(ProviderError::RateLimited))
            );
        }
        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_too_far_short_circuits() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::straight());
        let sydney = Coordinate { lat: -33.8688, lon: 151.2093 };

        let err = resolver.resolve(a(), sydney).await.unwrap_err();
        assert!(matches!(err, RouteFailure::TooFar { distance_meters } if distance_meters > 5_000_000.0));
        assert_eq!(
            resolver.resolve(a(), sydney).await,
            Err(RouteFailure::KnownUnroutable)
        );
        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_long_distance_requests_any_mode() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::straight());
        let madrid = Coordinate { lat: 40.4168, lon: -3.7038 };

        resolver.resolve(a(), madrid).await.unwrap();
        assert_eq!(*resolver.provider().modes.lock().unwrap(), vec![TransportMode::Any]);
    }

    #[tokio::test]
    async fn test_airplane_override_resolves_locally() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::straight());
        let sydney = Coordinate { lat: -33.8688, lon: 151.2093 };

        resolver.set_transport_mode(a(), sydney, TransportMode::Airplane);
        let route = resolver.resolve(a(), sydney).await.unwrap();

        assert_eq!(route.transport_mode, TransportMode::Airplane);
        assert!(route.polyline.len() > 100);
        let hours = route.expected_travel_time_seconds / 3600.0;
        assert!((hours - route.distance_meters / 800_000.0).abs() < 1e-6);
        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 0);

        // Served from memory, never written to disk
        assert!(resolver.peek_cached(a(), sydney).is_some());
        assert!(resolver.store().is_empty());
    }

    #[tokio::test]
    async fn test_override_change_invalidates() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::straight());

        resolver.resolve(a(), b()).await.unwrap();
        resolver.set_transport_mode(a(), b(), TransportMode::Walking);
        assert!(resolver.peek_cached(a(), b()).is_none());
        assert_eq!(resolver.transport_mode(a(), b()), Some(TransportMode::Walking));

        let walked = resolver.resolve(a(), b()).await.unwrap();
        assert_eq!(walked.transport_mode, TransportMode::Walking);
        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 2);

        assert_eq!(resolver.clear_transport_mode(a(), b()), Some(TransportMode::Walking));
        assert!(resolver.peek_cached(a(), b()).is_none());
        assert_eq!(resolver.clear_transport_mode(a(), b()), None);
    }

    #[tokio::test]
    async fn test_override_forgets_memoized_failure() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(
            &dir,
            FixedProvider::new(Err(ProviderError::UnsupportedMode(TransportMode::Transit))),
        );

        resolver.set_transport_mode(a(), b(), TransportMode::Transit);
        assert!(resolver.resolve(a(), b()).await.is_err());
        assert_eq!(resolver.failure_count(), 1);

        resolver.set_transport_mode(a(), b(), TransportMode::Airplane);
        assert_eq!(resolver.failure_count(), 0);
        assert!(resolver.resolve(a(), b()).await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_and_refuses() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::straight());

        resolver.shutdown().await;
        assert!(resolver.is_shut_down());
        assert_eq!(resolver.resolve(a(), b()).await, Err(RouteFailure::Cancelled));
        // Cancellation is not memoized
        assert_eq!(resolver.failure_count(), 0);
        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clear_and_prune() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::straight());

        resolver.resolve(a(), b()).await.unwrap();
        assert_eq!(resolver.prune_expired(), 0);
        assert_eq!(resolver.store().len(), 1);

        resolver.clear_cache();
        assert_eq!(resolver.memory_len(), 0);
        assert!(resolver.store().is_empty());
        assert!(resolver.peek_cached(a(), b()).is_none());
    }

    fn entry_aged(age: Duration) -> Arc<RouteEntry> {
        Arc::new(RouteEntry {
            source: a(),
            destination: b(),
            distance_meters: 12_500.0,
            expected_travel_time_seconds: 950.0,
            transport_mode: TransportMode::Automobile,
            polyline: vec![a(), b()],
            created_at: SystemTime::now() - age,
        })
    }

    #[tokio::test]
    async fn test_persisted_entry_promoted_to_memory() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::straight());
        let stored = entry_aged(Duration::from_secs(3_600));
        resolver.store().insert(RouteKey::new(a(), b()), Arc::clone(&stored));
        assert_eq!(resolver.memory_len(), 0);

        let route = resolver.resolve(a(), b()).await.unwrap();
        assert!(Arc::ptr_eq(&route, &stored));
        assert_eq!(resolver.memory_len(), 1);
        assert_eq!(resolver.stats().persisted_hits, 1);

        resolver.resolve(a(), b()).await.unwrap();
        let stats = resolver.stats();
        assert_eq!(stats.memory_hits, 1);
        assert_eq!(stats.persisted_hits, 1);
        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_persisted_entry_expired_at_lookup_is_replaced() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::straight());
        let key = RouteKey::new(a(), b());
        let stale = entry_aged(Duration::from_secs(40 * 86_400));
        resolver.store().insert(key.clone(), Arc::clone(&stale));

        let fresh = resolver.resolve(a(), b()).await.unwrap();

        assert!(!Arc::ptr_eq(&fresh, &stale));
        assert!(fresh.is_valid_at(SystemTime::now(), crate::route::DEFAULT_ROUTE_TTL));
        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.stats().persisted_hits, 0);
        assert!(Arc::ptr_eq(&resolver.store().get(&key).unwrap(), &fresh));
    }

    #[tokio::test]
    async fn test_peek_purges_expired_persisted_entry() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, FixedProvider::straight());
        resolver
            .store()
            .insert(RouteKey::new(a(), b()), entry_aged(Duration::from_secs(40 * 86_400)));

        assert!(resolver.peek_cached(a(), b()).is_none());
        assert!(resolver.store().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_caller_does_not_fail_waiting_caller() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(
            &dir,
            FixedProvider::straight().with_delay(Duration::from_millis(500)),
        );

        let (impatient, patient) = tokio::join!(
            tokio::time::timeout(Duration::from_millis(100), resolver.resolve(a(), b())),
            resolver.resolve(a(), b()),
        );

        assert!(impatient.is_err());
        let route = patient.unwrap();
        assert_eq!(route.transport_mode, TransportMode::Automobile);
        assert_eq!(resolver.provider().calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.stats().coalesced, 1);
        assert_eq!(resolver.in_flight_count(), 0);
        assert!(resolver.peek_cached(a(), b()).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_override_change_mid_call_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let resolver = Arc::new(resolver(
            &dir,
            FixedProvider::straight().with_delay(Duration::from_millis(500)),
        ));

        let task = {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.resolve(a(), b()).await })
        };
        while resolver.provider().calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        resolver.set_transport_mode(a(), b(), TransportMode::Walking);

        let route = task.await.unwrap().unwrap();
        assert_eq!(route.transport_mode, TransportMode::Automobile);
        assert!(resolver.peek_cached(a(), b()).is_none());
        assert!(resolver.store().is_empty());

        let walked = resolver.resolve(a(), b()).await.unwrap();
        assert_eq!(walked.transport_mode, TransportMode::Walking);
    }
}
