//! Caller-facing route API.

use crate::coord::Coordinate;
use crate::engine::{BatchRouteCalculator, ResolverStatsSnapshot, RouteFailure, RouteResolver};
use crate::provider::DirectionsProvider;
use crate::route::{RouteEntry, TransportMode};
use std::path::Path;
use std::sync::Arc;

/// Route resolution with caching, concurrency control and failure memo.
///
/// Cheap to clone; clones share the same caches and limits. Build one with
/// [`RouteServiceBuilder`](super::RouteServiceBuilder).
pub struct RouteService<P: DirectionsProvider> {
    resolver: Arc<RouteResolver<P>>,
    batch: BatchRouteCalculator<P>,
}

/// Sizes and counters for a running service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceStats {
    pub resolver: ResolverStatsSnapshot,
    pub memory_entries: usize,
    pub persisted_entries: usize,
    pub unroutable_pairs: usize,
    pub in_flight_keys: usize,
    pub peak_concurrent_calls: usize,
    pub max_concurrent_calls: usize,
}

impl<P: DirectionsProvider> RouteService<P> {
    pub(super) fn new(resolver: Arc<RouteResolver<P>>) -> Self {
        Self {
            batch: BatchRouteCalculator::new(Arc::clone(&resolver)),
            resolver,
        }
    }

    /// Route from `source` to `destination`, or `None` if there is none.
    ///
    /// Served from cache when possible. Unroutable, too distant, cancelled
    /// and transiently failed pairs all yield `None`.
    pub async fn resolve_route(
        &self,
        source: Coordinate,
        destination: Coordinate,
    ) -> Option<Arc<RouteEntry>> {
        self.resolver.resolve(source, destination).await.ok()
    }

    /// Like [`resolve_route`](Self::resolve_route), keeping the failure reason.
    pub async fn try_resolve_route(
        &self,
        source: Coordinate,
        destination: Coordinate,
    ) -> Result<Arc<RouteEntry>, RouteFailure> {
        self.resolver.resolve(source, destination).await
    }

    /// Routes for every consecutive pair of `waypoints`, in order, with
    /// failed legs omitted.
    pub async fn resolve_routes(&self, waypoints: &[Coordinate]) -> Vec<Arc<RouteEntry>> {
        self.batch.resolve_all(waypoints).await
    }

    /// Per-leg outcomes for `waypoints`, index-aligned with the legs.
    pub async fn resolve_legs(
        &self,
        waypoints: &[Coordinate],
    ) -> Vec<Result<Arc<RouteEntry>, RouteFailure>> {
        self.batch.resolve_legs(waypoints).await
    }

    /// Cached route for the pair, if any. Never touches the network.
    pub fn peek_cached(&self, source: Coordinate, destination: Coordinate) -> Option<Arc<RouteEntry>> {
        self.resolver.peek_cached(source, destination)
    }

    /// Force `mode` for the ordered pair. See
    /// [`RouteResolver::set_transport_mode`].
    pub fn set_transport_mode(&self, source: Coordinate, destination: Coordinate, mode: TransportMode) {
        self.resolver.set_transport_mode(source, destination, mode);
    }

    pub fn transport_mode(&self, source: Coordinate, destination: Coordinate) -> Option<TransportMode> {
        self.resolver.transport_mode(source, destination)
    }

    pub fn clear_transport_mode(&self, source: Coordinate, destination: Coordinate) -> Option<TransportMode> {
        self.resolver.clear_transport_mode(source, destination)
    }

    /// Drop all cached routes (memory and disk) and memoized failures.
    pub fn clear_cache(&self) {
        self.resolver.clear_cache();
    }

    /// Drop expired routes. Returns the number of persisted entries removed.
    pub fn prune_expired(&self) -> usize {
        self.resolver.prune_expired()
    }

    /// Wait until pending cache writes are on disk.
    pub async fn flush(&self) {
        self.resolver.flush().await;
    }

    /// Cancel in-flight requests and flush the cache. Later lookups are
    /// answered from cache only.
    pub async fn shutdown(&self) {
        self.resolver.shutdown().await;
    }

    pub fn stats(&self) -> ServiceStats {
        let limiter = self.resolver.limiter();
        ServiceStats {
            resolver: self.resolver.stats(),
            memory_entries: self.resolver.memory_len(),
            persisted_entries: self.resolver.store().len(),
            unroutable_pairs: self.resolver.failure_count(),
            in_flight_keys: self.resolver.in_flight_count(),
            peak_concurrent_calls: limiter.peak_in_flight(),
            max_concurrent_calls: limiter.max_concurrent(),
        }
    }

    /// Path of the persisted route cache file.
    pub fn cache_path(&self) -> &Path {
        self.resolver.store().path()
    }

    pub fn provider(&self) -> &P {
        self.resolver.provider()
    }
}

impl<P: DirectionsProvider> Clone for RouteService<P> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            batch: self.batch.clone(),
        }
    }
}
