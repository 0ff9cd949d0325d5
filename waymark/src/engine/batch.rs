//! Ordered fan-out over consecutive waypoint pairs.

use super::error::RouteFailure;
use super::resolver::RouteResolver;
use crate::coord::Coordinate;
use crate::provider::DirectionsProvider;
use crate::route::RouteEntry;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::debug;

/// Resolves every leg of a waypoint list concurrently.
///
/// Legs are polled together and complete in any order; results come back in
/// waypoint order. Concurrency and spacing of the underlying provider calls
/// are governed by the resolver, not by this type.
pub struct BatchRouteCalculator<P: DirectionsProvider> {
    resolver: Arc<RouteResolver<P>>,
}

impl<P: DirectionsProvider> BatchRouteCalculator<P> {
    pub fn new(resolver: Arc<RouteResolver<P>>) -> Self {
        Self { resolver }
    }

    /// Outcome of each leg `waypoints[i] -> waypoints[i + 1]`, indexed by `i`.
    ///
    /// Fewer than two waypoints yields an empty list without doing any work.
    pub async fn resolve_legs(
        &self,
        waypoints: &[Coordinate],
    ) -> Vec<Result<Arc<RouteEntry>, RouteFailure>> {
        if waypoints.len() < 2 {
            return Vec::new();
        }

        let resolver = &self.resolver;
        let mut pending: FuturesUnordered<_> = waypoints
            .windows(2)
            .enumerate()
            .map(|(index, pair)| {
                let (source, destination) = (pair[0], pair[1]);
                async move { (index, resolver.resolve(source, destination).await) }
            })
            .collect();

        let mut legs: Vec<Option<Result<Arc<RouteEntry>, RouteFailure>>> =
            (0..waypoints.len() - 1).map(|_| None).collect();
        while let Some((index, outcome)) = pending.next().await {
            if let Err(failure) = &outcome {
                debug!(leg = index, error = %failure, "Leg did not resolve");
            }
            legs[index] = Some(outcome);
        }

        legs.into_iter()
            .map(|leg| leg.unwrap_or(Err(RouteFailure::Cancelled)))
            .collect()
    }

    /// Resolved legs in waypoint order, with failed legs left out.
    pub async fn resolve_all(&self, waypoints: &[Coordinate]) -> Vec<Arc<RouteEntry>> {
        self.resolve_legs(waypoints)
            .await
            .into_iter()
            .filter_map(Result::ok)
            .collect()
    }
}

impl<P: DirectionsProvider> Clone for BatchRouteCalculator<P> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
        }
    }
}
