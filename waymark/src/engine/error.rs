//! Failure outcomes of a route resolution.

use crate::provider::ProviderError;
use thiserror::Error;

/// Why a pair did not resolve to a route.
///
/// Permanent failures are recorded in the failure memo and answered locally
/// from then on; the rest may succeed on a later attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteFailure {
    /// The pair was previously found to be unroutable
    #[error("Route is known to be unroutable")]
    KnownUnroutable,

    /// Straight-line distance exceeds the routable maximum
    #[error("Endpoints are {:.0} km apart, beyond the routable maximum", .distance_meters / 1000.0)]
    TooFar { distance_meters: f64 },

    /// Provider confirmed there is no route
    #[error("No route: {0}")]
    NoRoute(String),

    /// Computation was cancelled before a result was available
    #[error("Route computation cancelled")]
    Cancelled,

    /// Provider failed in a way that may not repeat
    #[error("Directions provider failed: {0}")]
    Transient(#[source] ProviderError),
}

impl RouteFailure {
    /// Whether this outcome is memoized and never retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            RouteFailure::KnownUnroutable | RouteFailure::TooFar { .. } | RouteFailure::NoRoute(_)
        )
    }
}
