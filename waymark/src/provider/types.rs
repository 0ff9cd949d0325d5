//! Directions provider types and traits

use crate::coord::Coordinate;
use crate::route::TransportMode;
use std::future::Future;
use thiserror::Error;

/// How the resolver treats a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The call was abandoned; retry later, do not memoize.
    Cancelled,
    /// The pair can never be routed; memoize.
    Unroutable,
    /// Anything else; retry on the next request.
    Transient,
}

/// Errors that can occur while asking a provider for directions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Transport failure or unexpected HTTP status
    #[error("HTTP error: {0}")]
    Http(String),

    /// Provider asked us to slow down (HTTP 429)
    #[error("Rate limited by directions provider")]
    RateLimited,

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider refused the request for a reason that may not repeat
    #[error("Request rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    /// Provider found no route between the points
    #[error("No route found: {0}")]
    NoRoute(String),

    /// An endpoint cannot be snapped to the routing network
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Provider does not route this transport mode
    #[error("Transport mode {0} not supported by provider")]
    UnsupportedMode(TransportMode),

    /// Request was cancelled before completion
    #[error("Request cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Classify this error for retry and memoization decisions.
    pub fn class(&self) -> ErrorClass {
        match self {
            ProviderError::Cancelled => ErrorClass::Cancelled,
            ProviderError::NoRoute(_)
            | ProviderError::InvalidEndpoint(_)
            | ProviderError::UnsupportedMode(_) => ErrorClass::Unroutable,
            ProviderError::Http(_)
            | ProviderError::RateLimited
            | ProviderError::InvalidResponse(_)
            | ProviderError::Rejected { .. } => ErrorClass::Transient,
        }
    }
}

/// One route returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub distance_meters: f64,
    pub expected_travel_time_seconds: f64,
    pub polyline: Vec<Coordinate>,
}

/// Async trait for turn-by-turn directions services.
///
/// Implementations return every alternative the service offers, best first.
/// An empty list means the service answered but had no route.
pub trait DirectionsProvider: Send + Sync {
    /// Computes routes from `source` to `destination` for `mode`.
    fn compute_route(
        &self,
        source: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> impl Future<Output = Result<Vec<ProviderRoute>, ProviderError>> + Send;

    /// Returns the provider's name for logging and identification.
    fn name(&self) -> &str;
}
