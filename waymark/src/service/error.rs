//! Service error types.

use crate::provider::ProviderError;
use std::fmt;

/// Errors that can occur while building the route service.
///
/// Configuration files are loaded by the caller; the builder only sees
/// parsed settings.
///
/// Route lookups themselves never fail at the service boundary; a pair
/// without a route resolves to `None`.
#[derive(Debug)]
pub enum ServiceError {
    /// Failed to create HTTP client or provider
    ProviderError(ProviderError),
    /// Invalid configuration value
    ConfigError(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderError(e) => write!(f, "Provider error: {}", e),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ProviderError(e) => Some(e),
            Self::ConfigError(_) => None,
        }
    }
}

impl From<ProviderError> for ServiceError {
    fn from(e: ProviderError) -> Self {
        Self::ProviderError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display() {
        let err = ServiceError::ConfigError("max_concurrent_requests must be > 0".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: max_concurrent_requests must be > 0"
        );
    }

    #[test]
    fn test_source_chain() {
        let err = ServiceError::from(ProviderError::Http("boom".into()));
        assert!(err.source().is_some());
        assert!(ServiceError::ConfigError("x".into()).source().is_none());
    }
}
