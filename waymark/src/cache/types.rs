//! Core types for the route cache.

use thiserror::Error;

/// Errors raised while writing the persisted route cache.
///
/// Read-side problems (missing or corrupt file) are recovered inside
/// [`RouteFile::load`](super::RouteFile::load) and never produce this error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error while writing or renaming the cache file
    #[error("Route cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode the snapshot
    #[error("Route cache encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
