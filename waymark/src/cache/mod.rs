//! Route caching.
//!
//! Three layers back the resolver:
//!
//! - [`InMemoryRouteCache`] - process-lifetime map, checked first
//! - [`PersistentRouteStore`] - JSON file on disk, survives restarts
//! - [`FailureMemo`] - keys known to be unroutable, never persisted
//!
//! Entries carry a 30 day TTL by default and are validated on every read.

mod failure;
mod file;
mod memory;
mod path;
mod store;
mod types;

pub use failure::FailureMemo;
pub use file::{FileSummary, RouteFile};
pub use memory::InMemoryRouteCache;
pub use path::{route_cache_path, ROUTE_CACHE_FILE, ROUTE_CACHE_SUBDIR};
pub use store::PersistentRouteStore;
pub use types::StoreError;
