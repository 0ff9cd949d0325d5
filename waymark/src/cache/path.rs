//! Cache path construction.

use std::path::{Path, PathBuf};

/// Subdirectory of the cache root that holds route data.
pub const ROUTE_CACHE_SUBDIR: &str = "routes";

/// File name of the persisted route cache.
pub const ROUTE_CACHE_FILE: &str = "route_cache.json";

/// Construct the path of the persisted route cache file.
///
/// ```text
/// <cache_dir>/routes/route_cache.json
/// ```
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use waymark::cache::route_cache_path;
///
/// let path = route_cache_path(&PathBuf::from("/data/waymark"));
/// assert_eq!(path, PathBuf::from("/data/waymark/routes/route_cache.json"));
/// ```
pub fn route_cache_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(ROUTE_CACHE_SUBDIR).join(ROUTE_CACHE_FILE)
}

/// Path of the temporary file used for atomic replacement of `path`.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    path.with_extension("tmp")
}
