//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[routing]
; Maximum number of route requests sent to the provider at the same time
max_concurrent_requests = {}
; Minimum gap between the start of two provider requests, in milliseconds
min_request_interval_ms = {}
; Point pairs farther apart than this (straight line) are never routed
max_route_distance_km = {}
; Above this distance the provider may pick any transport mode
long_distance_threshold_km = {}

[cache]
; Root directory for route data. Routes are stored in <directory>/routes/
directory = {}
; How long a computed route stays valid, in days
ttl_days = {}

[provider]
; OSRM server base URL
url = {}
; HTTP request timeout in seconds
timeout = {}
"#,
        config.routing.max_concurrent_requests,
        config.routing.min_request_interval_ms,
        config.routing.max_route_distance_km,
        config.routing.long_distance_threshold_km,
        path_to_string(&config.cache.directory),
        config.cache.ttl_days,
        config.provider.url,
        config.provider.timeout,
    )
}

/// Render a path, abbreviating the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
