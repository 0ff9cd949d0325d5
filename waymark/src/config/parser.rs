//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [routing] section
    if let Some(section) = ini.section(Some("routing")) {
        if let Some(v) = section.get("max_concurrent_requests") {
            let n: usize = parse_number("routing", "max_concurrent_requests", v)?;
            if n == 0 {
                return Err(invalid("routing", "max_concurrent_requests", v, "must be at least 1"));
            }
            config.routing.max_concurrent_requests = n;
        }
        if let Some(v) = section.get("min_request_interval_ms") {
            config.routing.min_request_interval_ms =
                parse_number("routing", "min_request_interval_ms", v)?;
        }
        if let Some(v) = section.get("max_route_distance_km") {
            config.routing.max_route_distance_km =
                parse_distance("routing", "max_route_distance_km", v)?;
        }
        if let Some(v) = section.get("long_distance_threshold_km") {
            config.routing.long_distance_threshold_km =
                parse_distance("routing", "long_distance_threshold_km", v)?;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("ttl_days") {
            let days: u64 = parse_number("cache", "ttl_days", v)?;
            if days == 0 {
                return Err(invalid("cache", "ttl_days", v, "must be at least 1"));
            }
            config.cache.ttl_days = days;
        }
    }

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid("provider", "url", v, "must start with http:// or https://"));
            }
            config.provider.url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = section.get("timeout") {
            let secs: u64 = parse_number("provider", "timeout", v)?;
            if secs == 0 {
                return Err(invalid("provider", "timeout", v, "must be at least 1 second"));
            }
            config.provider.timeout = secs;
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "must be a non-negative integer"))
}

fn parse_distance(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    match value.trim().parse::<f64>() {
        Ok(km) if km.is_finite() && km > 0.0 => Ok(km),
        _ => Err(invalid(section, key, value, "must be a positive number of kilometres")),
    }
}

/// Expand a leading `~/` to the user's home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
