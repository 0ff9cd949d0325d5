//! JSON file backing the persistent route store.
//!
//! The file is a single JSON object mapping route keys to records:
//!
//! ```text
//! {
//!   "31.230400,121.473700->30.274100,120.155100": {
//!     "startLat": 31.2304, "startLon": 121.4737,
//!     "endLat": 30.2741, "endLon": 120.1551,
//!     "distance": 176000.0, "travelTime": 7800.0,
//!     "transportModeCode": 1,
//!     "timestamp": 1760000000.0,
//!     "coordinates": [{"lat": 31.2304, "lon": 121.4737}, ...]
//!   }
//! }
//! ```
//!
//! Saves replace the whole file atomically (temp file, fsync, rename), so a
//! reader sees either the previous or the new snapshot, never a mix.

use super::path::temp_path;
use super::types::StoreError;
use crate::coord::Coordinate;
use crate::route::{RouteEntry, RouteKey, TransportMode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// On-disk record for one route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedRoute {
    start_lat: f64,
    start_lon: f64,
    end_lat: f64,
    end_lon: f64,
    distance: f64,
    travel_time: f64,
    transport_mode_code: u32,
    /// Seconds since the Unix epoch
    timestamp: f64,
    coordinates: Vec<Coordinate>,
}

impl PersistedRoute {
    fn from_entry(entry: &RouteEntry) -> Self {
        Self {
            start_lat: entry.source.lat,
            start_lon: entry.source.lon,
            end_lat: entry.destination.lat,
            end_lon: entry.destination.lon,
            distance: entry.distance_meters,
            travel_time: entry.expected_travel_time_seconds,
            transport_mode_code: entry.transport_mode.code(),
            timestamp: to_unix_seconds(entry.created_at),
            coordinates: entry.polyline.clone(),
        }
    }

    /// Convert back into an entry. Returns `None` for records that cannot be
    /// represented (unknown mode code, non-finite timestamp).
    fn into_entry(self) -> Option<RouteEntry> {
        Some(RouteEntry {
            source: Coordinate {
                lat: self.start_lat,
                lon: self.start_lon,
            },
            destination: Coordinate {
                lat: self.end_lat,
                lon: self.end_lon,
            },
            distance_meters: self.distance,
            expected_travel_time_seconds: self.travel_time,
            transport_mode: TransportMode::from_code(self.transport_mode_code)?,
            polyline: self.coordinates,
            created_at: from_unix_seconds(self.timestamp)?,
        })
    }
}

fn to_unix_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

fn from_unix_seconds(secs: f64) -> Option<SystemTime> {
    if !secs.is_finite() {
        return None;
    }
    if secs >= 0.0 {
        UNIX_EPOCH.checked_add(Duration::try_from_secs_f64(secs).ok()?)
    } else {
        UNIX_EPOCH.checked_sub(Duration::try_from_secs_f64(-secs).ok()?)
    }
}

/// On-disk state of a cache file, as reported by [`RouteFile::inspect`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSummary {
    pub exists: bool,
    /// File could not be read or parsed as a whole
    pub corrupt: bool,
    pub bytes: u64,
    /// Entries that would survive a load
    pub valid: usize,
    /// Entries past their TTL or with too few points
    pub expired: usize,
    /// Records that do not decode
    pub undecodable: usize,
    pub total_distance_meters: f64,
}

struct Decoded {
    entries: HashMap<RouteKey, Arc<RouteEntry>>,
    expired: usize,
    undecodable: usize,
}

enum ReadOutcome {
    Missing,
    Unreadable(io::Error),
    Corrupt(serde_json::Error),
    Decoded(Decoded),
}

/// The persisted route cache file.
#[derive(Debug, Clone)]
pub struct RouteFile {
    path: PathBuf,
    ttl: Duration,
}

impl RouteFile {
    /// Create a handle for the cache file at `path` with the given entry TTL.
    ///
    /// Nothing is read or created until [`load`](Self::load) or
    /// [`save`](Self::save) is called.
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Time-to-live applied to loaded entries.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Load all valid entries.
    ///
    /// Entries that are expired at `now`, have fewer than two polyline
    /// points, or cannot be decoded are dropped. If anything was dropped the
    /// filtered set is written back immediately. A missing or unreadable file
    /// yields an empty map; this never fails.
    pub fn load(&self, now: SystemTime) -> HashMap<RouteKey, Arc<RouteEntry>> {
        match self.read(now) {
            ReadOutcome::Missing => {
                debug!(path = %self.path.display(), "No route cache file, starting empty");
                HashMap::new()
            }
            ReadOutcome::Unreadable(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read route cache, starting empty");
                HashMap::new()
            }
            ReadOutcome::Corrupt(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Route cache file is corrupt, discarding it"
                );
                self.rewrite(&HashMap::new());
                HashMap::new()
            }
            ReadOutcome::Decoded(decoded) => {
                if decoded.expired > 0 || decoded.undecodable > 0 {
                    info!(
                        path = %self.path.display(),
                        kept = decoded.entries.len(),
                        expired = decoded.expired,
                        undecodable = decoded.undecodable,
                        "Dropped invalid route cache entries, rewriting file"
                    );
                    self.rewrite(&decoded.entries);
                } else {
                    debug!(path = %self.path.display(), entries = decoded.entries.len(), "Loaded route cache");
                }
                decoded.entries
            }
        }
    }

    /// Summarize the file as it is on disk, without modifying it.
    pub fn inspect(&self, now: SystemTime) -> FileSummary {
        let bytes = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        let mut summary = FileSummary {
            bytes,
            ..FileSummary::default()
        };
        match self.read(now) {
            ReadOutcome::Missing => {}
            ReadOutcome::Unreadable(_) | ReadOutcome::Corrupt(_) => {
                summary.exists = true;
                summary.corrupt = true;
            }
            ReadOutcome::Decoded(decoded) => {
                summary.exists = true;
                summary.valid = decoded.entries.len();
                summary.expired = decoded.expired;
                summary.undecodable = decoded.undecodable;
                summary.total_distance_meters =
                    decoded.entries.values().map(|e| e.distance_meters).sum();
            }
        }
        summary
    }

    fn read(&self, now: SystemTime) -> ReadOutcome {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return ReadOutcome::Missing,
            Err(e) => return ReadOutcome::Unreadable(e),
        };

        // Decode the outer object first so one bad record does not cost the
        // whole cache.
        let raw: HashMap<RouteKey, serde_json::Value> = match serde_json::from_slice(&bytes) {
            Ok(raw) => raw,
            Err(e) => return ReadOutcome::Corrupt(e),
        };

        let mut decoded = Decoded {
            entries: HashMap::with_capacity(raw.len()),
            expired: 0,
            undecodable: 0,
        };
        for (key, value) in raw {
            let entry = serde_json::from_value::<PersistedRoute>(value)
                .ok()
                .and_then(PersistedRoute::into_entry);
            match entry {
                Some(entry) if entry.is_valid_at(now, self.ttl) => {
                    decoded.entries.insert(key, Arc::new(entry));
                }
                Some(_) => decoded.expired += 1,
                None => decoded.undecodable += 1,
            }
        }
        ReadOutcome::Decoded(decoded)
    }

    /// Atomically replace the file with `entries`.
    ///
    /// Writes a sibling temp file, syncs it, then renames it over the target.
    /// Parent directories are created as needed.
    pub fn save(&self, entries: &HashMap<RouteKey, Arc<RouteEntry>>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Sorted keys keep the file stable between saves of the same content
        let records: BTreeMap<&RouteKey, PersistedRoute> = entries
            .iter()
            .map(|(key, entry)| (key, PersistedRoute::from_entry(entry)))
            .collect();
        let json = serde_json::to_vec(&records)?;

        let temp = temp_path(&self.path);
        {
            let mut file = fs::File::create(&temp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;

        debug!(
            path = %self.path.display(),
            entries = records.len(),
            bytes = json.len(),
            "Saved route cache"
        );
        Ok(())
    }

    /// Remove the backing file if present.
    pub fn delete(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn rewrite(&self, entries: &HashMap<RouteKey, Arc<RouteEntry>>) {
        if let Err(e) = self.save(entries) {
            warn!(path = %self.path.display(), error = %e, "Failed to rewrite route cache");
        }
    }
}
