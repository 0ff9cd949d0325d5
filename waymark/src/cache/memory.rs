//! In-memory route cache.

use crate::route::{RouteEntry, RouteKey};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Process-lifetime map of resolved routes.
///
/// Entries are shared as `Arc<RouteEntry>` so repeated hits hand out the same
/// allocation. Expiry is checked on read; an entry past its TTL is evicted
/// by the lookup that finds it.
#[derive(Debug)]
pub struct InMemoryRouteCache {
    entries: RwLock<HashMap<RouteKey, Arc<RouteEntry>>>,
    ttl: Duration,
}

impl InMemoryRouteCache {
    /// Create an empty cache with the given entry TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a valid entry.
    pub fn get(&self, key: &RouteKey) -> Option<Arc<RouteEntry>> {
        self.get_at(key, SystemTime::now())
    }

    /// Look up an entry, judging validity at `now`.
    pub fn get_at(&self, key: &RouteKey, now: SystemTime) -> Option<Arc<RouteEntry>> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.is_valid_at(now, self.ttl) => return Some(Arc::clone(entry)),
                Some(_) => {}
            }
        }

        // Expired: re-check under the write lock, a fresh entry may have
        // replaced it in between.
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.is_valid_at(now, self.ttl) => Some(Arc::clone(entry)),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace an entry.
    pub fn put(&self, key: RouteKey, entry: Arc<RouteEntry>) {
        self.entries.write().insert(key, entry);
    }

    /// Remove an entry, returning whether one was present.
    pub fn remove(&self, key: &RouteKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Bulk insert, used to warm the cache.
    pub fn seed(&self, items: impl IntoIterator<Item = (RouteKey, Arc<RouteEntry>)>) {
        let mut entries = self.entries.write();
        entries.extend(items);
    }

    /// Drop entries that are expired at `now`. Returns the number removed.
    pub fn prune_expired(&self, now: SystemTime) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_valid_at(now, self.ttl));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::route::{TransportMode, DEFAULT_ROUTE_TTL};

    fn entry(created_at: SystemTime) -> Arc<RouteEntry> {
        let a = Coordinate { lat: 1.0, lon: 1.0 };
        let b = Coordinate { lat: 1.0, lon: 2.0 };
        Arc::new(RouteEntry {
            source: a,
            destination: b,
            distance_meters: 111_000.0,
            expected_travel_time_seconds: 4_000.0,
            transport_mode: TransportMode::Automobile,
            polyline: vec![a, b],
            created_at,
        })
    }

    fn key() -> RouteKey {
        RouteKey::new(Coordinate { lat: 1.0, lon: 1.0 }, Coordinate { lat: 1.0, lon: 2.0 })
    }

    #[test]
    fn test_put_get_returns_same_allocation() {
        let cache = InMemoryRouteCache::new(DEFAULT_ROUTE_TTL);
        let e = entry(SystemTime::now());
        cache.put(key(), Arc::clone(&e));

        let hit = cache.get(&key()).unwrap();
        assert!(Arc::ptr_eq(&hit, &e));
    }

    #[test]
    fn test_miss() {
        let cache = InMemoryRouteCache::new(DEFAULT_ROUTE_TTL);
        assert!(cache.get(&key()).is_none());
    }

    #[test]
    fn test_expired_entry_evicted_on_read() {
        let cache = InMemoryRouteCache::new(Duration::from_secs(60));
        let now = SystemTime::now();
        cache.put(key(), entry(now - Duration::from_secs(61)));

        assert_eq!(cache.len(), 1);
        assert!(cache.get_at(&key(), now).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_entry_valid_at_ttl_boundary() {
        let cache = InMemoryRouteCache::new(Duration::from_secs(60));
        let now = SystemTime::now();
        cache.put(key(), entry(now - Duration::from_secs(60)));
        assert!(cache.get_at(&key(), now).is_some());
    }

    #[test]
    fn test_seed_and_prune() {
        let cache = InMemoryRouteCache::new(Duration::from_secs(60));
        let now = SystemTime::now();
        let stale_key = RouteKey::new(Coordinate { lat: 5.0, lon: 5.0 }, Coordinate { lat: 6.0, lon: 6.0 });
        cache.seed([
            (key(), entry(now)),
            (stale_key.clone(), entry(now - Duration::from_secs(120))),
        ]);
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.prune_expired(now), 1);
        assert!(cache.get_at(&stale_key, now).is_none());
        assert!(cache.get_at(&key(), now).is_some());
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = InMemoryRouteCache::new(DEFAULT_ROUTE_TTL);
        cache.put(key(), entry(SystemTime::now()));
        assert!(cache.remove(&key()));
        assert!(!cache.remove(&key()));

        cache.put(key(), entry(SystemTime::now()));
        cache.clear();
        assert!(cache.is_empty());
    }
}
