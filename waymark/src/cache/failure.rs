//! Memo of route pairs known to be unroutable.

use crate::route::RouteKey;
use dashmap::DashSet;

/// Process-lifetime set of route keys that must not be requested again.
///
/// A key lands here when the provider reports that no route exists, when the
/// endpoints are invalid for routing, or when the pair exceeds the maximum
/// routable distance. Transient failures and cancellations are never
/// recorded. The memo is not persisted.
#[derive(Debug, Default)]
pub struct FailureMemo {
    keys: DashSet<RouteKey>,
}

impl FailureMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &RouteKey) -> bool {
        self.keys.contains(key)
    }

    /// Record `key` as unroutable. Returns `true` if it was not already known.
    pub fn mark(&self, key: RouteKey) -> bool {
        self.keys.insert(key)
    }

    /// Forget a key so the next request retries it.
    pub fn forget(&self, key: &RouteKey) -> bool {
        self.keys.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&self) {
        self.keys.clear();
    }
}
