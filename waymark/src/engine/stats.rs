//! Resolver counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated by the resolver.
#[derive(Debug, Default)]
pub struct ResolverStats {
    requests: AtomicU64,
    memory_hits: AtomicU64,
    persisted_hits: AtomicU64,
    coalesced: AtomicU64,
    provider_calls: AtomicU64,
    successes: AtomicU64,
    known_unroutable: AtomicU64,
    too_far: AtomicU64,
    no_route: AtomicU64,
    cancelled: AtomicU64,
    transient: AtomicU64,
}

/// Point-in-time copy of [`ResolverStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStatsSnapshot {
    pub requests: u64,
    pub memory_hits: u64,
    pub persisted_hits: u64,
    pub coalesced: u64,
    pub provider_calls: u64,
    pub successes: u64,
    pub known_unroutable: u64,
    pub too_far: u64,
    pub no_route: u64,
    pub cancelled: u64,
    pub transient: u64,
}

impl ResolverStatsSnapshot {
    /// Fraction of requests answered from memory or disk.
    pub fn hit_ratio(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            (self.memory_hits + self.persisted_hits) as f64 / self.requests as f64
        }
    }
}

macro_rules! counter {
    ($record:ident, $field:ident) => {
        pub(crate) fn $record(&self) {
            self.$field.fetch_add(1, Ordering::Relaxed);
        }
    };
}

impl ResolverStats {
    pub fn new() -> Self {
        Self::default()
    }

    counter!(record_request, requests);
    counter!(record_memory_hit, memory_hits);
    counter!(record_persisted_hit, persisted_hits);
    counter!(record_coalesced, coalesced);
    counter!(record_provider_call, provider_calls);
    counter!(record_success, successes);
    counter!(record_known_unroutable, known_unroutable);
    counter!(record_too_far, too_far);
    counter!(record_no_route, no_route);
    counter!(record_cancelled, cancelled);
    counter!(record_transient, transient);

    pub fn snapshot(&self) -> ResolverStatsSnapshot {
        ResolverStatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            persisted_hits: self.persisted_hits.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            provider_calls: self.provider_calls.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            known_unroutable: self.known_unroutable.load(Ordering::Relaxed),
            too_far: self.too_far.load(Ordering::Relaxed),
            no_route: self.no_route.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            transient: self.transient.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio() {
        let stats = ResolverStats::new();
        assert_eq!(stats.snapshot().hit_ratio(), 0.0);

        for _ in 0..4 {
            stats.record_request();
        }
        stats.record_memory_hit();
        stats.record_persisted_hit();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.requests, 4);
        assert!((snapshot.hit_ratio() - 0.5).abs() < f64::EPSILON);
    }
}
