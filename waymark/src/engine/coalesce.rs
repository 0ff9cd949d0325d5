//! Request coalescing for route resolution.
//!
//! When several callers ask for the same route key at once, only the first
//! (the leader) computes it; the rest subscribe to a broadcast channel and
//! receive the leader's outcome.
//!
//! ```text
//! caller A ──► register(key) ──► Leader ──► compute ──► complete(outcome)
//!                                                           │
//! caller B ──► register(key) ──► Follower(rx) ◄─────────────┘
//! ```
//!
//! If the leader is dropped before completing (its caller gave up), its guard
//! removes the entry and the channel closes. Followers then get `None` from
//! [`wait_for_leader`] and register again; one of them takes over as leader.
//! A leader that was cancelled by shutdown completes with
//! [`RouteFailure::Cancelled`], which followers receive like any outcome.

use super::error::RouteFailure;
use crate::route::{RouteEntry, RouteKey};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Result shared between coalesced callers.
pub type RouteOutcome = Result<Arc<RouteEntry>, RouteFailure>;

/// Tracks in-flight route computations by key.
#[derive(Debug, Default)]
pub struct RouteCoalescer {
    in_flight: DashMap<RouteKey, broadcast::Sender<RouteOutcome>>,
}

/// What [`RouteCoalescer::register`] decided for a caller.
pub enum Registration<'a> {
    /// This caller computes the route and must call [`LeaderGuard::complete`].
    Leader(LeaderGuard<'a>),
    /// Another caller is computing it; wait with [`wait_for_leader`].
    Follower(broadcast::Receiver<RouteOutcome>),
}

impl RouteCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join or start the computation for `key`.
    pub fn register(&self, key: &RouteKey) -> Registration<'_> {
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                debug!(key = %key, "Coalescing with in-flight route computation");
                Registration::Follower(entry.get().subscribe())
            }
            Entry::Vacant(entry) => {
                let (tx, _rx) = broadcast::channel(1);
                entry.insert(tx);
                Registration::Leader(LeaderGuard {
                    coalescer: self,
                    key: Some(key.clone()),
                })
            }
        }
    }

    /// Number of keys currently being computed.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    fn finish(&self, key: &RouteKey, outcome: Option<RouteOutcome>) {
        if let Some((_, tx)) = self.in_flight.remove(key) {
            match outcome {
                Some(outcome) => {
                    let waiters = tx.receiver_count();
                    let _ = tx.send(outcome);
                    if waiters > 0 {
                        debug!(key = %key, waiters, "Broadcast route outcome to coalesced callers");
                    }
                }
                None => debug!(key = %key, "Route leader abandoned, waiters will retry"),
            }
        }
    }
}

impl Registration<'_> {
    pub fn is_leader(&self) -> bool {
        matches!(self, Registration::Leader(_))
    }
}

/// Wait for the leader's outcome as a follower.
///
/// Returns `None` if the leader was abandoned without an outcome; the key is
/// free again by then.
pub async fn wait_for_leader(mut rx: broadcast::Receiver<RouteOutcome>) -> Option<RouteOutcome> {
    rx.recv().await.ok()
}

/// Held by the leader for one key. Dropping it without completing releases
/// the key and wakes the followers empty-handed.
pub struct LeaderGuard<'a> {
    coalescer: &'a RouteCoalescer,
    key: Option<RouteKey>,
}

impl LeaderGuard<'_> {
    /// Publish the outcome to all followers and release the key.
    pub fn complete(mut self, outcome: RouteOutcome) {
        if let Some(key) = self.key.take() {
            self.coalescer.finish(&key, Some(outcome));
        }
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.coalescer.finish(&key, None);
        }
    }
}
