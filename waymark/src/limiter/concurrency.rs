//! Counting-permit limiter for outbound provider calls.
//!
//! Wraps a Tokio semaphore so that at most `max_concurrent` route
//! computations talk to the directions provider at once. Permits are RAII
//! guards: dropping one releases the slot, so a slot is returned exactly once
//! on every exit path, including errors and cancelled futures.
//!
//! # Usage
//!
//! ```
//! use waymark::limiter::ConcurrencyLimiter;
//!
//! # async fn example() {
//! let limiter = ConcurrencyLimiter::new(5, "directions");
//! if let Some(_permit) = limiter.acquire().await {
//!     // provider call happens here
//! };
//! # }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::debug;

/// Default number of concurrent provider calls.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Limits the number of concurrent provider calls.
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Semaphore,
    capacity: usize,
    active: AtomicUsize,
    /// High-water mark of `active` since creation or the last reset
    peak_active: AtomicUsize,
    /// Names the limiter in log output, e.g. "directions"
    label: String,
}

impl ConcurrencyLimiter {
    /// Creates a limiter allowing `max_concurrent` simultaneous permits.
    ///
    /// # Panics
    ///
    /// Panics if `max_concurrent` is 0. Configuration rejects zero before it
    /// gets here.
    pub fn new(max_concurrent: usize, label: impl Into<String>) -> Self {
        assert!(max_concurrent > 0, "max_concurrent must be > 0");

        Self {
            semaphore: Semaphore::new(max_concurrent),
            capacity: max_concurrent,
            active: AtomicUsize::new(0),
            peak_active: AtomicUsize::new(0),
            label: label.into(),
        }
    }

    /// Creates a limiter with [`DEFAULT_MAX_CONCURRENT`] permits.
    pub fn with_defaults(label: impl Into<String>) -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT, label)
    }

    /// Waits for a permit.
    ///
    /// Returns `None` once the limiter has been [closed](Self::close); every
    /// waiter is woken at that point.
    pub async fn acquire(&self) -> Option<ConcurrencyPermit<'_>> {
        let permit = self.semaphore.acquire().await.ok()?;
        Some(self.track(permit))
    }

    /// Takes a permit without waiting, if one is free.
    pub fn try_acquire(&self) -> Option<ConcurrencyPermit<'_>> {
        let permit = self.semaphore.try_acquire().ok()?;
        Some(self.track(permit))
    }

    /// Stops handing out permits. Held permits stay valid until dropped.
    pub fn close(&self) {
        debug!(label = %self.label, in_flight = self.in_flight(), "Closing concurrency limiter");
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    fn track<'a>(&'a self, permit: SemaphorePermit<'a>) -> ConcurrencyPermit<'a> {
        let now_active = self.active.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_active.fetch_max(now_active, Ordering::Relaxed);
        ConcurrencyPermit {
            _slot: permit,
            active: &self.active,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Capacity the limiter was built with.
    pub fn max_concurrent(&self) -> usize {
        self.capacity
    }

    /// Permits currently held.
    pub fn in_flight(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Most permits held at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_active.load(Ordering::Relaxed)
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn reset_peak(&self) {
        self.peak_active.store(0, Ordering::Relaxed);
    }
}

/// A held slot. Released when dropped.
pub struct ConcurrencyPermit<'a> {
    _slot: SemaphorePermit<'a>,
    active: &'a AtomicUsize,
}

impl Drop for ConcurrencyPermit<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
    }
}
