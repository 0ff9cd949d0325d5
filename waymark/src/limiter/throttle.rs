//! Minimum spacing between provider call starts.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default minimum interval between provider calls.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Grants turns at least `min_interval` apart.
///
/// The last-grant timestamp sits behind an async mutex that is held through
/// the sleep, so concurrent callers queue up and are released one by one.
/// Two callers can never observe the same "last grant" and both proceed.
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_grant: Mutex::new(None),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until this caller may start a provider call.
    pub async fn wait_turn(&self) {
        let mut last = self.last_grant.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::with_defaults()
    }
}
