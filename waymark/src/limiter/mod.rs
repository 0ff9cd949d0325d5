//! Outbound request control: how many provider calls may run at once, and
//! how closely they may start.

mod concurrency;
mod throttle;

pub use concurrency::{ConcurrencyLimiter, ConcurrencyPermit, DEFAULT_MAX_CONCURRENT};
pub use throttle::{RequestThrottle, DEFAULT_MIN_INTERVAL};
