//! Route computation.
//!
//! [`RouteResolver`] turns one ordered pair of coordinates into a route,
//! consulting the caches, the failure memo, and finally the directions
//! provider under the concurrency limit and request throttle.
//! [`BatchRouteCalculator`] runs the resolver over every leg of a waypoint
//! list.

mod batch;
mod coalesce;
mod error;
mod resolver;
mod stats;

pub use batch::BatchRouteCalculator;
pub use coalesce::{wait_for_leader, LeaderGuard, Registration, RouteCoalescer, RouteOutcome};
pub use error::RouteFailure;
pub use resolver::{CacheLayer, RouteResolver, FLIGHT_SEGMENT_METERS, FLIGHT_SPEED_KMH};
pub use stats::{ResolverStats, ResolverStatsSnapshot};
