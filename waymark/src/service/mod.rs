//! High-level route service.
//!
//! [`RouteService`] is the entry point for applications: resolve a pair,
//! resolve a whole itinerary, or peek at the cache.
//!
//! ```no_run
//! use waymark::config::ConfigFile;
//! use waymark::coord::Coordinate;
//! use waymark::service::osrm_service;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = osrm_service(&ConfigFile::load()?)?;
//! let shanghai = Coordinate::new(31.2304, 121.4737)?;
//! let hangzhou = Coordinate::new(30.2741, 120.1551)?;
//!
//! if let Some(route) = service.resolve_route(shanghai, hangzhou).await {
//!     println!("{:.1} km", route.distance_meters / 1000.0);
//! }
//! service.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod facade;

pub use builder::{osrm_service, OsrmRouteService, RouteServiceBuilder};
pub use error::ServiceError;
pub use facade::{RouteService, ServiceStats};
