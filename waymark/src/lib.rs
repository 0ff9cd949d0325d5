//! Waymark - cached, rate-limited road routing between geographic points.
//!
//! Waymark resolves routes between coordinate pairs through an external
//! directions provider and keeps the results:
//!
//! - in memory for the life of the process
//! - on disk for 30 days, surviving restarts
//! - as a memo of pairs that can never be routed
//!
//! Outbound calls are bounded (5 concurrent by default) and spaced (100 ms
//! between call starts by default).
//!
//! # High-Level API
//!
//! The [`service`] module provides the facade:
//!
//! ```no_run
//! use waymark::config::ConfigFile;
//! use waymark::coord::Coordinate;
//! use waymark::service::osrm_service;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = osrm_service(&ConfigFile::default())?;
//! let stops = [
//!     Coordinate::new(48.8566, 2.3522)?,
//!     Coordinate::new(50.8503, 4.3517)?,
//!     Coordinate::new(52.3676, 4.9041)?,
//! ];
//! let legs = service.resolve_routes(&stops).await;
//! println!("{} legs", legs.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod engine;
pub mod limiter;
pub mod logging;
pub mod provider;
pub mod route;
pub mod service;

/// Version of the Waymark library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
