//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`route`] - Resolve an itinerary leg by leg
//! - [`cache`] - Persisted route cache maintenance (stats, clear, prune)
//! - [`config`] - Configuration management (path, init, show)

pub mod cache;
pub mod config;
pub mod route;
