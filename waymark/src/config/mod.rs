//! Configuration for Waymark.
//!
//! Two layers:
//!
//! - [`ConfigFile`] mirrors `~/.waymark/config.ini` section by section
//! - [`RoutingConfig`] is the typed view the resolver is built from
//!
//! # Example
//!
//! ```
//! use waymark::config::{ConfigFile, RoutingConfig};
//!
//! let file = ConfigFile::default();
//! let routing = RoutingConfig::from(&file);
//! assert_eq!(routing.max_concurrent_requests(), 5);
//! ```

mod defaults;
mod file;
mod parser;
mod routing;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFile, ConfigFileError};
pub use routing::RoutingConfig;
pub use settings::{CacheSettings, ProviderSettings, RoutingSettings};
