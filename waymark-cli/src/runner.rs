//! CLI runner for common setup.
//!
//! Loads the configuration, initializes logging and builds the async runtime
//! and route service for commands that talk to a provider.

use std::path::PathBuf;

use tracing::{debug, info};
use waymark::config::{config_file_path, ConfigFile};
use waymark::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use waymark::service::{osrm_service, OsrmRouteService};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps the log writer alive while the runner exists
    _logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Load configuration from `config_path` (or the default location) and
    /// start logging.
    ///
    /// `verbose` raises the default level to `debug`; `RUST_LOG` still wins
    /// when set.
    pub fn new(config_path: Option<PathBuf>, verbose: bool) -> Result<Self, CliError> {
        let config_path = config_path.unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&config_path)?;

        let level = if verbose { "debug" } else { "warn" };
        let logging_guard = init_logging(&default_log_dir(), default_log_file(), level)
            .map_err(CliError::LoggingInit)?;

        info!(
            version = waymark::VERSION,
            config = %config_path.display(),
            log = %logging_guard.log_path().display(),
            "waymark starting"
        );

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    /// The loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Build a multi-threaded tokio runtime for provider calls.
    pub fn runtime(&self) -> Result<tokio::runtime::Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)
    }

    /// Create the OSRM-backed route service from the loaded configuration.
    ///
    /// Call from inside the runtime so store writes go to the background
    /// writer instead of happening inline.
    pub fn create_service(&self) -> Result<OsrmRouteService, CliError> {
        let service = osrm_service(&self.config)?;
        debug!(cache = %service.cache_path().display(), "route service ready");
        Ok(service)
    }
}
