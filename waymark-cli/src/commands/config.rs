//! Configuration management CLI commands.
//!
//! `config path`, `config init` and `config show`. These work without
//! logging so they can be used to repair a broken setup.

use std::path::Path;

use clap::Subcommand;
use waymark::config::{ConfigFile, RoutingConfig};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Write a default configuration file if none exists
    Init,

    /// Show the effective settings (file values merged over defaults)
    Show,
}

/// Run a config subcommand against the file at `path`.
pub fn run(path: &Path, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Init => {
            if ConfigFile::ensure_exists_at(path)? {
                println!("Created {}", path.display());
            } else {
                println!("Configuration already exists at {}", path.display());
            }
            Ok(())
        }
        ConfigCommands::Show => {
            let config = ConfigFile::load_from(path)?;
            let routing = RoutingConfig::from(&config);
            let source = if path.exists() { "" } else { " (not found, defaults)" };
            println!("Configuration: {}{}", path.display(), source);
            println!();
            println!("[routing]");
            println!(
                "  max_concurrent_requests    = {}",
                config.routing.max_concurrent_requests
            );
            println!(
                "  min_request_interval_ms    = {}",
                config.routing.min_request_interval_ms
            );
            println!(
                "  max_route_distance_km      = {}",
                config.routing.max_route_distance_km
            );
            println!(
                "  long_distance_threshold_km = {}",
                config.routing.long_distance_threshold_km
            );
            println!("[cache]");
            println!(
                "  directory                  = {}",
                config.cache.directory.display()
            );
            println!("  ttl_days                   = {}", config.cache.ttl_days);
            println!(
                "  route file                 = {}",
                routing.route_cache_file().display()
            );
            println!("[provider]");
            println!("  url                        = {}", config.provider.url);
            println!("  timeout                    = {}", config.provider.timeout);
            Ok(())
        }
    }
}
