//! Cache management CLI commands.

use std::time::SystemTime;

use clap::Subcommand;
use tracing::info;
use waymark::cache::RouteFile;
use waymark::config::RoutingConfig;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show persisted route cache statistics
    Stats,
    /// Delete every persisted route
    Clear,
    /// Remove expired and unreadable entries from the cache file
    Prune,
}

/// Run a cache subcommand.
pub fn run(runner: &CliRunner, action: CacheAction) -> Result<(), CliError> {
    let routing = RoutingConfig::from(runner.config());
    let file = RouteFile::new(routing.route_cache_file(), routing.route_ttl());

    match action {
        CacheAction::Stats => {
            let summary = file.inspect(SystemTime::now());
            println!("Route cache: {}", file.path().display());
            if !summary.exists {
                println!("  (no cache file)");
                return Ok(());
            }
            if summary.corrupt {
                println!("  File is unreadable and will be reset on next use");
                println!("  Size:        {}", format_bytes(summary.bytes));
                return Ok(());
            }
            println!("  Routes:      {}", summary.valid);
            println!("  Expired:     {}", summary.expired);
            println!("  Unreadable:  {}", summary.undecodable);
            println!(
                "  Distance:    {:.1} km",
                summary.total_distance_meters / 1000.0
            );
            println!("  Size:        {}", format_bytes(summary.bytes));
            println!("  TTL:         {} days", routing.route_ttl().as_secs() / 86_400);
            Ok(())
        }
        CacheAction::Clear => {
            let summary = file.inspect(SystemTime::now());
            file.delete()?;
            info!(path = %file.path().display(), "route cache cleared");
            println!(
                "Cleared route cache at {} ({} routes)",
                file.path().display(),
                summary.valid + summary.expired
            );
            Ok(())
        }
        CacheAction::Prune => {
            let now = SystemTime::now();
            let before = file.inspect(now);
            if !before.exists {
                println!("No cache file at {}", file.path().display());
                return Ok(());
            }
            // Loading sweeps stale records and rewrites the file
            let kept = file.load(now).len();
            let removed = before.expired + before.undecodable;
            info!(kept, removed, "route cache pruned");
            if before.corrupt {
                println!("Cache file was unreadable and has been reset");
            } else {
                println!("Removed {} entries, {} routes kept", removed, kept);
            }
            Ok(())
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
