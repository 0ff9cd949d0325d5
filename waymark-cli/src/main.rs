//! Waymark CLI - resolve and cache routes from the command line.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use waymark::config::config_file_path;

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::route::RouteArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "waymark")]
#[command(version, about = "Route resolution with a persistent cache", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.waymark/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve routes between consecutive waypoints
    Route(RouteArgs),

    /// Manage the persisted route cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage config.ini
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config { command } => {
            let path = cli.config.unwrap_or_else(config_file_path);
            commands::config::run(&path, command)
        }
        Commands::Route(args) => {
            let runner = CliRunner::new(cli.config, cli.verbose)?;
            commands::route::run(&runner, args)
        }
        Commands::Cache { action } => {
            let runner = CliRunner::new(cli.config, cli.verbose)?;
            commands::cache::run(&runner, action)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use waymark::route::TransportMode;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_route_parses_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "waymark",
            "route",
            "-33.8688,151.2093",
            "-37.8136,144.9631",
            "--mode",
            "plane",
        ])
        .unwrap();

        match cli.command {
            Commands::Route(args) => {
                assert_eq!(args.waypoints.len(), 2);
                assert_eq!(args.waypoints[0].lat, -33.8688);
                assert_eq!(args.mode, Some(TransportMode::Airplane));
                assert!(!args.cached_only);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_route_requires_two_waypoints() {
        assert!(Cli::try_parse_from(["waymark", "route", "31.23,121.47"]).is_err());
    }

    #[test]
    fn test_route_rejects_bad_coordinate() {
        assert!(Cli::try_parse_from(["waymark", "route", "91,0", "0,0"]).is_err());
        assert!(Cli::try_parse_from(["waymark", "route", "nowhere", "0,0"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "waymark",
            "cache",
            "stats",
            "--config",
            "/tmp/waymark.ini",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/waymark.ini")));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Cache {
                action: CacheAction::Stats
            }
        ));
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["waymark", "config", "init"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Init
            }
        ));
    }
}
