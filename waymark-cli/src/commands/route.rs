//! `waymark route` - resolve an itinerary leg by leg.

use std::sync::Arc;

use clap::Args;
use tracing::warn;
use waymark::coord::Coordinate;
use waymark::engine::RouteFailure;
use waymark::route::{self, RouteEntry, TransportMode};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the route command.
#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Waypoints as "lat,lon", at least two. Consecutive pairs form the legs.
    #[arg(required = true, num_args = 2.., allow_hyphen_values = true)]
    pub waypoints: Vec<Coordinate>,

    /// Force a transport mode for every leg
    /// (automobile, walking, transit, any, airplane)
    #[arg(long)]
    pub mode: Option<TransportMode>,

    /// Only report legs already in the cache; never contact the provider
    #[arg(long)]
    pub cached_only: bool,
}

/// Run the route command.
pub fn run(runner: &CliRunner, args: RouteArgs) -> Result<(), CliError> {
    if args.waypoints.len() < 2 {
        return Err(CliError::InvalidArgument(
            "at least two waypoints are required".to_string(),
        ));
    }

    let runtime = runner.runtime()?;
    runtime.block_on(resolve_and_print(runner, args))
}

async fn resolve_and_print(runner: &CliRunner, args: RouteArgs) -> Result<(), CliError> {
    let service = runner.create_service()?;

    // Setting an override evicts the pair, so it only applies to live lookups
    if let (Some(mode), false) = (args.mode, args.cached_only) {
        for pair in args.waypoints.windows(2) {
            service.set_transport_mode(pair[0], pair[1], mode);
        }
    }

    let legs: Vec<Result<Arc<RouteEntry>, RouteFailure>> = if args.cached_only {
        args.waypoints
            .windows(2)
            .map(|pair| {
                service
                    .peek_cached(pair[0], pair[1])
                    .ok_or_else(|| RouteFailure::NoRoute("not cached".to_string()))
            })
            .collect()
    } else {
        service.resolve_legs(&args.waypoints).await
    };

    let mut resolved = Vec::with_capacity(legs.len());
    for (index, (pair, leg)) in args.waypoints.windows(2).zip(legs).enumerate() {
        match leg {
            Ok(entry) => {
                println!(
                    "Leg {}: {} -> {}  {}  {}  ({})",
                    index + 1,
                    pair[0],
                    pair[1],
                    format_distance(entry.distance_meters),
                    format_duration(entry.expected_travel_time_seconds),
                    entry.transport_mode
                );
                resolved.push(entry);
            }
            Err(failure) => {
                warn!(leg = index + 1, error = %failure, "leg did not resolve");
                println!(
                    "Leg {}: {} -> {}  unavailable: {}",
                    index + 1,
                    pair[0],
                    pair[1],
                    failure
                );
            }
        }
    }

    let leg_count = args.waypoints.len() - 1;
    println!();
    println!(
        "Total: {}  {}  ({} of {} legs)",
        format_distance(route::total_distance(&resolved)),
        format_duration(route::total_travel_time(&resolved)),
        resolved.len(),
        leg_count
    );

    service.shutdown().await;
    Ok(())
}

/// Meters as kilometers with one decimal, or whole meters below 1 km.
fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Seconds as `Hh MMm`, or whole minutes below an hour.
fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).round() as u64;
    if minutes < 60 {
        format!("{} min", minutes)
    } else {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    }
}
