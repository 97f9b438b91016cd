//! Route command handler for computing walks between landmarks.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use wayfinder_lib::{
    InMemorySource, LandmarkId, Navigator, NavigatorConfig, PreferenceProfile, RouteAlgorithm,
    RouteRequest, RouteResult,
};

use crate::commands::read_snapshot;
use crate::output::{render_route, OutputFormat};

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Starting landmark id.
    pub from: LandmarkId,
    /// Destination landmark id.
    pub to: LandmarkId,
    /// Algorithm override; falls back to `WAYFINDER_ALGORITHM`.
    pub algorithm: Option<RouteAlgorithm>,
    pub avoid_stairs: bool,
    pub wheelchair: bool,
    /// Minimize estimated time instead of distance.
    pub fastest: bool,
}

impl RouteCommandArgs {
    /// Each flag sets exactly one preference field.
    pub fn preferences(&self) -> PreferenceProfile {
        PreferenceProfile {
            avoid_stairs: self.avoid_stairs,
            wheelchair_accessible: self.wheelchair,
            shortest_distance: !self.fastest,
        }
    }
}

/// Handle the route subcommand.
///
/// An unreachable destination is a normal outcome and is printed, not
/// returned as an error.
pub fn handle_route_command(
    snapshot_path: &Path,
    format: OutputFormat,
    args: &RouteCommandArgs,
) -> Result<RouteResult> {
    let snapshot = read_snapshot(snapshot_path)?;
    let building = snapshot.building.id;

    let navigator = Navigator::new(InMemorySource::from(snapshot))
        .with_config(NavigatorConfig::from_env());

    let mut request =
        RouteRequest::new(building, args.from, args.to).with_preferences(args.preferences());
    request.algorithm = args.algorithm;

    let route = navigator
        .compute_route(&request)
        .with_context(|| format!("failed to plan route from {} to {}", args.from, args.to))?;
    debug!(
        reachable = route.reachable,
        steps = route.step_count(),
        "route command finished"
    );

    let graph = navigator.graph(building)?;
    let rendered = render_route(&graph, args.from, args.to, &route, format)?;
    println!("{}", rendered.trim_end());
    Ok(route)
}
