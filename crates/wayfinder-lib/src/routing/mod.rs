//! Route planning module for indoor navigation.
//!
//! This module provides:
//! - [`RouteAlgorithm`] - Supported routing algorithms (Dijkstra, A*)
//! - [`RouteRequest`] - High-level route planning request
//! - [`plan_route`] - Main entry point for computing routes over a graph snapshot
//!
//! # Strategy Pattern
//!
//! Each algorithm is encapsulated in its own planner struct behind the
//! [`RoutePlanner`] trait, and the optimization objective is a
//! [`WeightSelector`](crate::preference::WeightSelector) carried by the
//! evaluator, so neither is branched on inside the search loop.
//!
//! # Example
//!
//! ```ignore
//! use wayfinder_lib::{build_graph, load_snapshot, plan_route, RouteRequest, SearchControl};
//!
//! let snapshot = load_snapshot("building.json".as_ref())?;
//! let graph = build_graph(&snapshot);
//! let request = RouteRequest::new(snapshot.building.id, 1, 3);
//! let result = plan_route(&graph, &request, &SearchControl::unbounded())?;
//! println!("{} steps", result.step_count());
//! ```

mod planner;

pub use planner::{select_planner, AStarPlanner, DijkstraPlanner, RoutePlanner};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{GraphModel, NodeIndex};
use crate::model::{BuildingId, LandmarkId};
use crate::output::{compose_route, RouteResult};
use crate::path::SearchControl;
use crate::preference::{PreferenceEvaluator, PreferenceProfile};

/// Supported routing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteAlgorithm {
    /// Dijkstra's algorithm (weighted graph).
    #[default]
    Dijkstra,
    /// A* search guided by same-floor straight-line distance.
    #[serde(rename = "a-star")]
    AStar,
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::Dijkstra => "dijkstra",
            RouteAlgorithm::AStar => "a-star",
        };
        f.write_str(value)
    }
}

impl FromStr for RouteAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "dijkstra" => Ok(RouteAlgorithm::Dijkstra),
            "a-star" | "astar" | "a_star" | "a*" => Ok(RouteAlgorithm::AStar),
            other => Err(format!("unknown route algorithm '{other}'")),
        }
    }
}

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub building: BuildingId,
    pub from: LandmarkId,
    pub to: LandmarkId,
    #[serde(default)]
    pub preferences: PreferenceProfile,
    /// Algorithm override; the navigator's configured default applies when `None`.
    #[serde(default)]
    pub algorithm: Option<RouteAlgorithm>,
}

impl RouteRequest {
    /// Request with the default preference profile.
    pub fn new(building: BuildingId, from: LandmarkId, to: LandmarkId) -> Self {
        Self {
            building,
            from,
            to,
            preferences: PreferenceProfile::default(),
            algorithm: None,
        }
    }

    pub fn with_preferences(mut self, preferences: PreferenceProfile) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_algorithm(mut self, algorithm: RouteAlgorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }
}

/// Resolve a landmark to its node index, rejecting anything outside the graph.
fn resolve_landmark(
    graph: &GraphModel,
    request: &RouteRequest,
    landmark: LandmarkId,
) -> Result<NodeIndex> {
    if request.building != graph.building() {
        return Err(Error::invalid_reference(
            request.building,
            landmark,
            format!("graph snapshot belongs to building {}", graph.building()),
        ));
    }

    graph.index_of(landmark).ok_or_else(|| {
        Error::invalid_reference(
            request.building,
            landmark,
            "not an active landmark of this building",
        )
    })
}

// =============================================================================
// Main Entry Point
// =============================================================================

/// Compute a route over a graph snapshot.
///
/// This is the main entry point for route planning. It:
/// 1. Resolves the landmarks to node indices (`InvalidReference` on failure)
/// 2. Derives the edge rules from the preference profile
/// 3. Selects the planner strategy and runs the search
/// 4. Composes the traversed edges into steps
///
/// An unreachable destination is reported as `reachable == false`.
pub fn plan_route(
    graph: &GraphModel,
    request: &RouteRequest,
    control: &SearchControl,
) -> Result<RouteResult> {
    let start = resolve_landmark(graph, request, request.from)?;
    let goal = resolve_landmark(graph, request, request.to)?;

    let algorithm = request.algorithm.unwrap_or_default();
    let evaluator = PreferenceEvaluator::new(request.preferences);
    let planner = select_planner(algorithm);

    let hops = planner.find_path(graph, start, goal, &evaluator, control)?;

    let result = match hops {
        Some(hops) => compose_route(graph, &hops, request.preferences, algorithm),
        None => RouteResult::unreachable(request.preferences, algorithm),
    };

    debug!(
        building = request.building,
        from = request.from,
        to = request.to,
        %algorithm,
        reachable = result.reachable,
        steps = result.step_count(),
        total_distance = result.total_distance,
        "planned route"
    );

    Ok(result)
}
