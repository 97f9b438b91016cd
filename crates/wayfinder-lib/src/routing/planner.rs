//! Route planning strategies implementing the Strategy pattern.
//!
//! This module provides the `RoutePlanner` trait and implementations for the
//! supported search algorithms. The strategy pattern allows adding new
//! algorithms without modifying the `plan_route` orchestrator.

use crate::error::Result;
use crate::graph::{GraphModel, NodeIndex};
use crate::path::{find_route_a_star, find_route_dijkstra, Hop, SearchControl};
use crate::preference::PreferenceEvaluator;

use super::RouteAlgorithm;

/// Trait for route planning strategies.
pub trait RoutePlanner: Send + Sync {
    /// The algorithm identifier for this planner.
    fn algorithm(&self) -> RouteAlgorithm;

    /// Execute the pathfinding algorithm on the given graph.
    ///
    /// Returns `Ok(Some(hops))` if a route is found, `Ok(None)` otherwise.
    fn find_path(
        &self,
        graph: &GraphModel,
        start: NodeIndex,
        goal: NodeIndex,
        evaluator: &PreferenceEvaluator,
        control: &SearchControl,
    ) -> Result<Option<Vec<Hop>>>;
}

/// Dijkstra's algorithm planner for weighted graph traversal.
///
/// Optimizes whichever weight the evaluator selects (distance or time).
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraPlanner;

impl RoutePlanner for DijkstraPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dijkstra
    }

    fn find_path(
        &self,
        graph: &GraphModel,
        start: NodeIndex,
        goal: NodeIndex,
        evaluator: &PreferenceEvaluator,
        control: &SearchControl,
    ) -> Result<Option<Vec<Hop>>> {
        find_route_dijkstra(graph, start, goal, evaluator, control)
    }
}

/// A* planner guided by same-floor straight-line distance.
///
/// Falls back to plain Dijkstra when optimizing for time, or when the building
/// has a path shorter than the straight line between its ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarPlanner;

impl RoutePlanner for AStarPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::AStar
    }

    fn find_path(
        &self,
        graph: &GraphModel,
        start: NodeIndex,
        goal: NodeIndex,
        evaluator: &PreferenceEvaluator,
        control: &SearchControl,
    ) -> Result<Option<Vec<Hop>>> {
        if !evaluator.supports_planar_heuristic() {
            tracing::debug!("time objective requested; A* heuristic disabled for this search");
        } else if !graph.supports_planar_heuristic() {
            tracing::debug!(
                short_paths = graph.short_paths().len(),
                "building has paths shorter than their straight line; A* heuristic disabled"
            );
        }
        find_route_a_star(graph, start, goal, evaluator, control)
    }
}

/// Select the planner for an algorithm.
pub fn select_planner(algorithm: RouteAlgorithm) -> Box<dyn RoutePlanner> {
    match algorithm {
        RouteAlgorithm::Dijkstra => Box::new(DijkstraPlanner),
        RouteAlgorithm::AStar => Box::new(AStarPlanner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dijkstra_planner_returns_correct_algorithm() {
        assert_eq!(DijkstraPlanner.algorithm(), RouteAlgorithm::Dijkstra);
    }

    #[test]
    fn astar_planner_returns_correct_algorithm() {
        assert_eq!(AStarPlanner.algorithm(), RouteAlgorithm::AStar);
    }

    #[test]
    fn select_planner_chooses_correct_type() {
        assert_eq!(
            select_planner(RouteAlgorithm::AStar).algorithm(),
            RouteAlgorithm::AStar
        );
        assert_eq!(
            select_planner(RouteAlgorithm::Dijkstra).algorithm(),
            RouteAlgorithm::Dijkstra
        );
    }
}
