//! Wayfinder library entry points.
//!
//! This crate builds per-building routing graphs from landmark and path
//! records, runs constrained shortest-path searches over them, turns the
//! winning edges into walking instructions, and tracks navigation sessions.
//! Higher-level consumers (CLI, services) should only depend on the functions
//! exported here instead of reimplementing behavior.
//!

pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod navigator;
pub mod output;
pub mod path;
pub mod preference;
pub mod routing;
pub mod session;

pub use cache::GraphCache;
pub use config::NavigatorConfig;
pub use error::{Error, Result};
pub use graph::{
    build_graph, DirectedEdge, EdgeDirection, GraphInconsistency, GraphModel, InconsistencyKind,
    NodeIndex, ShortPath,
};
pub use model::{
    load_snapshot, Building, BuildingId, BuildingSnapshot, BuildingSource, Difficulty, FloorId,
    InMemorySource, Landmark, LandmarkAccessibility, LandmarkId, LandmarkKind, PathId,
    PathRecord, PlanarPosition,
};
pub use navigator::Navigator;
pub use output::{compose_route, reverse_instruction, RouteResult, RouteStep};
pub use path::{find_route_a_star, find_route_dijkstra, Hop, SearchControl};
pub use preference::{
    DistanceWeight, Objective, PreferenceEvaluator, PreferenceProfile, TimeWeight, WeightSelector,
};
pub use routing::{plan_route, RouteAlgorithm, RouteRequest};
pub use session::{
    NavigationSession, SessionContext, SessionFeedback, SessionId, SessionStatus, SessionTracker,
};
