use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{BuildingId, BuildingSnapshot, FloorId, Landmark, LandmarkId, PathId, PathRecord};

/// Dense index of a landmark inside a [`GraphModel`].
pub type NodeIndex = usize;

/// Traversal direction of a directed edge relative to its source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    /// Walks the path from its stored `from` to its stored `to`.
    Forward,
    /// Walks a bidirectional path from `to` back to `from`.
    Reverse,
}

/// One traversable direction of a path.
///
/// The edge only points back at its source path; distance, time and
/// accessibility flags are read from the shared [`PathRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectedEdge {
    pub target: NodeIndex,
    pub path: usize,
    pub direction: EdgeDirection,
}

/// Why a path record was left out of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyKind {
    MissingLandmark,
    InactiveLandmark,
    CrossBuilding,
    ForeignPath,
    SelfLoop,
    InvalidCost,
}

impl fmt::Display for InconsistencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            InconsistencyKind::MissingLandmark => "references a missing landmark",
            InconsistencyKind::InactiveLandmark => "references an inactive landmark",
            InconsistencyKind::CrossBuilding => "references a landmark in another building",
            InconsistencyKind::ForeignPath => "belongs to another building",
            InconsistencyKind::SelfLoop => "starts and ends at the same landmark",
            InconsistencyKind::InvalidCost => "has a non-positive distance or time",
        };
        f.write_str(value)
    }
}

/// A path record skipped while building a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphInconsistency {
    pub path: PathId,
    pub kind: InconsistencyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<LandmarkId>,
}

impl fmt::Display for GraphInconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.landmark {
            Some(landmark) => write!(f, "path {} {} ({})", self.path, self.kind, landmark),
            None => write!(f, "path {} {}", self.path, self.kind),
        }
    }
}

/// Same-floor path whose distance undercuts the straight line between its
/// ends, which breaks the A* distance estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortPath {
    pub path: PathId,
    pub distance: f64,
    pub straight_line: f64,
}

impl fmt::Display for ShortPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "path {} is {:.2} m long but its ends are {:.2} m apart",
            self.path, self.distance, self.straight_line
        )
    }
}

/// Immutable per-building routing graph.
///
/// Nodes are the building's active landmarks, indexed densely in ascending
/// landmark id order. Every adjacency list is sorted by target index.
#[derive(Debug, Clone)]
pub struct GraphModel {
    building: BuildingId,
    generation: u64,
    landmarks: Arc<[Landmark]>,
    paths: Arc<[PathRecord]>,
    index: HashMap<LandmarkId, NodeIndex>,
    adjacency: Arc<[Vec<DirectedEdge>]>,
    inconsistencies: Vec<GraphInconsistency>,
    short_paths: Vec<ShortPath>,
}

impl GraphModel {
    /// Building this graph was built for.
    pub fn building(&self) -> BuildingId {
        self.building
    }

    /// Snapshot generation assigned by the builder or cache.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Return the outgoing edges of a node.
    pub fn neighbours(&self, node: NodeIndex) -> &[DirectedEdge] {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve a landmark identifier to its dense index.
    pub fn index_of(&self, landmark: LandmarkId) -> Option<NodeIndex> {
        self.index.get(&landmark).copied()
    }

    pub fn landmark(&self, node: NodeIndex) -> Option<&Landmark> {
        self.landmarks.get(node)
    }

    pub fn floor_of(&self, node: NodeIndex) -> Option<FloorId> {
        self.landmark(node).map(|landmark| landmark.floor)
    }

    /// Source path record of a directed edge.
    pub fn path(&self, edge: &DirectedEdge) -> &PathRecord {
        &self.paths[edge.path]
    }

    pub fn node_count(&self) -> usize {
        self.landmarks.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Path records skipped during the build.
    pub fn inconsistencies(&self) -> &[GraphInconsistency] {
        &self.inconsistencies
    }

    /// Same-floor paths shorter than the straight line between their ends.
    pub fn short_paths(&self) -> &[ShortPath] {
        &self.short_paths
    }

    /// Whether planar distance to the goal never overestimates the remaining
    /// walking distance.
    pub fn supports_planar_heuristic(&self) -> bool {
        self.short_paths.is_empty()
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

/// Build the routing graph for a building snapshot.
///
/// Path records that cannot be wired into the graph are skipped and reported
/// through [`GraphModel::inconsistencies`]; the build itself never fails.
pub fn build_graph(snapshot: &BuildingSnapshot) -> GraphModel {
    let building = snapshot.building.id;

    let mut landmarks: Vec<Landmark> = snapshot
        .landmarks
        .iter()
        .filter(|landmark| landmark.active && landmark.building_id == building)
        .cloned()
        .collect();
    landmarks.sort_by(compare_landmarks);
    landmarks.dedup_by(|duplicate, kept| {
        let same = duplicate.id == kept.id;
        if same {
            warn!(
                building,
                landmark = kept.id,
                kept = %kept.name,
                dropped = %duplicate.name,
                "skipping duplicate landmark record"
            );
        }
        same
    });

    let index: HashMap<LandmarkId, NodeIndex> = landmarks
        .iter()
        .enumerate()
        .map(|(node, landmark)| (landmark.id, node))
        .collect();

    let mut paths = Vec::new();
    let mut adjacency: Vec<Vec<DirectedEdge>> = vec![Vec::new(); landmarks.len()];
    let mut inconsistencies = Vec::new();
    let mut short_paths = Vec::new();

    for record in snapshot.paths.iter().filter(|record| record.active) {
        let endpoints = match resolve_endpoints(snapshot, &index, record) {
            Ok(endpoints) => endpoints,
            Err(issue) => {
                warn!(
                    building,
                    path = issue.path,
                    landmark = ?issue.landmark,
                    kind = ?issue.kind,
                    "skipping inconsistent path"
                );
                inconsistencies.push(issue);
                continue;
            }
        };

        let (from, to) = endpoints;
        if let Some(short) = undercut_straight_line(&landmarks[from], &landmarks[to], record) {
            warn!(
                building,
                path = short.path,
                distance = short.distance,
                straight_line = short.straight_line,
                "path is shorter than the straight line between its ends"
            );
            short_paths.push(short);
        }

        let path_index = paths.len();
        paths.push(record.clone());

        adjacency[from].push(DirectedEdge {
            target: to,
            path: path_index,
            direction: EdgeDirection::Forward,
        });
        if record.bidirectional {
            adjacency[to].push(DirectedEdge {
                target: from,
                path: path_index,
                direction: EdgeDirection::Reverse,
            });
        }
    }

    for edges in &mut adjacency {
        edges.sort_by(|a, b| {
            a.target
                .cmp(&b.target)
                .then_with(|| paths[a.path].id.cmp(&paths[b.path].id))
                .then_with(|| a.direction.cmp(&b.direction))
        });
    }

    let graph = GraphModel {
        building,
        generation: 0,
        landmarks: landmarks.into(),
        paths: paths.into(),
        index,
        adjacency: adjacency.into(),
        inconsistencies,
        short_paths,
    };

    debug!(
        building,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        skipped = graph.inconsistencies.len(),
        "built building graph"
    );

    graph
}

/// Order landmarks by id; records sharing an id are ordered by their content
/// so the surviving duplicate does not depend on input order.
fn compare_landmarks(a: &Landmark, b: &Landmark) -> std::cmp::Ordering {
    a.id.cmp(&b.id)
        .then_with(|| a.floor.cmp(&b.floor))
        .then_with(|| a.position.x.total_cmp(&b.position.x))
        .then_with(|| a.position.y.total_cmp(&b.position.y))
        .then_with(|| a.name.cmp(&b.name))
}

fn undercut_straight_line(
    from: &Landmark,
    to: &Landmark,
    record: &PathRecord,
) -> Option<ShortPath> {
    if from.floor != to.floor {
        return None;
    }
    let straight_line = from.position.distance_to(&to.position);
    (record.distance < straight_line * (1.0 - 1e-9)).then(|| ShortPath {
        path: record.id,
        distance: record.distance,
        straight_line,
    })
}

fn resolve_endpoints(
    snapshot: &BuildingSnapshot,
    index: &HashMap<LandmarkId, NodeIndex>,
    record: &PathRecord,
) -> Result<(NodeIndex, NodeIndex), GraphInconsistency> {
    let issue = |kind, landmark| GraphInconsistency {
        path: record.id,
        kind,
        landmark,
    };

    if record.building_id != snapshot.building.id {
        return Err(issue(InconsistencyKind::ForeignPath, None));
    }
    if !(record.distance.is_finite() && record.distance > 0.0)
        || !(record.estimated_time.is_finite() && record.estimated_time > 0.0)
    {
        return Err(issue(InconsistencyKind::InvalidCost, None));
    }
    if record.from == record.to {
        return Err(issue(InconsistencyKind::SelfLoop, Some(record.from)));
    }

    let resolve = |landmark: LandmarkId| match index.get(&landmark) {
        Some(node) => Ok(*node),
        None => {
            let kind = match snapshot.landmark(landmark) {
                None => InconsistencyKind::MissingLandmark,
                Some(found) if found.building_id != snapshot.building.id => {
                    InconsistencyKind::CrossBuilding
                }
                Some(_) => InconsistencyKind::InactiveLandmark,
            };
            Err(issue(kind, Some(landmark)))
        }
    };

    let from = resolve(record.from)?;
    let to = resolve(record.to)?;
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Building, LandmarkAccessibility, LandmarkKind, PlanarPosition};

    fn landmark(id: LandmarkId, building_id: BuildingId) -> Landmark {
        Landmark {
            id,
            building_id,
            name: format!("L{id}"),
            floor: 1,
            position: PlanarPosition::default(),
            kind: LandmarkKind::Room,
            accessibility: LandmarkAccessibility::default(),
            active: true,
        }
    }

    fn path(id: PathId, from: LandmarkId, to: LandmarkId) -> PathRecord {
        PathRecord {
            id,
            building_id: 1,
            from,
            to,
            distance: 1.0,
            estimated_time: 1.0,
            difficulty: Default::default(),
            instructions: format!("go {from}->{to}"),
            reverse_instructions: None,
            wheelchair_accessible: true,
            requires_elevator: false,
            requires_stairs: false,
            bidirectional: false,
            active: true,
        }
    }

    fn snapshot(landmarks: Vec<Landmark>, paths: Vec<PathRecord>) -> BuildingSnapshot {
        BuildingSnapshot {
            building: Building {
                id: 1,
                name: "Test".to_string(),
                active: true,
            },
            landmarks,
            paths,
        }
    }

    #[test]
    fn indices_follow_landmark_id_order() {
        let graph = build_graph(&snapshot(
            vec![landmark(30, 1), landmark(10, 1), landmark(20, 1)],
            Vec::new(),
        ));
        assert_eq!(graph.index_of(10), Some(0));
        assert_eq!(graph.index_of(20), Some(1));
        assert_eq!(graph.index_of(30), Some(2));
        assert_eq!(graph.index_of(40), None);
    }

    #[test]
    fn one_way_path_emits_single_edge() {
        let graph = build_graph(&snapshot(
            vec![landmark(1, 1), landmark(2, 1)],
            vec![path(100, 1, 2)],
        ));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbours(0).len(), 1);
        assert!(graph.neighbours(1).is_empty());
    }

    #[test]
    fn bidirectional_path_shares_record() {
        let mut record = path(100, 1, 2);
        record.bidirectional = true;
        let graph = build_graph(&snapshot(vec![landmark(1, 1), landmark(2, 1)], vec![record]));

        let forward = graph.neighbours(0)[0];
        let reverse = graph.neighbours(1)[0];
        assert_eq!(forward.direction, EdgeDirection::Forward);
        assert_eq!(reverse.direction, EdgeDirection::Reverse);
        assert_eq!(forward.path, reverse.path);
        assert_eq!(graph.path(&reverse).id, 100);
    }

    #[test]
    fn inconsistent_paths_are_skipped() {
        let mut inactive = landmark(3, 1);
        inactive.active = false;
        let mut bad_cost = path(104, 1, 2);
        bad_cost.distance = 0.0;
        let mut foreign = path(105, 1, 2);
        foreign.building_id = 2;

        let graph = build_graph(&snapshot(
            vec![landmark(1, 1), landmark(2, 1), inactive, landmark(9, 2)],
            vec![
                path(100, 1, 2),
                path(101, 1, 99),
                path(102, 1, 3),
                path(103, 1, 9),
                bad_cost,
                foreign,
                path(106, 2, 2),
            ],
        ));

        assert_eq!(graph.edge_count(), 1);
        let kinds: Vec<_> = graph.inconsistencies().iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                InconsistencyKind::MissingLandmark,
                InconsistencyKind::InactiveLandmark,
                InconsistencyKind::CrossBuilding,
                InconsistencyKind::InvalidCost,
                InconsistencyKind::ForeignPath,
                InconsistencyKind::SelfLoop,
            ]
        );
    }

    #[test]
    fn inactive_paths_are_ignored_silently() {
        let mut record = path(100, 1, 2);
        record.active = false;
        let graph = build_graph(&snapshot(vec![landmark(1, 1), landmark(2, 1)], vec![record]));
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.inconsistencies().is_empty());
    }

    #[test]
    fn adjacency_sorted_by_target_regardless_of_input_order() {
        let graph = build_graph(&snapshot(
            vec![landmark(1, 1), landmark(2, 1), landmark(3, 1), landmark(4, 1)],
            vec![path(100, 1, 4), path(101, 1, 2), path(102, 1, 3)],
        ));
        let targets: Vec<_> = graph.neighbours(0).iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![1, 2, 3]);
    }
}
