use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Numeric identifier for a building.
pub type BuildingId = i64;

/// Numeric identifier for a landmark.
pub type LandmarkId = i64;

/// Numeric identifier for a path record.
pub type PathId = i64;

/// Floor number within a building. Basements are negative.
pub type FloorId = i32;

/// Floor-local planar coordinates of a landmark.
///
/// Coordinates of landmarks on different floors are not comparable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarPosition {
    pub x: f64,
    pub y: f64,
}

impl PlanarPosition {
    /// Straight-line distance to another position on the same floor.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Category of a landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkKind {
    Room,
    Entrance,
    Exit,
    Elevator,
    Stairs,
    Restroom,
    Office,
    Facility,
    #[default]
    Other,
}

impl fmt::Display for LandmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            LandmarkKind::Room => "room",
            LandmarkKind::Entrance => "entrance",
            LandmarkKind::Exit => "exit",
            LandmarkKind::Elevator => "elevator",
            LandmarkKind::Stairs => "stairs",
            LandmarkKind::Restroom => "restroom",
            LandmarkKind::Office => "office",
            LandmarkKind::Facility => "facility",
            LandmarkKind::Other => "other",
        };
        f.write_str(value)
    }
}

/// Perceived effort of walking a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Easy,
    Moderate,
    Hard,
}

/// Accessibility features available at a landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LandmarkAccessibility {
    pub wheelchair: bool,
    pub visual_aid: bool,
    pub hearing_aid: bool,
}

/// Building record supplied by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

/// A navigable point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Landmark {
    pub id: LandmarkId,
    pub building_id: BuildingId,
    pub name: String,
    pub floor: FloorId,
    pub position: PlanarPosition,
    #[serde(default)]
    pub kind: LandmarkKind,
    #[serde(default)]
    pub accessibility: LandmarkAccessibility,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

/// A walkable connection between two landmarks of the same building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRecord {
    pub id: PathId,
    pub building_id: BuildingId,
    pub from: LandmarkId,
    pub to: LandmarkId,
    /// Walking distance in metres, folded with any floor-transition cost.
    pub distance: f64,
    /// Estimated walking time in seconds.
    pub estimated_time: f64,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub instructions: String,
    #[serde(default)]
    pub reverse_instructions: Option<String>,
    #[serde(default)]
    pub wheelchair_accessible: bool,
    #[serde(default)]
    pub requires_elevator: bool,
    #[serde(default)]
    pub requires_stairs: bool,
    #[serde(default = "active_by_default")]
    pub bidirectional: bool,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

/// Everything the graph builder needs to know about one building at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingSnapshot {
    pub building: Building,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
    #[serde(default)]
    pub paths: Vec<PathRecord>,
}

impl BuildingSnapshot {
    /// Lookup a landmark record by identifier, regardless of its active flag.
    pub fn landmark(&self, id: LandmarkId) -> Option<&Landmark> {
        self.landmarks.iter().find(|landmark| landmark.id == id)
    }
}

/// Load a building snapshot from a JSON document on disk.
pub fn load_snapshot(path: &Path) -> Result<BuildingSnapshot> {
    if !path.exists() {
        return Err(Error::SnapshotNotFound {
            path: path.to_path_buf(),
        });
    }

    let raw = std::fs::read_to_string(path)?;
    let snapshot: BuildingSnapshot = serde_json::from_str(&raw)?;
    debug!(
        building = snapshot.building.id,
        landmarks = snapshot.landmarks.len(),
        paths = snapshot.paths.len(),
        path = %path.display(),
        "loaded building snapshot"
    );
    Ok(snapshot)
}

/// Read-only access to building records owned by the persistence layer.
pub trait BuildingSource: Send + Sync {
    /// Fetch the current records for `building`.
    fn snapshot(&self, building: BuildingId) -> Result<BuildingSnapshot>;
}

/// Building source backed by snapshots held in memory.
#[derive(Debug, Default)]
pub struct InMemorySource {
    snapshots: RwLock<HashMap<BuildingId, BuildingSnapshot>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the snapshot for its building.
    ///
    /// Cached graphs are not touched; callers pair this with an invalidation.
    pub fn upsert(&self, snapshot: BuildingSnapshot) {
        self.snapshots
            .write()
            .insert(snapshot.building.id, snapshot);
    }

    /// Apply an in-place edit to a stored snapshot. Returns `false` when the
    /// building is unknown.
    pub fn update<F>(&self, building: BuildingId, edit: F) -> bool
    where
        F: FnOnce(&mut BuildingSnapshot),
    {
        match self.snapshots.write().get_mut(&building) {
            Some(snapshot) => {
                edit(snapshot);
                true
            }
            None => false,
        }
    }
}

impl From<BuildingSnapshot> for InMemorySource {
    fn from(snapshot: BuildingSnapshot) -> Self {
        let source = InMemorySource::new();
        source.upsert(snapshot);
        source
    }
}

impl BuildingSource for InMemorySource {
    fn snapshot(&self, building: BuildingId) -> Result<BuildingSnapshot> {
        self.snapshots
            .read()
            .get(&building)
            .cloned()
            .ok_or(Error::UnknownBuilding { building })
    }
}
