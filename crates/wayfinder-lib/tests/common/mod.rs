//! Common test utilities and fixture helpers.
//!
//! Provides the checked-in building fixture plus a small builder for ad-hoc
//! buildings used by the scenario tests.

#![allow(dead_code)]

use std::path::PathBuf;

use wayfinder_lib::{
    load_snapshot, Building, BuildingId, BuildingSnapshot, FloorId, Landmark,
    LandmarkAccessibility, LandmarkId, LandmarkKind, PathId, PathRecord, PlanarPosition,
};

pub const FIXTURE_BUILDING: BuildingId = 1;

/// Path to fixtures directory used by tests.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn fixture_path() -> PathBuf {
    fixtures_dir().join("science_hall.json")
}

pub fn fixture_snapshot() -> BuildingSnapshot {
    load_snapshot(&fixture_path()).expect("fixture loads")
}

/// Builder for small in-memory buildings.
pub struct BuildingBuilder {
    snapshot: BuildingSnapshot,
    next_path: PathId,
}

impl BuildingBuilder {
    pub fn new(id: BuildingId) -> Self {
        Self {
            snapshot: BuildingSnapshot {
                building: Building {
                    id,
                    name: format!("Building {id}"),
                    active: true,
                },
                landmarks: Vec::new(),
                paths: Vec::new(),
            },
            next_path: 1,
        }
    }

    pub fn landmark(mut self, id: LandmarkId, floor: FloorId, x: f64, y: f64) -> Self {
        let building_id = self.snapshot.building.id;
        self.snapshot.landmarks.push(Landmark {
            id,
            building_id,
            name: format!("L{id}"),
            floor,
            position: PlanarPosition { x, y },
            kind: LandmarkKind::Room,
            accessibility: LandmarkAccessibility::default(),
            active: true,
        });
        self
    }

    /// Add a wheelchair accessible bidirectional path with equal distance and time.
    pub fn path(self, from: LandmarkId, to: LandmarkId, distance: f64, instructions: &str) -> Self {
        self.path_with(from, to, distance, instructions, |_| {})
    }

    pub fn path_with<F>(
        mut self,
        from: LandmarkId,
        to: LandmarkId,
        distance: f64,
        instructions: &str,
        configure: F,
    ) -> Self
    where
        F: FnOnce(&mut PathRecord),
    {
        let mut record = PathRecord {
            id: self.next_path,
            building_id: self.snapshot.building.id,
            from,
            to,
            distance,
            estimated_time: distance,
            difficulty: Default::default(),
            instructions: instructions.to_string(),
            reverse_instructions: None,
            wheelchair_accessible: true,
            requires_elevator: false,
            requires_stairs: false,
            bidirectional: true,
            active: true,
        };
        configure(&mut record);
        self.next_path += 1;
        self.snapshot.paths.push(record);
        self
    }

    pub fn build(self) -> BuildingSnapshot {
        self.snapshot
    }
}

/// Scenario building: L1 and L2 on floor 1 joined by "Walk east 10m".
pub fn two_landmark_building() -> BuildingBuilder {
    BuildingBuilder::new(1)
        .landmark(1, 1, 0.0, 0.0)
        .landmark(2, 1, 10.0, 0.0)
        .path(1, 2, 10.0, "Walk east 10m")
}

/// Scenario building extended with a stairs-only connection from L2 to L3.
pub fn stairs_building() -> BuildingSnapshot {
    two_landmark_building()
        .landmark(3, 2, 10.0, 0.0)
        .path_with(2, 3, 6.0, "Take the stairs up", |path| {
            path.requires_stairs = true;
            path.wheelchair_accessible = false;
        })
        .build()
}
