//! Per-building graph snapshot cache.
//!
//! Readers receive an `Arc<GraphModel>` and keep using it for as long as they
//! need; a rebuild produces a brand-new snapshot that replaces the cached
//! `Arc` in one swap. Builds and swaps are serialized per building, so two
//! buildings never wait on each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{build_graph, GraphModel};
use crate::model::{BuildingId, BuildingSource};

static GLOBAL_CACHE: Lazy<GraphCache> = Lazy::new(GraphCache::new);

#[derive(Debug, Default)]
struct BuildingSlot {
    current: RwLock<Option<Arc<GraphModel>>>,
    build_lock: Mutex<()>,
}

impl BuildingSlot {
    fn load(&self) -> Option<Arc<GraphModel>> {
        self.current.read().clone()
    }

    fn store(&self, graph: Option<Arc<GraphModel>>) {
        *self.current.write() = graph;
    }
}

/// Copy-on-write cache of building graphs.
#[derive(Debug, Default)]
pub struct GraphCache {
    slots: RwLock<HashMap<BuildingId, Arc<BuildingSlot>>>,
    generations: AtomicU64,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache shared by every navigator that does not bring its own.
    pub fn global() -> &'static GraphCache {
        &GLOBAL_CACHE
    }

    /// Return the cached snapshot, building it from `source` on first access.
    pub fn get_or_build(
        &self,
        building: BuildingId,
        source: &dyn BuildingSource,
    ) -> Result<Arc<GraphModel>> {
        let slot = self.slot(building);
        if let Some(graph) = slot.load() {
            return Ok(graph);
        }

        let _guard = slot.build_lock.lock();
        // Another caller may have finished the build while we waited.
        if let Some(graph) = slot.load() {
            return Ok(graph);
        }

        let graph = match self.build(building, source) {
            Ok(graph) => Arc::new(graph),
            Err(error) => {
                self.release(building, &slot);
                return Err(error);
            }
        };
        slot.store(Some(Arc::clone(&graph)));
        self.register(building, &slot);
        Ok(graph)
    }

    /// Currently cached snapshot, if any, without building.
    pub fn get(&self, building: BuildingId) -> Option<Arc<GraphModel>> {
        self.slots.read().get(&building).and_then(|slot| slot.load())
    }

    /// Build a fresh snapshot from `source` and swap it in.
    ///
    /// Readers holding the previous snapshot are unaffected.
    pub fn refresh(
        &self,
        building: BuildingId,
        source: &dyn BuildingSource,
    ) -> Result<Arc<GraphModel>> {
        let slot = self.slot(building);
        let _guard = slot.build_lock.lock();

        let graph = match self.build(building, source) {
            Ok(graph) => Arc::new(graph),
            Err(error) => {
                self.release(building, &slot);
                return Err(error);
            }
        };
        let previous = slot.load().map(|old| old.generation());
        slot.store(Some(Arc::clone(&graph)));
        self.register(building, &slot);
        info!(
            building,
            previous_generation = ?previous,
            generation = graph.generation(),
            "swapped building graph"
        );
        Ok(graph)
    }

    /// Drop the cached snapshot so the next access rebuilds it.
    ///
    /// Returns `true` when a snapshot was cached.
    pub fn invalidate(&self, building: BuildingId) -> bool {
        let Some(slot) = self.slots.read().get(&building).cloned() else {
            return false;
        };
        let _guard = slot.build_lock.lock();
        let had_graph = slot.load().is_some();
        slot.store(None);
        self.release(building, &slot);
        debug!(building, had_graph, "invalidated building graph");
        had_graph
    }

    /// Generation of the cached snapshot for `building`.
    pub fn generation(&self, building: BuildingId) -> Option<u64> {
        self.get(building).map(|graph| graph.generation())
    }

    fn slot(&self, building: BuildingId) -> Arc<BuildingSlot> {
        if let Some(slot) = self.slots.read().get(&building) {
            return Arc::clone(slot);
        }
        Arc::clone(self.slots.write().entry(building).or_default())
    }

    /// Re-attach `slot` after a successful build if it was released while the
    /// build ran.
    fn register(&self, building: BuildingId, slot: &Arc<BuildingSlot>) {
        if self.slots.read().contains_key(&building) {
            return;
        }
        self.slots
            .write()
            .entry(building)
            .or_insert_with(|| Arc::clone(slot));
    }

    /// Remove `slot` from the map when it holds no graph.
    ///
    /// Callers hold the slot's build lock.
    fn release(&self, building: BuildingId, slot: &Arc<BuildingSlot>) {
        if slot.load().is_some() {
            return;
        }
        let mut slots = self.slots.write();
        if slots
            .get(&building)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            slots.remove(&building);
        }
    }

    fn build(&self, building: BuildingId, source: &dyn BuildingSource) -> Result<GraphModel> {
        let snapshot = source.snapshot(building)?;
        if snapshot.building.id != building || !snapshot.building.active {
            return Err(Error::UnknownBuilding { building });
        }

        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(build_graph(&snapshot).with_generation(generation))
    }
}
