//! Facade exposing route computation and session tracking over a building
//! source.

use std::sync::Arc;

use tracing::debug;

use crate::cache::GraphCache;
use crate::config::NavigatorConfig;
use crate::error::Result;
use crate::graph::GraphModel;
use crate::model::{BuildingId, BuildingSource, LandmarkId};
use crate::output::RouteResult;
use crate::path::SearchControl;
use crate::routing::{plan_route, RouteRequest};
use crate::session::{NavigationSession, SessionContext, SessionId, SessionStatus, SessionTracker};

#[derive(Debug)]
enum CacheHandle {
    Global,
    Owned(GraphCache),
}

/// Entry point tying a [`BuildingSource`] to the graph cache, the planners
/// and the session tracker.
///
/// Concurrent `compute_route` calls each work on their own snapshot `Arc`;
/// `invalidate`/`refresh` never disturb searches already running.
#[derive(Debug)]
pub struct Navigator<S> {
    source: S,
    cache: CacheHandle,
    sessions: SessionTracker,
    config: NavigatorConfig,
}

impl<S: BuildingSource> Navigator<S> {
    /// Navigator with a private graph cache and default configuration.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: CacheHandle::Owned(GraphCache::new()),
            sessions: SessionTracker::new(),
            config: NavigatorConfig::default(),
        }
    }

    /// Share the process-wide graph cache instead of a private one.
    pub fn with_global_cache(mut self) -> Self {
        self.cache = CacheHandle::Global;
        self
    }

    pub fn with_config(mut self, config: NavigatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    fn cache(&self) -> &GraphCache {
        match &self.cache {
            CacheHandle::Global => GraphCache::global(),
            CacheHandle::Owned(cache) => cache,
        }
    }

    /// Current graph snapshot for `building`, built on first access.
    pub fn graph(&self, building: BuildingId) -> Result<Arc<GraphModel>> {
        self.cache().get_or_build(building, &self.source)
    }

    /// Compute a route using the configured deadline.
    pub fn compute_route(&self, request: &RouteRequest) -> Result<RouteResult> {
        let control = match self.config.search_timeout {
            Some(timeout) => SearchControl::unbounded().with_timeout(timeout),
            None => SearchControl::unbounded(),
        };
        self.compute_route_with(request, &control)
    }

    /// Compute a route with caller supplied cancellation and deadline.
    pub fn compute_route_with(
        &self,
        request: &RouteRequest,
        control: &SearchControl,
    ) -> Result<RouteResult> {
        let graph = self.graph(request.building)?;

        let mut request = request.clone();
        if request.algorithm.is_none() {
            request.algorithm = Some(self.config.default_algorithm);
        }

        plan_route(&graph, &request, control)
    }

    /// Signal that landmark or path records of `building` changed.
    ///
    /// The cached snapshot is dropped; the next request rebuilds it.
    pub fn invalidate(&self, building: BuildingId) {
        let dropped = self.cache().invalidate(building);
        debug!(building, dropped, "building data changed");
    }

    /// Rebuild the snapshot for `building` right away and swap it in.
    pub fn refresh(&self, building: BuildingId) -> Result<Arc<GraphModel>> {
        self.cache().refresh(building, &self.source)
    }

    pub fn create_session(
        &self,
        route: RouteResult,
        building: BuildingId,
        from: LandmarkId,
        to: LandmarkId,
        context: SessionContext,
    ) -> Result<NavigationSession> {
        self.sessions
            .create_session(route, building, from, to, context)
    }

    pub fn transition_session(
        &self,
        session: SessionId,
        target: SessionStatus,
        actual_time: Option<f64>,
    ) -> Result<NavigationSession> {
        self.sessions.transition(session, target, actual_time)
    }

    pub fn attach_feedback(
        &self,
        session: SessionId,
        rating: u8,
        comment: Option<String>,
    ) -> Result<NavigationSession> {
        self.sessions.attach_feedback(session, rating, comment)
    }
}
