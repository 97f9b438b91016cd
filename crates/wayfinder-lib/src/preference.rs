//! Preference profiles and the edge rules derived from them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::PathRecord;

/// Caller supplied routing constraints and objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceProfile {
    /// Exclude paths that require stairs.
    pub avoid_stairs: bool,
    /// Only use paths marked wheelchair accessible.
    pub wheelchair_accessible: bool,
    /// Optimize walking distance when `true`, estimated time otherwise.
    pub shortest_distance: bool,
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        Self {
            avoid_stairs: false,
            wheelchair_accessible: false,
            shortest_distance: true,
        }
    }
}

impl PreferenceProfile {
    /// Profile for a wheelchair user; implies avoiding stairs.
    pub fn wheelchair() -> Self {
        Self {
            avoid_stairs: true,
            wheelchair_accessible: true,
            ..Self::default()
        }
    }

    /// Whether the profile excludes any edge at all.
    pub fn is_restrictive(&self) -> bool {
        self.avoid_stairs || self.wheelchair_accessible
    }

    pub fn objective(&self) -> Objective {
        if self.shortest_distance {
            Objective::Distance
        } else {
            Objective::Time
        }
    }
}

/// Weight dimension optimized by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Distance,
    Time,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Objective::Distance => "distance",
            Objective::Time => "time",
        };
        f.write_str(value)
    }
}

/// Strategy selecting the weight of a path for the search.
///
/// Implementations must return finite, strictly positive weights for any path
/// accepted by the graph builder.
pub trait WeightSelector: Send + Sync + fmt::Debug {
    fn weight(&self, path: &PathRecord) -> f64;

    /// Whether planar floor distance is a lower bound for this weight.
    fn is_metric(&self) -> bool {
        false
    }
}

/// Weights paths by walking distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceWeight;

impl WeightSelector for DistanceWeight {
    fn weight(&self, path: &PathRecord) -> f64 {
        path.distance
    }

    fn is_metric(&self) -> bool {
        true
    }
}

/// Weights paths by estimated walking time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeWeight;

impl WeightSelector for TimeWeight {
    fn weight(&self, path: &PathRecord) -> f64 {
        path.estimated_time
    }
}

/// Edge eligibility predicate and weight function derived from a profile.
#[derive(Debug, Clone)]
pub struct PreferenceEvaluator {
    profile: PreferenceProfile,
    selector: Arc<dyn WeightSelector>,
}

impl PreferenceEvaluator {
    pub fn new(profile: PreferenceProfile) -> Self {
        let selector: Arc<dyn WeightSelector> = match profile.objective() {
            Objective::Distance => Arc::new(DistanceWeight),
            Objective::Time => Arc::new(TimeWeight),
        };
        Self { profile, selector }
    }

    /// Replace the weight strategy while keeping the eligibility rules.
    pub fn with_selector(mut self, selector: Arc<dyn WeightSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn profile(&self) -> &PreferenceProfile {
        &self.profile
    }

    /// Whether a path may be traversed under this profile.
    pub fn allows(&self, path: &PathRecord) -> bool {
        if self.profile.avoid_stairs && path.requires_stairs {
            return false;
        }
        if self.profile.wheelchair_accessible && !path.wheelchair_accessible {
            return false;
        }
        true
    }

    pub fn weight(&self, path: &PathRecord) -> f64 {
        self.selector.weight(path)
    }

    pub(crate) fn supports_planar_heuristic(&self) -> bool {
        self.selector.is_metric()
    }
}

impl Default for PreferenceEvaluator {
    fn default() -> Self {
        Self::new(PreferenceProfile::default())
    }
}
