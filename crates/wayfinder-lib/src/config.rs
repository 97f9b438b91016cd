//! Navigator configuration.
//!
//! # Environment Variables
//!
//! - `WAYFINDER_ALGORITHM`: default search algorithm, `dijkstra` (default) or `a-star`
//! - `WAYFINDER_SEARCH_DEADLINE_MS`: per-search deadline in milliseconds (unset means none)

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::routing::RouteAlgorithm;

pub const ALGORITHM_ENV: &str = "WAYFINDER_ALGORITHM";
pub const SEARCH_DEADLINE_ENV: &str = "WAYFINDER_SEARCH_DEADLINE_MS";

/// Runtime settings for a [`Navigator`](crate::Navigator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// Algorithm used when a request does not name one.
    pub default_algorithm: RouteAlgorithm,
    /// Upper bound on the wall-clock time of a single search.
    pub search_timeout: Option<Duration>,
}

impl NavigatorConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and replaced by their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_algorithm = match lookup(ALGORITHM_ENV) {
            Some(raw) => raw.parse::<RouteAlgorithm>().unwrap_or_else(|err| {
                warn!(value = %raw, error = %err, "ignoring {}", ALGORITHM_ENV);
                RouteAlgorithm::default()
            }),
            None => RouteAlgorithm::default(),
        };

        let search_timeout = lookup(SEARCH_DEADLINE_ENV).and_then(|raw| {
            match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(millis) => Some(Duration::from_millis(millis)),
                Err(err) => {
                    warn!(value = %raw, error = %err, "ignoring {}", SEARCH_DEADLINE_ENV);
                    None
                }
            }
        });

        Self {
            default_algorithm,
            search_timeout,
        }
    }

    pub fn with_algorithm(mut self, algorithm: RouteAlgorithm) -> Self {
        self.default_algorithm = algorithm;
        self
    }

    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = Some(timeout);
        self
    }
}
