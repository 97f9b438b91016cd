//! Navigation session tracking.
//!
//! A session wraps a computed [`RouteResult`] while the user walks it. Its
//! status only moves forward:
//!
//! ```text
//! started ──► in_progress ──► completed
//!    │             │
//!    └─────────────┴────────► cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. Mutations of one session are
//! serialized by a per-session lock; different sessions never contend.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{BuildingId, LandmarkId};
use crate::output::RouteResult;

/// Identifier of a navigation session.
pub type SessionId = Uuid;

/// Lifecycle status of a navigation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Started,
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SessionStatus::Started => "started",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        };
        f.write_str(value)
    }
}

/// Caller identity attached to a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_session: Option<String>,
}

/// Rating and comment left after completing a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFeedback {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// A computed route being walked by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSession {
    pub id: SessionId,
    pub context: SessionContext,
    pub building: BuildingId,
    pub from: LandmarkId,
    pub to: LandmarkId,
    pub route: RouteResult,
    pub total_distance: f64,
    pub total_estimated_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_time: Option<f64>,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<SessionFeedback>,
}

impl NavigationSession {
    fn invalid(&self, action: &str, reason: impl Into<String>) -> Error {
        Error::InvalidTransition {
            session: self.id,
            status: self.status,
            action: action.to_string(),
            reason: reason.into(),
        }
    }

    /// Apply a status change, leaving the session untouched on failure.
    fn transition(&mut self, target: SessionStatus, actual_time: Option<f64>) -> Result<()> {
        let action = format!("move to {target}");
        if self.status.is_terminal() {
            return Err(self.invalid(&action, "session already finished"));
        }

        let now = Utc::now();
        match target {
            SessionStatus::Started => {
                return Err(self.invalid(&action, "sessions cannot return to started"));
            }
            SessionStatus::InProgress => {}
            SessionStatus::Completed => {
                let actual = actual_time
                    .ok_or_else(|| self.invalid(&action, "an actual time is required"))?;
                if !actual.is_finite() || actual < 0.0 {
                    return Err(self.invalid(&action, "actual time must be a non-negative number"));
                }
                self.actual_time = Some(actual);
                self.completed_at = Some(now);
            }
            SessionStatus::Cancelled => {}
        }

        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    fn attach_feedback(&mut self, rating: u8, comment: Option<String>) -> Result<()> {
        if self.status != SessionStatus::Completed {
            return Err(self.invalid("attach feedback to", "only completed sessions accept feedback"));
        }
        if !(1..=5).contains(&rating) {
            return Err(Error::InvalidFeedback { rating });
        }

        let now = Utc::now();
        self.feedback = Some(SessionFeedback {
            rating,
            comment: comment.filter(|text| !text.trim().is_empty()),
            submitted_at: now,
        });
        self.updated_at = now;
        Ok(())
    }
}

/// In-memory registry of navigation sessions.
///
/// Sessions are never removed; retention belongs to the persistence layer,
/// which reads them back through [`SessionTracker::get`].
#[derive(Debug, Default)]
pub struct SessionTracker {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<NavigationSession>>>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a session for a reachable route.
    pub fn create_session(
        &self,
        route: RouteResult,
        building: BuildingId,
        from: LandmarkId,
        to: LandmarkId,
        context: SessionContext,
    ) -> Result<NavigationSession> {
        if !route.reachable {
            return Err(Error::UnreachableRoute { from, to });
        }

        let now = Utc::now();
        let session = NavigationSession {
            id: Uuid::now_v7(),
            context,
            building,
            from,
            to,
            total_distance: route.total_distance,
            total_estimated_time: route.total_estimated_time,
            route,
            actual_time: None,
            status: SessionStatus::Started,
            started_at: now,
            updated_at: now,
            completed_at: None,
            feedback: None,
        };

        self.sessions
            .write()
            .insert(session.id, Arc::new(Mutex::new(session.clone())));
        info!(session = %session.id, building, from, to, "navigation session started");
        Ok(session)
    }

    /// Move a session to `target`. `actual_time` is required for completion.
    pub fn transition(
        &self,
        session: SessionId,
        target: SessionStatus,
        actual_time: Option<f64>,
    ) -> Result<NavigationSession> {
        let entry = self.entry(session)?;
        let mut guard = entry.lock();
        let previous = guard.status;
        guard.transition(target, actual_time)?;
        debug!(session = %session, from = %previous, to = %target, "session status changed");
        Ok(guard.clone())
    }

    /// Attach feedback to a completed session.
    pub fn attach_feedback(
        &self,
        session: SessionId,
        rating: u8,
        comment: Option<String>,
    ) -> Result<NavigationSession> {
        let entry = self.entry(session)?;
        let mut guard = entry.lock();
        guard.attach_feedback(rating, comment)?;
        debug!(session = %session, rating, "session feedback recorded");
        Ok(guard.clone())
    }

    pub fn get(&self, session: SessionId) -> Option<NavigationSession> {
        self.sessions
            .read()
            .get(&session)
            .map(|entry| entry.lock().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn entry(&self, session: SessionId) -> Result<Arc<Mutex<NavigationSession>>> {
        self.sessions
            .read()
            .get(&session)
            .cloned()
            .ok_or(Error::SessionNotFound { session })
    }
}
