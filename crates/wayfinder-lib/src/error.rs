use std::path::PathBuf;

use thiserror::Error;

use crate::model::{BuildingId, LandmarkId};
use crate::session::{SessionId, SessionStatus};

/// Convenient result alias for the Wayfinder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// An unreachable destination is deliberately absent: searches report it as
/// `RouteResult::reachable == false`.
#[derive(Debug, Error)]
pub enum Error {
    /// Source or destination landmark is missing, inactive, or belongs to
    /// another building.
    #[error("invalid landmark reference {landmark} in building {building}: {reason}")]
    InvalidReference {
        building: BuildingId,
        landmark: LandmarkId,
        reason: String,
    },

    /// The building source has no record for the requested building.
    #[error("unknown building {building}")]
    UnknownBuilding { building: BuildingId },

    /// Raised when a session status change or feedback attach is not legal
    /// for the session's current status.
    #[error("cannot {action} session {session} in status {status}: {reason}")]
    InvalidTransition {
        session: SessionId,
        status: SessionStatus,
        action: String,
        reason: String,
    },

    /// Raised when a session identifier is not tracked.
    #[error("navigation session {session} not found")]
    SessionNotFound { session: SessionId },

    /// Raised when a feedback rating falls outside 1..=5.
    #[error("feedback rating must be between 1 and 5, got {rating}")]
    InvalidFeedback { rating: u8 },

    /// Raised when a session is requested for a route that was not reachable.
    #[error("cannot start a navigation session for an unreachable route from {from} to {to}")]
    UnreachableRoute { from: LandmarkId, to: LandmarkId },

    /// The caller raised the cancellation flag while the search was running.
    #[error("route search was cancelled")]
    SearchCancelled,

    /// The search ran past the caller supplied deadline.
    #[error("route search exceeded its deadline")]
    DeadlineExceeded,

    /// Raised when a building snapshot file does not exist.
    #[error("building snapshot not found at {path}")]
    SnapshotNotFound { path: PathBuf },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_reference(
        building: BuildingId,
        landmark: LandmarkId,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidReference {
            building,
            landmark,
            reason: reason.into(),
        }
    }
}
