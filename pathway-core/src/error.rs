//! Error types surfaced by Pathway's ingest and read paths.

use crate::ids::{EventId, SessionId};
use thiserror::Error;

/// All error kinds the core surfaces across `append`/`get_*`/`list_sessions`.
///
/// Reducer anomalies are deliberately excluded from this enum: they are
/// non-fatal by spec, never abort an operation, and are reported through
/// [`crate::views::ReducerWarning`] attached to the returned view instead.
/// Folding them in here would force callers to match on a variant that can
/// never actually cause a `Result::Err`.
#[derive(Debug, Error)]
pub enum PathwayError {
    #[error("invalid envelope: {reason}")]
    InvalidEnvelope { reason: String },

    #[error("unknown event kind: {kind}")]
    UnknownEventKind { kind: String },

    #[error("payload does not match schema for {kind:?}: {reason}")]
    PayloadSchemaMismatch {
        kind: crate::kinds::EventKind,
        reason: String,
    },

    #[error("unknown parent event {parent_event_id} in session {session_id}")]
    UnknownParent {
        session_id: SessionId,
        parent_event_id: EventId,
    },

    #[error("session_id {session_id:?} violates shape/length rules")]
    SessionIdShape { session_id: String },

    #[error("event_id {event_id:?} violates shape/length rules")]
    EventIdShape { event_id: String },

    #[error("seq {seq} already assigned in session {session_id}")]
    SeqConflict { session_id: SessionId, seq: u64 },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("store failure: {reason}")]
    StoreFailure { reason: String },
}

impl PathwayError {
    pub fn invalid_envelope(reason: impl Into<String>) -> Self {
        Self::InvalidEnvelope {
            reason: reason.into(),
        }
    }

    pub fn store_failure(reason: impl Into<String>) -> Self {
        Self::StoreFailure {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the workspace.
pub type PathwayResult<T> = Result<T, PathwayError>;

impl From<serde_json::Error> for PathwayError {
    fn from(err: serde_json::Error) -> Self {
        PathwayError::StoreFailure {
            reason: err.to_string(),
        }
    }
}
