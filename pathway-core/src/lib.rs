//! Pathway Core - event taxonomy, envelope, validation, config, and errors.
//!
//! Pure data structures and the validation rules that govern them. No I/O,
//! no storage, no reducer logic — those live in `pathway-storage` and
//! `pathway-events`, both of which depend on this crate.

mod config;
mod envelope;
mod error;
mod ids;
mod kinds;
mod validate;
mod views;

pub use config::{PathwayConfig, DEFAULT_MAX_PAYLOAD_SIZE, DEFAULT_SESSION_ID_MAX_LENGTH};
pub use envelope::{NewEvent, StoredEvent};
pub use error::{PathwayError, PathwayResult};
pub use ids::{Actor, ActorKind, ArtifactId, EventId, HeadId, SessionId, WaypointId, MAX_ID_LENGTH};
pub use kinds::{
    ArtifactCreatedPayload, ArtifactSupersededPayload, ArtifactType, BacktrackedPayload,
    BlockCategory, BlockedPayload, ChoiceMadePayload, ConceptLearnedPayload,
    ConstraintLearnedPayload, EventKind, EventPayload, IntentCreatedPayload,
    MergedPayload, PreferenceLearnedPayload, ReplannedPayload, SideEffect,
    StepCompletedPayload, TrailVersionCreatedPayload, WaypointEnteredPayload,
};
pub use validate::{
    validate_event_id, validate_merge_sources, validate_payload_size, validate_session_id,
    validate_smaller_seq, validate_ts_non_decreasing,
};
pub use views::{
    ArtifactEntry, ArtifactView, ConceptEntry, JourneyView, LearnedView, ReducerWarning,
    SessionState, ValueEntry, VisitedEntry,
};
