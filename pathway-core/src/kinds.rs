//! The closed taxonomy of 14 event kinds and their per-kind payload schemas.
//!
//! `EventKind` is the discriminant an envelope's `type` field carries.
//! `EventPayload` is the matching discriminated union: the variant tag on
//! the wire is the same string as `EventKind`'s serde rename, so a mismatch
//! between envelope `type` and payload shape is a deserialization error,
//! not a runtime check the caller has to perform separately.

use crate::ids::{ArtifactId, EventId, WaypointId};
use serde::{Deserialize, Serialize};

/// Discriminant naming which of the 14 kinds an event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    IntentCreated,
    TrailVersionCreated,
    WaypointEntered,
    ChoiceMade,
    StepCompleted,
    Blocked,
    Backtracked,
    Replanned,
    Merged,
    ArtifactCreated,
    ArtifactSuperseded,
    PreferenceLearned,
    ConceptLearned,
    ConstraintLearned,
}

impl EventKind {
    /// The wire discriminant string, matching `EventPayload`'s serde tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::IntentCreated => "IntentCreated",
            EventKind::TrailVersionCreated => "TrailVersionCreated",
            EventKind::WaypointEntered => "WaypointEntered",
            EventKind::ChoiceMade => "ChoiceMade",
            EventKind::StepCompleted => "StepCompleted",
            EventKind::Blocked => "Blocked",
            EventKind::Backtracked => "Backtracked",
            EventKind::Replanned => "Replanned",
            EventKind::Merged => "Merged",
            EventKind::ArtifactCreated => "ArtifactCreated",
            EventKind::ArtifactSuperseded => "ArtifactSuperseded",
            EventKind::PreferenceLearned => "PreferenceLearned",
            EventKind::ConceptLearned => "ConceptLearned",
            EventKind::ConstraintLearned => "ConstraintLearned",
        }
    }
}

/// Closed set of block categories. The source domain leaves this open-ended;
/// this implementation closes it, with `Other` as the escape hatch for the
/// cases the closed set doesn't name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockCategory {
    Dependency,
    KnowledgeGap,
    External,
    Ambiguity,
    Other,
}

/// Closed set of artifact types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactType {
    Code,
    Doc,
    Config,
    Data,
    Other,
}

/// Whether producing an artifact had side effects beyond the session itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SideEffect {
    None,
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentCreatedPayload {
    pub goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailVersionCreatedPayload {
    pub version: u32,
    pub waypoints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointEnteredPayload {
    pub waypoint_id: WaypointId,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMadePayload {
    pub options: Vec<String>,
    pub chosen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCompletedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoint_id: Option<WaypointId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<EventId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedPayload {
    pub category: BlockCategory,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktrackedPayload {
    pub target_event_id: EventId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplannedPayload {
    pub new_trail_version: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPayload {
    pub source_head_ids: Vec<String>,
    pub into_head_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactCreatedPayload {
    pub artifact_id: ArtifactId,
    pub artifact_type: ArtifactType,
    pub side_effects: SideEffect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<EventId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSupersededPayload {
    pub old_artifact_id: ArtifactId,
    pub new_artifact_id: ArtifactId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceLearnedPayload {
    pub key: String,
    pub value: String,
    pub confidence_delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptLearnedPayload {
    pub concept_id: String,
    pub summary: String,
    pub confidence_delta: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_event_id: Option<EventId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintLearnedPayload {
    pub key: String,
    pub value: String,
    pub confidence_delta: f64,
}

/// The closed tagged union over all 14 event kinds.
///
/// `#[serde(tag = "type")]` makes the wire representation match the
/// envelope's own `type` discriminant: a JSON payload object carries its
/// own `type` string matching one of [`EventKind`]'s variants, so decoding
/// a payload and checking it against the envelope's declared kind collapse
/// into one deserialization step at the call site (see
/// [`crate::validate::validate_payload_kind`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    IntentCreated(IntentCreatedPayload),
    TrailVersionCreated(TrailVersionCreatedPayload),
    WaypointEntered(WaypointEnteredPayload),
    ChoiceMade(ChoiceMadePayload),
    StepCompleted(StepCompletedPayload),
    Blocked(BlockedPayload),
    Backtracked(BacktrackedPayload),
    Replanned(ReplannedPayload),
    Merged(MergedPayload),
    ArtifactCreated(ArtifactCreatedPayload),
    ArtifactSuperseded(ArtifactSupersededPayload),
    PreferenceLearned(PreferenceLearnedPayload),
    ConceptLearned(ConceptLearnedPayload),
    ConstraintLearned(ConstraintLearnedPayload),
}

impl EventPayload {
    /// The [`EventKind`] this payload variant corresponds to.
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::IntentCreated(_) => EventKind::IntentCreated,
            EventPayload::TrailVersionCreated(_) => EventKind::TrailVersionCreated,
            EventPayload::WaypointEntered(_) => EventKind::WaypointEntered,
            EventPayload::ChoiceMade(_) => EventKind::ChoiceMade,
            EventPayload::StepCompleted(_) => EventKind::StepCompleted,
            EventPayload::Blocked(_) => EventKind::Blocked,
            EventPayload::Backtracked(_) => EventKind::Backtracked,
            EventPayload::Replanned(_) => EventKind::Replanned,
            EventPayload::Merged(_) => EventKind::Merged,
            EventPayload::ArtifactCreated(_) => EventKind::ArtifactCreated,
            EventPayload::ArtifactSuperseded(_) => EventKind::ArtifactSuperseded,
            EventPayload::PreferenceLearned(_) => EventKind::PreferenceLearned,
            EventPayload::ConceptLearned(_) => EventKind::ConceptLearned,
            EventPayload::ConstraintLearned(_) => EventKind::ConstraintLearned,
        }
    }
}
