//! Derived views produced by the three reducers and composed by the session composer.

use crate::ids::{ArtifactId, EventId, HeadId, WaypointId};
use crate::kinds::ArtifactType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A non-fatal anomaly encountered while folding events. Never aborts a
/// fold; always collected and returned alongside the view it annotates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReducerWarning {
    /// A second `ArtifactCreated` named an `artifact_id` already present.
    /// The first entry is kept; this one is dropped from the view.
    DuplicateArtifact { artifact_id: ArtifactId, event_id: EventId },
    /// Following `superseded_by` links formed a cycle. The cycle is broken
    /// at the repeating node; the rest of the chain remains usable.
    SupersedenceCycle { artifact_id: ArtifactId },
    /// An `ArtifactSuperseded` named a `new_artifact_id` that never
    /// appeared in the stream.
    DanglingSupersedence {
        old_artifact_id: ArtifactId,
        new_artifact_id: ArtifactId,
    },
}

/// One visited waypoint: where, on what event, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitedEntry {
    pub waypoint_id: WaypointId,
    pub event_id: EventId,
    pub ts: DateTime<Utc>,
}

/// Position, branch topology, and trail history for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyView {
    pub active_head_id: HeadId,
    pub position_event_id: Option<EventId>,
    pub branch_tips: HashMap<HeadId, EventId>,
    pub visited: Vec<VisitedEntry>,
    pub backtrack_targets: Vec<EventId>,
}

impl JourneyView {
    pub fn empty() -> Self {
        Self {
            active_head_id: HeadId::default(),
            position_event_id: None,
            branch_tips: HashMap::new(),
            visited: Vec::new(),
            backtrack_targets: Vec::new(),
        }
    }
}

/// A learned preference or constraint: single current value plus confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    pub value: String,
    pub confidence: f64,
    pub first_seen_seq: u64,
    pub last_updated_seq: u64,
}

/// A learned concept: summary plus accumulated evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptEntry {
    pub summary: String,
    pub confidence: f64,
    pub evidence_event_ids: Vec<EventId>,
    pub first_seen_seq: u64,
    pub last_updated_seq: u64,
}

/// Preferences, concepts, and constraints learned across the whole session,
/// independent of branch or backtrack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedView {
    pub preferences: HashMap<String, ValueEntry>,
    pub concepts: HashMap<String, ConceptEntry>,
    pub constraints: HashMap<String, ValueEntry>,
}

impl LearnedView {
    pub fn empty() -> Self {
        Self {
            preferences: HashMap::new(),
            concepts: HashMap::new(),
            constraints: HashMap::new(),
        }
    }
}

/// One tracked artifact: its type, provenance, and supersedence link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub artifact_type: ArtifactType,
    pub created_event_id: EventId,
    pub waypoint_id: Option<WaypointId>,
    pub superseded_by: Option<ArtifactId>,
}

/// Active/superseded artifacts and their supersedence chains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactView {
    pub artifacts: HashMap<ArtifactId, ArtifactEntry>,
    pub chains: Vec<Vec<ArtifactId>>,
}

impl ArtifactView {
    pub fn empty() -> Self {
        Self {
            artifacts: HashMap::new(),
            chains: Vec::new(),
        }
    }

    /// Artifacts whose `superseded_by` is unset.
    pub fn active_artifacts(&self) -> Vec<&ArtifactId> {
        self.artifacts
            .iter()
            .filter(|(_, entry)| entry.superseded_by.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Artifacts whose `superseded_by` is set.
    pub fn superseded_artifacts(&self) -> Vec<&ArtifactId> {
        self.artifacts
            .iter()
            .filter(|(_, entry)| entry.superseded_by.is_some())
            .map(|(id, _)| id)
            .collect()
    }
}

/// The composite snapshot over one session's event stream: all three
/// reducers' views plus event-count bookkeeping, and the union of every
/// warning any reducer raised along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub journey: JourneyView,
    pub learned: LearnedView,
    pub artifacts: ArtifactView,
    pub event_count: u64,
    pub latest_seq: u64,
    pub warnings: Vec<ReducerWarning>,
}

impl SessionState {
    pub fn empty() -> Self {
        Self {
            journey: JourneyView::empty(),
            learned: LearnedView::empty(),
            artifacts: ArtifactView::empty(),
            event_count: 0,
            latest_seq: 0,
            warnings: Vec::new(),
        }
    }
}
