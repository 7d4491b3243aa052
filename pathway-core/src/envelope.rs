//! The event envelope shared by all 14 event kinds.

use crate::ids::{Actor, EventId, HeadId, SessionId, WaypointId};
use crate::kinds::{EventKind, EventPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate event submitted to the store, before `seq` (and, optionally,
/// `event_id`) have been assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(default)]
    pub head_id: HeadId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoint_id: Option<WaypointId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Actor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<DateTime<Utc>>,
    pub payload: EventPayload,
}

impl NewEvent {
    /// Convenience constructor for the common case: no explicit id/seq/ts,
    /// default head, no parent.
    pub fn new(session_id: impl Into<SessionId>, payload: EventPayload) -> Self {
        Self {
            session_id: session_id.into(),
            event_id: None,
            seq: None,
            head_id: HeadId::default(),
            parent_event_id: None,
            waypoint_id: None,
            actor: None,
            ts: None,
            payload,
        }
    }

    pub fn with_head(mut self, head_id: impl Into<HeadId>) -> Self {
        self.head_id = head_id.into();
        self
    }

    pub fn with_parent(mut self, parent_event_id: impl Into<EventId>) -> Self {
        self.parent_event_id = Some(parent_event_id.into());
        self
    }

    pub fn with_waypoint(mut self, waypoint_id: impl Into<WaypointId>) -> Self {
        self.waypoint_id = Some(waypoint_id.into());
        self
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }
}

/// A durably stored event: every envelope field guaranteed set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub seq: u64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub ts: DateTime<Utc>,
    pub actor: Actor,
    pub head_id: HeadId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoint_id: Option<WaypointId>,
    pub payload: EventPayload,
}
