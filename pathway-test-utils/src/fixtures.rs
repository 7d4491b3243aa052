//! Literal event streams from the spec's scenario battery (§8), assembled
//! directly as [`StoredEvent`]s so reducer tests can exercise them without
//! going through a store.

use chrono::{DateTime, TimeZone, Utc};
use pathway_core::{
    Actor, ArtifactCreatedPayload, ArtifactSupersededPayload, ArtifactType, BacktrackedPayload,
    EventId, EventPayload, HeadId, IntentCreatedPayload, PreferenceLearnedPayload, SessionId,
    SideEffect, StoredEvent, WaypointEnteredPayload, WaypointId,
};

/// Builds a `Vec<StoredEvent>` with contiguous seqs starting at 1 and
/// strictly increasing timestamps, one second apart, so fixtures read as a
/// literal, ordered session history.
pub struct EventSeqBuilder {
    session_id: SessionId,
    events: Vec<StoredEvent>,
    base_ts: DateTime<Utc>,
}

impl EventSeqBuilder {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: SessionId::new(session_id.into()),
            events: Vec::new(),
            base_ts: Utc.timestamp_opt(1_700_000_000, 0).single().unwrap(),
        }
    }

    fn next_ts(&self) -> DateTime<Utc> {
        self.base_ts + chrono::Duration::seconds(self.events.len() as i64)
    }

    /// Appends an event on `head_id`, optionally chained to `parent`, with
    /// optional `waypoint_id`. Returns the freshly minted event so callers
    /// can chain it as a later event's parent.
    pub fn push(
        &mut self,
        head_id: &str,
        parent: Option<&EventId>,
        waypoint_id: Option<WaypointId>,
        payload: EventPayload,
    ) -> EventId {
        let event_id = EventId::generate();
        let seq = self.events.len() as u64 + 1;
        let kind = payload.kind();
        self.events.push(StoredEvent {
            event_id: event_id.clone(),
            session_id: self.session_id.clone(),
            seq,
            kind,
            ts: self.next_ts(),
            actor: Actor::system(),
            head_id: HeadId::new(head_id),
            parent_event_id: parent.cloned(),
            waypoint_id,
            payload,
        });
        event_id
    }

    pub fn build(self) -> Vec<StoredEvent> {
        self.events
    }
}

/// `IntentCreated`, then `WaypointEntered{waypoint_id}`, both on `main`.
pub fn intent_then_waypoint(session_id: &str, waypoint_id: &str) -> Vec<StoredEvent> {
    let mut b = EventSeqBuilder::new(session_id);
    b.push(
        "main",
        None,
        None,
        EventPayload::IntentCreated(IntentCreatedPayload {
            goal: "learn rust".to_string(),
            context: None,
        }),
    );
    b.push(
        "main",
        None,
        Some(WaypointId::new(waypoint_id)),
        EventPayload::WaypointEntered(WaypointEnteredPayload {
            waypoint_id: WaypointId::new(waypoint_id),
            kind: "lesson".to_string(),
        }),
    );
    b.build()
}

/// Spec §8 scenario 2: learning persists across backtrack.
///
/// `IntentCreated{goal:"x"}`, `WaypointEntered{w:"w1"}`,
/// `PreferenceLearned{k:"style", v:"terse", δ:0.5}`,
/// `Backtracked{target: first event_id}`.
pub fn learning_persists_across_backtrack(session_id: &str) -> Vec<StoredEvent> {
    let mut b = EventSeqBuilder::new(session_id);
    let first = b.push(
        "main",
        None,
        None,
        EventPayload::IntentCreated(IntentCreatedPayload {
            goal: "x".to_string(),
            context: None,
        }),
    );
    b.push(
        "main",
        Some(&first),
        Some(WaypointId::new("w1")),
        EventPayload::WaypointEntered(WaypointEnteredPayload {
            waypoint_id: WaypointId::new("w1"),
            kind: "lesson".to_string(),
        }),
    );
    b.push(
        "main",
        None,
        None,
        EventPayload::PreferenceLearned(PreferenceLearnedPayload {
            key: "style".to_string(),
            value: "terse".to_string(),
            confidence_delta: 0.5,
        }),
    );
    b.push(
        "main",
        None,
        None,
        EventPayload::Backtracked(BacktrackedPayload {
            target_event_id: first,
            reason: None,
        }),
    );
    b.build()
}

/// Spec §8 scenario 3: branching on divergent parent.
///
/// Event A (waypoint w1, main), event B with `parent=A` (waypoint w2,
/// head_id=main), event C with `parent=A` (waypoint w3, head_id=alt).
pub fn divergent_branch(session_id: &str) -> Vec<StoredEvent> {
    let mut b = EventSeqBuilder::new(session_id);
    let a = b.push(
        "main",
        None,
        Some(WaypointId::new("w1")),
        EventPayload::WaypointEntered(WaypointEnteredPayload {
            waypoint_id: WaypointId::new("w1"),
            kind: "lesson".to_string(),
        }),
    );
    b.push(
        "main",
        Some(&a),
        Some(WaypointId::new("w2")),
        EventPayload::WaypointEntered(WaypointEnteredPayload {
            waypoint_id: WaypointId::new("w2"),
            kind: "lesson".to_string(),
        }),
    );
    b.push(
        "alt",
        Some(&a),
        Some(WaypointId::new("w3")),
        EventPayload::WaypointEntered(WaypointEnteredPayload {
            waypoint_id: WaypointId::new("w3"),
            kind: "lesson".to_string(),
        }),
    );
    b.build()
}

/// Spec §8 scenario 4: supersedence chain `a1 → a2 → a3`.
pub fn supersedence_chain(session_id: &str) -> Vec<StoredEvent> {
    let mut b = EventSeqBuilder::new(session_id);
    b.push(
        "main",
        None,
        None,
        EventPayload::ArtifactCreated(ArtifactCreatedPayload {
            artifact_id: "a1".into(),
            artifact_type: ArtifactType::Code,
            side_effects: SideEffect::None,
            uri: None,
            evidence: Vec::new(),
        }),
    );
    b.push(
        "main",
        None,
        None,
        EventPayload::ArtifactCreated(ArtifactCreatedPayload {
            artifact_id: "a2".into(),
            artifact_type: ArtifactType::Code,
            side_effects: SideEffect::None,
            uri: None,
            evidence: Vec::new(),
        }),
    );
    b.push(
        "main",
        None,
        None,
        EventPayload::ArtifactSuperseded(ArtifactSupersededPayload {
            old_artifact_id: "a1".into(),
            new_artifact_id: "a2".into(),
            reason: None,
        }),
    );
    b.push(
        "main",
        None,
        None,
        EventPayload::ArtifactCreated(ArtifactCreatedPayload {
            artifact_id: "a3".into(),
            artifact_type: ArtifactType::Code,
            side_effects: SideEffect::None,
            uri: None,
            evidence: Vec::new(),
        }),
    );
    b.push(
        "main",
        None,
        None,
        EventPayload::ArtifactSuperseded(ArtifactSupersededPayload {
            old_artifact_id: "a2".into(),
            new_artifact_id: "a3".into(),
            reason: None,
        }),
    );
    b.build()
}

/// Spec §8 scenario 5: three `PreferenceLearned{k:"x", v:"y", δ:0.6}` events
/// clamp to confidence `1.0`, not `1.8`.
pub fn confidence_clamp(session_id: &str) -> Vec<StoredEvent> {
    let mut b = EventSeqBuilder::new(session_id);
    for _ in 0..3 {
        b.push(
            "main",
            None,
            None,
            EventPayload::PreferenceLearned(PreferenceLearnedPayload {
                key: "x".to_string(),
                value: "y".to_string(),
                confidence_delta: 0.6,
            }),
        );
    }
    b.build()
}
