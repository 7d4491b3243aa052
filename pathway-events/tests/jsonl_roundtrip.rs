//! Spec §8 scenario 6, end to end: append a session to one store, export
//! it as JSONL, import into a fresh store under a new `session_id`, and
//! assert the two sessions reduce to the same `SessionState` modulo
//! `session_id` (which only shows up inside `JourneyView`/envelope fields
//! the composed view doesn't carry — confidence, positions, and chains are
//! all session-id-agnostic).

use pathway_core::{EventPayload, IntentCreatedPayload, PreferenceLearnedPayload, SessionId, WaypointEnteredPayload, WaypointId};
use pathway_events::get_session_state;
use pathway_storage::{export_session, import_events, EventFilter, EventStore, InMemoryEventStore};

#[tokio::test]
async fn export_import_reduces_identically_modulo_session_id() {
    let original = InMemoryEventStore::default();
    let session_id = SessionId::new("s-original");

    original
        .append(pathway_core::NewEvent::new(
            session_id.clone(),
            EventPayload::IntentCreated(IntentCreatedPayload {
                goal: "learn rust".to_string(),
                context: None,
            }),
        ))
        .await
        .unwrap();
    original
        .append(pathway_core::NewEvent::new(
            session_id.clone(),
            EventPayload::WaypointEntered(WaypointEnteredPayload {
                waypoint_id: WaypointId::new("w1"),
                kind: "lesson".to_string(),
            }),
        ))
        .await
        .unwrap();
    original
        .append(pathway_core::NewEvent::new(
            session_id.clone(),
            EventPayload::PreferenceLearned(PreferenceLearnedPayload {
                key: "style".to_string(),
                value: "terse".to_string(),
                confidence_delta: 0.5,
            }),
        ))
        .await
        .unwrap();

    let exported = original.get_events(&session_id, &EventFilter::default()).await.unwrap();
    let jsonl = export_session(&exported).unwrap();

    let imported_store = InMemoryEventStore::default();
    let override_id = SessionId::new("s-imported");
    let imported_events = import_events(&jsonl, Some(&override_id)).unwrap();
    for event in imported_events {
        imported_store
            .append(pathway_core::NewEvent {
                session_id: event.session_id,
                event_id: Some(event.event_id),
                seq: Some(event.seq),
                head_id: event.head_id,
                parent_event_id: event.parent_event_id,
                waypoint_id: event.waypoint_id,
                actor: Some(event.actor),
                ts: Some(event.ts),
                payload: event.payload,
            })
            .await
            .unwrap();
    }

    let original_state = get_session_state(&original, &session_id).await.unwrap();
    let imported_state = get_session_state(&imported_store, &override_id).await.unwrap();

    assert_eq!(original_state.event_count, imported_state.event_count);
    assert_eq!(original_state.latest_seq, imported_state.latest_seq);
    assert_eq!(original_state.learned, imported_state.learned);
    assert_eq!(original_state.artifacts, imported_state.artifacts);
    assert_eq!(original_state.journey.visited.len(), imported_state.journey.visited.len());
    assert_eq!(
        original_state.journey.position_event_id.is_some(),
        imported_state.journey.position_event_id.is_some()
    );
}
