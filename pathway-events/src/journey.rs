//! Journey reducer: position, branch topology, and waypoint history.
//!
//! Folds a session's event stream, in `seq` order, into a [`JourneyView`].
//! The fold is a single left-to-right pass; no reducer here holds state
//! beyond the running view being built.

use pathway_core::{EventId, EventKind, EventPayload, HeadId, JourneyView, StoredEvent, VisitedEntry};
use std::collections::HashMap;

/// The event kinds that move a head's logical position (as opposed to
/// merely advancing its tip). `Backtracked` is handled separately since it
/// moves position to an event *other* than itself.
fn moves_position_on_kind(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::WaypointEntered | EventKind::ChoiceMade | EventKind::StepCompleted | EventKind::Blocked
    )
}

/// Folds `events` (already in `seq` order) into a [`JourneyView`].
///
/// `events` is expected to belong to a single session; the reducer does not
/// itself enforce that, mirroring the rest of this crate's reducers.
pub fn reduce_journey(events: &[StoredEvent]) -> JourneyView {
    let mut branch_tips: HashMap<HeadId, EventId> = HashMap::new();
    let mut positions: HashMap<HeadId, EventId> = HashMap::new();
    let mut visited: Vec<VisitedEntry> = Vec::new();
    let mut active_head_id = HeadId::default();

    for event in events {
        active_head_id = event.head_id.clone();

        match &event.payload {
            EventPayload::Merged(payload) => {
                for source in &payload.source_head_ids {
                    branch_tips.remove(&HeadId::new(source.as_str()));
                }
                let into = HeadId::new(payload.into_head_id.as_str());
                branch_tips.insert(into, event.event_id.clone());
            }
            EventPayload::Backtracked(payload) => {
                branch_tips.insert(event.head_id.clone(), event.event_id.clone());
                positions.insert(event.head_id.clone(), payload.target_event_id.clone());
            }
            _ => {
                branch_tips.insert(event.head_id.clone(), event.event_id.clone());

                if let Some(waypoint_id) = &event.waypoint_id {
                    visited.push(VisitedEntry {
                        waypoint_id: waypoint_id.clone(),
                        event_id: event.event_id.clone(),
                        ts: event.ts,
                    });
                    positions.insert(event.head_id.clone(), event.event_id.clone());
                } else if moves_position_on_kind(event.kind) {
                    positions.insert(event.head_id.clone(), event.event_id.clone());
                }
            }
        }
    }

    let position_event_id = positions.get(&active_head_id).cloned();

    let backtrack_targets = position_event_id
        .as_ref()
        .map(|pos| ancestor_chain(events, pos))
        .unwrap_or_default();

    JourneyView {
        active_head_id,
        position_event_id,
        branch_tips,
        visited,
        backtrack_targets,
    }
}

/// Walks `parent_event_id` links starting at `from`'s parent, returning the
/// ancestor chain (nearest first), excluding `from` itself.
fn ancestor_chain(events: &[StoredEvent], from: &EventId) -> Vec<EventId> {
    let by_id: HashMap<&EventId, &StoredEvent> = events.iter().map(|e| (&e.event_id, e)).collect();

    let mut chain = Vec::new();
    let mut current = by_id.get(from).and_then(|e| e.parent_event_id.as_ref());
    while let Some(event_id) = current {
        chain.push(event_id.clone());
        current = by_id.get(event_id).and_then(|e| e.parent_event_id.as_ref());
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathway_test_utils::fixtures;

    #[test]
    fn empty_stream_yields_empty_view() {
        let view = reduce_journey(&[]);
        assert!(view.position_event_id.is_none());
        assert!(view.branch_tips.is_empty());
        assert!(view.visited.is_empty());
    }

    #[test]
    fn waypoint_entered_sets_position_and_visited() {
        let events = fixtures::intent_then_waypoint("s1", "w1");
        let view = reduce_journey(&events);
        assert_eq!(view.visited.len(), 1);
        assert_eq!(view.position_event_id, Some(events[1].event_id.clone()));
    }

    #[test]
    fn backtrack_moves_position_without_truncating_visited() {
        let events = fixtures::learning_persists_across_backtrack("s2");
        let view = reduce_journey(&events);
        assert_eq!(view.position_event_id, Some(events[0].event_id.clone()));
        assert_eq!(view.visited.len(), 1);
    }

    #[test]
    fn divergent_parent_creates_second_branch_tip() {
        let events = fixtures::divergent_branch("s3");
        let view = reduce_journey(&events);
        assert_eq!(view.branch_tips.len(), 2);
        assert_eq!(view.active_head_id, HeadId::new("alt"));
    }
}
