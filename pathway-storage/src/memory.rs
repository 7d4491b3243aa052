//! `RwLock`-guarded in-memory [`EventStore`], for tests, embedding, and
//! single-process deployments that don't need durability across restarts.

use crate::store::{EventFilter, EventStore, Order, SessionSummary};
use async_trait::async_trait;
use chrono::Utc;
use pathway_core::{
    validate_event_id, validate_merge_sources, validate_payload_size, validate_session_id,
    validate_smaller_seq, validate_ts_non_decreasing, Actor, EventId, EventPayload, HeadId,
    NewEvent, PathwayConfig, PathwayError, PathwayResult, SessionId, StoredEvent,
};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct SessionData {
    events: Vec<StoredEvent>,
    by_id: HashMap<EventId, usize>,
    tips: HashMap<HeadId, EventId>,
}

impl SessionData {
    fn max_seq(&self) -> u64 {
        self.events.last().map(|e| e.seq).unwrap_or(0)
    }

    fn latest_ts(&self) -> Option<chrono::DateTime<Utc>> {
        self.events.last().map(|e| e.ts)
    }

    fn get(&self, event_id: &EventId) -> Option<&StoredEvent> {
        self.by_id.get(event_id).map(|&i| &self.events[i])
    }
}

/// Single-process, non-durable [`EventStore`] backed by an `RwLock`-guarded
/// per-session map. No lock is ever held across an `.await` point: all
/// work inside the guard is synchronous in-memory bookkeeping.
pub struct InMemoryEventStore {
    sessions: RwLock<HashMap<SessionId, SessionData>>,
    config: PathwayConfig,
}

impl InMemoryEventStore {
    pub fn new(config: PathwayConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    fn lock_read(&self) -> PathwayResult<std::sync::RwLockReadGuard<'_, HashMap<SessionId, SessionData>>> {
        self.sessions
            .read()
            .map_err(|_| PathwayError::store_failure("in-memory store lock poisoned"))
    }

    fn lock_write(&self) -> PathwayResult<std::sync::RwLockWriteGuard<'_, HashMap<SessionId, SessionData>>> {
        self.sessions
            .write()
            .map_err(|_| PathwayError::store_failure("in-memory store lock poisoned"))
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new(PathwayConfig::default())
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    #[tracing::instrument(skip(self, event), fields(session_id = %event.session_id))]
    async fn append(&self, event: NewEvent) -> PathwayResult<StoredEvent> {
        validate_session_id(event.session_id.as_str(), self.config.session_id_max_length)?;
        validate_payload_size(&event.payload, self.config.max_payload_size)?;
        if let Some(event_id) = &event.event_id {
            validate_event_id(event_id.as_str())?;
        }

        let mut sessions = self.lock_write()?;
        let session = sessions.entry(event.session_id.clone()).or_default();

        if let Some(parent_id) = &event.parent_event_id {
            let parent = session
                .get(parent_id)
                .ok_or_else(|| PathwayError::UnknownParent {
                    session_id: event.session_id.clone(),
                    parent_event_id: parent_id.clone(),
                })?;
            validate_smaller_seq(parent.seq, session.max_seq() + 1)?;
        }

        if let EventPayload::Backtracked(payload) = &event.payload {
            let target = session.get(&payload.target_event_id).ok_or_else(|| {
                PathwayError::UnknownParent {
                    session_id: event.session_id.clone(),
                    parent_event_id: payload.target_event_id.clone(),
                }
            })?;
            validate_smaller_seq(target.seq, session.max_seq() + 1)?;
        }

        if let EventPayload::Merged(payload) = &event.payload {
            let tips: Vec<String> = session.tips.keys().map(|h| h.as_str().to_string()).collect();
            validate_merge_sources(&payload.source_head_ids, &tips)?;
        }

        let ts = event.ts.unwrap_or_else(Utc::now);
        validate_ts_non_decreasing(session.latest_ts(), ts)?;

        let seq = match event.seq {
            Some(explicit) => {
                // Gapless §3.1: an explicit seq must be exactly the next one,
                // not merely greater than the current max, or a skip leaves
                // a permanent hole in {1..N}.
                if explicit != session.max_seq() + 1 {
                    return Err(PathwayError::SeqConflict {
                        session_id: event.session_id.clone(),
                        seq: explicit,
                    });
                }
                tracing::trace!(seq = explicit, "explicit seq accepted");
                explicit
            }
            None => {
                let next = session.max_seq() + 1;
                tracing::trace!(seq = next, "seq allocated");
                next
            }
        };

        let event_id = event.event_id.unwrap_or_else(EventId::generate);
        validate_event_id(event_id.as_str())?;

        let stored = StoredEvent {
            event_id: event_id.clone(),
            session_id: event.session_id.clone(),
            seq,
            kind: event.payload.kind(),
            ts,
            actor: event.actor.unwrap_or_else(Actor::system),
            head_id: event.head_id.clone(),
            parent_event_id: event.parent_event_id,
            waypoint_id: event.waypoint_id,
            payload: event.payload,
        };

        if let EventPayload::Merged(payload) = &stored.payload {
            for source in &payload.source_head_ids {
                session.tips.remove(&HeadId::new(source.as_str()));
            }
            session
                .tips
                .insert(HeadId::new(payload.into_head_id.as_str()), stored.event_id.clone());
        } else {
            session.tips.insert(stored.head_id.clone(), stored.event_id.clone());
        }

        session.by_id.insert(stored.event_id.clone(), session.events.len());
        session.events.push(stored.clone());

        Ok(stored)
    }

    async fn get_event(&self, event_id: &EventId) -> PathwayResult<StoredEvent> {
        let sessions = self.lock_read()?;
        for session in sessions.values() {
            if let Some(event) = session.get(event_id) {
                return Ok(event.clone());
            }
        }
        Err(PathwayError::NotFound {
            what: format!("event {event_id}"),
        })
    }

    async fn get_events(
        &self,
        session_id: &SessionId,
        filter: &EventFilter,
    ) -> PathwayResult<Vec<StoredEvent>> {
        let sessions = self.lock_read()?;
        let Some(session) = sessions.get(session_id) else {
            return Ok(Vec::new());
        };

        let mut events: Vec<StoredEvent> = session
            .events
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();

        if filter.order == Some(Order::Desc) {
            events.reverse();
        }

        let offset = filter.offset.unwrap_or(0) as usize;
        let events = if offset >= events.len() {
            Vec::new()
        } else {
            events.split_off(offset)
        };

        let events = match filter.limit {
            Some(limit) => events.into_iter().take(limit as usize).collect(),
            None => events,
        };

        Ok(events)
    }

    async fn get_children(&self, event_id: &EventId) -> PathwayResult<Vec<StoredEvent>> {
        let sessions = self.lock_read()?;
        let mut children = Vec::new();
        for session in sessions.values() {
            for event in &session.events {
                if event.parent_event_id.as_ref() == Some(event_id) {
                    children.push(event.clone());
                }
            }
        }
        Ok(children)
    }

    async fn get_heads(&self, session_id: &SessionId) -> PathwayResult<HashMap<HeadId, EventId>> {
        let sessions = self.lock_read()?;
        Ok(sessions
            .get(session_id)
            .map(|s| s.tips.clone())
            .unwrap_or_default())
    }

    async fn list_sessions(&self) -> PathwayResult<Vec<SessionSummary>> {
        let sessions = self.lock_read()?;
        let mut summaries: Vec<SessionSummary> = sessions
            .iter()
            .filter_map(|(session_id, session)| {
                session.latest_ts().map(|latest_ts| SessionSummary {
                    session_id: session_id.clone(),
                    event_count: session.events.len() as u64,
                    latest_ts,
                })
            })
            .collect();
        summaries.sort_by(|a, b| a.session_id.as_str().cmp(b.session_id.as_str()));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathway_core::{EventPayload, IntentCreatedPayload, WaypointEnteredPayload, WaypointId};

    fn intent(goal: &str) -> EventPayload {
        EventPayload::IntentCreated(IntentCreatedPayload {
            goal: goal.to_string(),
            context: None,
        })
    }

    #[tokio::test]
    async fn append_assigns_gapless_seqs() {
        let store = InMemoryEventStore::default();
        let a = store
            .append(NewEvent::new("s1", intent("learn")))
            .await
            .unwrap();
        let b = store
            .append(NewEvent::new("s1", intent("learn more")).with_parent(a.event_id.clone()))
            .await
            .unwrap();
        assert_eq!(a.seq, 1);
        assert_eq!(b.seq, 2);
    }

    #[tokio::test]
    async fn unknown_parent_is_rejected() {
        let store = InMemoryEventStore::default();
        let result = store
            .append(NewEvent::new("s1", intent("x")).with_parent(EventId::new("nope")))
            .await;
        assert!(matches!(result, Err(PathwayError::UnknownParent { .. })));
    }

    #[tokio::test]
    async fn explicit_seq_conflict_is_rejected() {
        let store = InMemoryEventStore::default();
        let mut first = NewEvent::new("s1", intent("x"));
        first.seq = Some(1);
        store.append(first).await.unwrap();

        let mut second = NewEvent::new("s1", intent("y"));
        second.seq = Some(1);
        let result = store.append(second).await;
        assert!(matches!(result, Err(PathwayError::SeqConflict { .. })));
    }

    #[tokio::test]
    async fn get_events_respects_filters() {
        let store = InMemoryEventStore::default();
        for i in 0..5 {
            store
                .append(NewEvent::new(
                    "s1",
                    EventPayload::WaypointEntered(WaypointEnteredPayload {
                        waypoint_id: WaypointId::new(format!("w{i}")),
                        kind: "lesson".to_string(),
                    }),
                ))
                .await
                .unwrap();
        }
        let filter = EventFilter {
            seq_min: Some(2),
            limit: Some(2),
            ..Default::default()
        };
        let events = store
            .get_events(&SessionId::new("s1"), &filter)
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].seq, 2);
        assert_eq!(events[1].seq, 3);
    }

    #[tokio::test]
    async fn list_sessions_is_sorted_and_summarized() {
        let store = InMemoryEventStore::default();
        store.append(NewEvent::new("b", intent("x"))).await.unwrap();
        store.append(NewEvent::new("a", intent("y"))).await.unwrap();
        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, SessionId::new("a"));
        assert_eq!(sessions[1].session_id, SessionId::new("b"));
    }
}
