//! The `EventStore` trait conformed to by every backend in this crate.
//!
//! One trait, two backends ([`crate::memory::InMemoryEventStore`] and
//! [`crate::sqlite::SqliteEventStore`]): the scenario battery in each
//! backend's test module runs against both, so neither can silently diverge
//! on sequencing or validation behavior.

use async_trait::async_trait;
use pathway_core::{EventId, HeadId, NewEvent, PathwayResult, SessionId, StoredEvent};
use std::collections::HashMap;

/// Sort order for [`EventStore::get_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Filters accepted by [`EventStore::get_events`]. All fields are optional;
/// an unset field does not narrow the result.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub kind: Option<pathway_core::EventKind>,
    pub head_id: Option<HeadId>,
    pub seq_min: Option<u64>,
    pub seq_max: Option<u64>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub order: Option<Order>,
}

impl EventFilter {
    pub fn matches(&self, event: &StoredEvent) -> bool {
        if let Some(kind) = self.kind {
            if event.kind != kind {
                return false;
            }
        }
        if let Some(head_id) = &self.head_id {
            if &event.head_id != head_id {
                return false;
            }
        }
        if let Some(seq_min) = self.seq_min {
            if event.seq < seq_min {
                return false;
            }
        }
        if let Some(seq_max) = self.seq_max {
            if event.seq > seq_max {
                return false;
            }
        }
        true
    }
}

/// One row of [`EventStore::list_sessions`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub event_count: u64,
    pub latest_ts: chrono::DateTime<chrono::Utc>,
}

/// Durable append-only event log, keyed by session.
///
/// `append` is the only mutating method; everything else is a read. Per
/// §5, `seq` allocation within a session is serialized so concurrent
/// appends never produce gaps or duplicate seqs; across sessions no
/// ordering is promised.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Validates, assigns `seq` (and `event_id` if absent), and persists
    /// `event`. Returns the fully-populated [`StoredEvent`].
    async fn append(&self, event: NewEvent) -> PathwayResult<StoredEvent>;

    /// Fetches a single event by id.
    async fn get_event(&self, event_id: &EventId) -> PathwayResult<StoredEvent>;

    /// Fetches a session's events, in `seq` order unless `filter.order`
    /// overrides it, narrowed by `filter`.
    async fn get_events(
        &self,
        session_id: &SessionId,
        filter: &EventFilter,
    ) -> PathwayResult<Vec<StoredEvent>>;

    /// Events whose `parent_event_id` equals `event_id`.
    async fn get_children(&self, event_id: &EventId) -> PathwayResult<Vec<StoredEvent>>;

    /// Current branch tips for a session: `head_id → tip_event_id`.
    async fn get_heads(&self, session_id: &SessionId) -> PathwayResult<HashMap<HeadId, EventId>>;

    /// Summaries of every session known to the store.
    async fn list_sessions(&self) -> PathwayResult<Vec<SessionSummary>>;
}
