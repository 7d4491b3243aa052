//! SQLite-backed durable [`EventStore`], built on `sqlx`.
//!
//! Implements the read-max-then-insert-under-one-transaction retry loop
//! (§4.1, §9) against a real database, so sequence allocation stays
//! gap-free under concurrent writers the same way it does in
//! [`crate::memory::InMemoryEventStore`], but durably.

use crate::store::{EventFilter, EventStore, Order, SessionSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pathway_core::{
    validate_event_id, validate_merge_sources, validate_payload_size, validate_session_id,
    validate_smaller_seq, validate_ts_non_decreasing, Actor, ActorKind, EventId, EventPayload,
    HeadId, NewEvent, PathwayConfig, PathwayError, PathwayResult, SessionId, StoredEvent,
};
use sqlx::error::DatabaseError;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

/// Number of times `append` retries its allocation transaction on a
/// concurrent-writer conflict before giving up.
const MAX_SEQ_RETRIES: u32 = 10;

pub struct SqliteEventStore {
    pool: SqlitePool,
    config: PathwayConfig,
}

impl SqliteEventStore {
    /// Opens (creating if absent) the database at `config.db_path` and
    /// ensures the schema exists.
    pub async fn open(config: PathwayConfig) -> PathwayResult<Self> {
        // Each connection to `:memory:` opens its own, separate database, so
        // a pool with more than one connection would scatter concurrent
        // writers across isolated databases. Pin the pool to a single
        // connection in that case; a file-backed database has no such
        // constraint and keeps the pool's default sizing.
        let (url, pool_options) = if config.db_path == ":memory:" {
            ("sqlite::memory:".to_string(), SqlitePoolOptions::new().max_connections(1))
        } else {
            (format!("sqlite://{}?mode=rwc", config.db_path), SqlitePoolOptions::new())
        };
        let pool = pool_options
            .connect(&url)
            .await
            .map_err(|e| PathwayError::store_failure(e.to_string()))?;
        let store = Self { pool, config };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn from_pool(pool: SqlitePool, config: PathwayConfig) -> PathwayResult<Self> {
        let store = Self { pool, config };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> PathwayResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                event_id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                kind TEXT NOT NULL,
                ts TEXT NOT NULL,
                actor_kind TEXT NOT NULL,
                actor_id TEXT,
                head_id TEXT NOT NULL,
                parent_event_id TEXT,
                waypoint_id TEXT,
                payload TEXT NOT NULL,
                UNIQUE (session_id, seq)
            ) STRICT
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| PathwayError::store_failure(e.to_string()))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_session_seq ON events(session_id, seq)")
            .execute(&self.pool)
            .await
            .map_err(|e| PathwayError::store_failure(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            ) STRICT
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| PathwayError::store_failure(e.to_string()))?;

        sqlx::query("INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')")
            .execute(&self.pool)
            .await
            .map_err(|e| PathwayError::store_failure(e.to_string()))?;

        Ok(())
    }

    async fn current_tips(&self, session_id: &SessionId) -> PathwayResult<HashMap<HeadId, EventId>> {
        let rows = sqlx::query(
            r#"
            SELECT head_id, event_id FROM events e1
            WHERE session_id = ?
            AND seq = (SELECT MAX(seq) FROM events e2 WHERE e2.session_id = e1.session_id AND e2.head_id = e1.head_id)
            "#,
        )
        .bind(session_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PathwayError::store_failure(e.to_string()))?;

        let mut tips = HashMap::new();
        for row in rows {
            let head_id: String = row.try_get("head_id").map_err(|e| PathwayError::store_failure(e.to_string()))?;
            let event_id: String = row.try_get("event_id").map_err(|e| PathwayError::store_failure(e.to_string()))?;
            tips.insert(HeadId::new(head_id), EventId::new(event_id));
        }
        Ok(tips)
    }

    fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> PathwayResult<StoredEvent> {
        let payload_raw: String = row.try_get("payload").map_err(|e| PathwayError::store_failure(e.to_string()))?;
        let payload: EventPayload = serde_json::from_str(&payload_raw)?;

        let actor_kind: String = row.try_get("actor_kind").map_err(|e| PathwayError::store_failure(e.to_string()))?;
        let actor_id: Option<String> = row.try_get("actor_id").map_err(|e| PathwayError::store_failure(e.to_string()))?;
        let actor = Actor {
            kind: if actor_kind == "USER" { ActorKind::User } else { ActorKind::System },
            id: actor_id,
        };

        let ts_raw: String = row.try_get("ts").map_err(|e| PathwayError::store_failure(e.to_string()))?;
        let ts = DateTime::parse_from_rfc3339(&ts_raw)
            .map_err(|e| PathwayError::store_failure(e.to_string()))?
            .with_timezone(&Utc);

        let parent_event_id: Option<String> = row.try_get("parent_event_id").map_err(|e| PathwayError::store_failure(e.to_string()))?;
        let waypoint_id: Option<String> = row.try_get("waypoint_id").map_err(|e| PathwayError::store_failure(e.to_string()))?;

        let event_id: String = row.try_get("event_id").map_err(|e| PathwayError::store_failure(e.to_string()))?;
        let session_id: String = row.try_get("session_id").map_err(|e| PathwayError::store_failure(e.to_string()))?;
        let seq: i64 = row.try_get("seq").map_err(|e| PathwayError::store_failure(e.to_string()))?;
        let head_id: String = row.try_get("head_id").map_err(|e| PathwayError::store_failure(e.to_string()))?;

        Ok(StoredEvent {
            event_id: EventId::new(event_id),
            session_id: SessionId::new(session_id),
            seq: seq as u64,
            kind: payload.kind(),
            ts,
            actor,
            head_id: HeadId::new(head_id),
            parent_event_id: parent_event_id.map(EventId::new),
            waypoint_id: waypoint_id.map(pathway_core::WaypointId::new),
            payload,
        })
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    #[tracing::instrument(skip(self, event), fields(session_id = %event.session_id))]
    async fn append(&self, event: NewEvent) -> PathwayResult<StoredEvent> {
        validate_session_id(event.session_id.as_str(), self.config.session_id_max_length)?;
        validate_payload_size(&event.payload, self.config.max_payload_size)?;
        if let Some(event_id) = &event.event_id {
            validate_event_id(event_id.as_str())?;
        }

        if let Some(parent_id) = &event.parent_event_id {
            let parent = self.get_event(parent_id).await.map_err(|_| PathwayError::UnknownParent {
                session_id: event.session_id.clone(),
                parent_event_id: parent_id.clone(),
            })?;
            if parent.session_id != event.session_id {
                return Err(PathwayError::UnknownParent {
                    session_id: event.session_id.clone(),
                    parent_event_id: parent_id.clone(),
                });
            }
        }

        if let EventPayload::Backtracked(payload) = &event.payload {
            let target = self
                .get_event(&payload.target_event_id)
                .await
                .map_err(|_| PathwayError::UnknownParent {
                    session_id: event.session_id.clone(),
                    parent_event_id: payload.target_event_id.clone(),
                })?;
            if target.session_id != event.session_id {
                return Err(PathwayError::UnknownParent {
                    session_id: event.session_id.clone(),
                    parent_event_id: payload.target_event_id.clone(),
                });
            }
        }

        if let EventPayload::Merged(payload) = &event.payload {
            let tips = self.current_tips(&event.session_id).await?;
            let tip_names: Vec<String> = tips.keys().map(|h| h.as_str().to_string()).collect();
            validate_merge_sources(&payload.source_head_ids, &tip_names)?;
        }

        let ts = event.ts.unwrap_or_else(Utc::now);
        let event_id = event.event_id.unwrap_or_else(EventId::generate);
        validate_event_id(event_id.as_str())?;

        let payload_json = serde_json::to_string(&event.payload)?;
        let kind_str = event.payload.kind().as_str();
        let actor = event.actor.unwrap_or_else(Actor::system);
        let actor_kind_str = match actor.kind {
            ActorKind::User => "USER",
            ActorKind::System => "SYSTEM",
        };

        let mut attempt = 0;
        loop {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| PathwayError::store_failure(e.to_string()))?;

            let row = sqlx::query("SELECT MAX(seq) as max_seq, MAX(ts) as max_ts FROM events WHERE session_id = ?")
                .bind(event.session_id.as_str())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| PathwayError::store_failure(e.to_string()))?;
            let max_seq: Option<i64> = row.try_get("max_seq").map_err(|e| PathwayError::store_failure(e.to_string()))?;
            let max_ts: Option<String> = row.try_get("max_ts").map_err(|e| PathwayError::store_failure(e.to_string()))?;

            let previous_ts = max_ts
                .map(|raw| {
                    DateTime::parse_from_rfc3339(&raw)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| PathwayError::store_failure(e.to_string()))
                })
                .transpose()?;
            validate_ts_non_decreasing(previous_ts, ts)?;

            let current_max = max_seq.unwrap_or(0) as u64;

            if let Some(parent_id) = &event.parent_event_id {
                let parent = self.get_event(parent_id).await?;
                validate_smaller_seq(parent.seq, current_max + 1)?;
            }
            if let EventPayload::Backtracked(payload) = &event.payload {
                let target = self.get_event(&payload.target_event_id).await?;
                validate_smaller_seq(target.seq, current_max + 1)?;
            }

            let seq = match event.seq {
                Some(explicit) => {
                    // Gapless §3.1: an explicit seq must be exactly the next
                    // one, not merely greater than the current max.
                    if explicit != current_max + 1 {
                        return Err(PathwayError::SeqConflict {
                            session_id: event.session_id.clone(),
                            seq: explicit,
                        });
                    }
                    explicit
                }
                None => current_max + 1,
            };

            let insert = sqlx::query(
                r#"
                INSERT INTO events
                    (event_id, session_id, seq, kind, ts, actor_kind, actor_id, head_id, parent_event_id, waypoint_id, payload)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(event_id.as_str())
            .bind(event.session_id.as_str())
            .bind(seq as i64)
            .bind(kind_str)
            .bind(ts.to_rfc3339())
            .bind(actor_kind_str)
            .bind(actor.id.clone())
            .bind(event.head_id.as_str())
            .bind(event.parent_event_id.as_ref().map(|p| p.as_str().to_string()))
            .bind(event.waypoint_id.as_ref().map(|w| w.as_str().to_string()))
            .bind(&payload_json)
            .execute(&mut *tx)
            .await;

            match insert {
                Ok(_) => {
                    tx.commit().await.map_err(|e| PathwayError::store_failure(e.to_string()))?;
                    break;
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    tx.rollback().await.ok();
                    attempt += 1;
                    tracing::trace!(attempt, seq, "seq allocation retry after unique-constraint conflict");
                    if attempt >= MAX_SEQ_RETRIES {
                        return Err(PathwayError::store_failure(
                            "seq allocation did not converge after max retries",
                        ));
                    }
                    continue;
                }
                Err(e) => {
                    tx.rollback().await.ok();
                    return Err(PathwayError::store_failure(e.to_string()));
                }
            }
        }

        self.get_event(&event_id).await
    }

    async fn get_event(&self, event_id: &EventId) -> PathwayResult<StoredEvent> {
        let row = sqlx::query("SELECT * FROM events WHERE event_id = ?")
            .bind(event_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PathwayError::store_failure(e.to_string()))?;
        match row {
            Some(row) => Self::row_to_event(&row),
            None => Err(PathwayError::NotFound {
                what: format!("event {event_id}"),
            }),
        }
    }

    async fn get_events(
        &self,
        session_id: &SessionId,
        filter: &EventFilter,
    ) -> PathwayResult<Vec<StoredEvent>> {
        // `kind`/`head_id`/`seq_min`/`seq_max` must narrow the result *before*
        // LIMIT/OFFSET apply, the same order the in-memory backend filters
        // in: pushing them into the WHERE clause keeps pagination honest
        // instead of paginating first and filtering the page afterward.
        let mut sql = String::from("SELECT * FROM events WHERE session_id = ?");
        if filter.kind.is_some() {
            sql.push_str(" AND kind = ?");
        }
        if filter.head_id.is_some() {
            sql.push_str(" AND head_id = ?");
        }
        if filter.seq_min.is_some() {
            sql.push_str(" AND seq >= ?");
        }
        if filter.seq_max.is_some() {
            sql.push_str(" AND seq <= ?");
        }
        let order = if filter.order == Some(Order::Desc) { "DESC" } else { "ASC" };
        sql.push_str(&format!(" ORDER BY seq {} LIMIT ? OFFSET ?", order));

        let mut query = sqlx::query(&sql).bind(session_id.as_str());
        if let Some(kind) = filter.kind {
            query = query.bind(kind.as_str());
        }
        if let Some(head_id) = &filter.head_id {
            query = query.bind(head_id.as_str());
        }
        if let Some(seq_min) = filter.seq_min {
            query = query.bind(seq_min as i64);
        }
        if let Some(seq_max) = filter.seq_max {
            query = query.bind(seq_max as i64);
        }
        query = query
            .bind(filter.limit.unwrap_or(u32::MAX as u64) as i64)
            .bind(filter.offset.unwrap_or(0) as i64);

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PathwayError::store_failure(e.to_string()))?;

        rows.iter().map(Self::row_to_event).collect()
    }

    async fn get_children(&self, event_id: &EventId) -> PathwayResult<Vec<StoredEvent>> {
        let rows = sqlx::query("SELECT * FROM events WHERE parent_event_id = ? ORDER BY seq ASC")
            .bind(event_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PathwayError::store_failure(e.to_string()))?;
        rows.iter().map(Self::row_to_event).collect()
    }

    async fn get_heads(&self, session_id: &SessionId) -> PathwayResult<HashMap<HeadId, EventId>> {
        self.current_tips(session_id).await
    }

    async fn list_sessions(&self) -> PathwayResult<Vec<SessionSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, COUNT(*) as event_count, MAX(ts) as latest_ts
            FROM events
            GROUP BY session_id
            ORDER BY session_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PathwayError::store_failure(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let session_id: String = row.try_get("session_id").map_err(|e| PathwayError::store_failure(e.to_string()))?;
                let event_count: i64 = row.try_get("event_count").map_err(|e| PathwayError::store_failure(e.to_string()))?;
                let latest_ts_raw: String = row.try_get("latest_ts").map_err(|e| PathwayError::store_failure(e.to_string()))?;
                let latest_ts = DateTime::parse_from_rfc3339(&latest_ts_raw)
                    .map_err(|e| PathwayError::store_failure(e.to_string()))?
                    .with_timezone(&Utc);
                Ok(SessionSummary {
                    session_id: SessionId::new(session_id),
                    event_count: event_count as u64,
                    latest_ts,
                })
            })
            .collect()
    }
}
