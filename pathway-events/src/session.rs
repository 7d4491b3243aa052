//! Glue between the [`pathway_storage::EventStore`] trait and the
//! [`compose`] fold: the `get_session_state` read path from §6.2.
//!
//! This is the only module in this crate that performs I/O; everything
//! else is a pure fold over an already-fetched event slice.

use crate::composer::compose;
use pathway_core::{PathwayResult, SessionId, SessionState};
use pathway_storage::{EventFilter, EventStore};

/// Reads a session's full ordered event stream from `store` and composes
/// it into a [`SessionState`]. An unknown `session_id` composes to
/// [`SessionState::empty`] rather than erroring: `get_events` on a session
/// the store has never seen returns an empty slice, not `NotFound`, so
/// there is nothing here to distinguish "empty session" from "no such
/// session" — both observations are indistinguishable given only the
/// event stream.
pub async fn get_session_state(
    store: &dyn EventStore,
    session_id: &SessionId,
) -> PathwayResult<SessionState> {
    let events = store.get_events(session_id, &EventFilter::default()).await?;
    Ok(compose(&events))
}
