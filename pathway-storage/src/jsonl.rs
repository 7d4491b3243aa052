//! JSONL encode/decode for [`StoredEvent`] streams: one event per line, in
//! `seq` order. Pure, store-agnostic helpers over `Vec<StoredEvent>` — the
//! file-handle/HTTP-multipart plumbing around them is not this crate's
//! concern.

use pathway_core::{EventId, PathwayError, PathwayResult, SessionId, StoredEvent};

/// Serializes `events` (expected already in `seq` order) as one JSON object
/// per line. Lossless: every envelope field round-trips through
/// [`import_events`] unchanged.
pub fn export_session(events: &[StoredEvent]) -> PathwayResult<String> {
    let mut out = String::new();
    for event in events {
        let line = serde_json::to_string(event)?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Parses a JSONL blob back into `StoredEvent`s, in file order.
///
/// If `session_id_override` is set, every record's `session_id` is rewritten
/// to it; everything else, including original `seq`s, is preserved exactly.
/// Callers are responsible for re-validating gaplessness against whatever
/// other events already exist in the target session.
pub fn import_events(
    jsonl: &str,
    session_id_override: Option<&SessionId>,
) -> PathwayResult<Vec<StoredEvent>> {
    let mut events = Vec::new();
    for (line_no, line) in jsonl.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut event: StoredEvent = serde_json::from_str(line).map_err(|e| {
            PathwayError::store_failure(format!("line {}: {}", line_no + 1, e))
        })?;
        if let Some(session_id) = session_id_override {
            event.session_id = session_id.clone();
        }
        events.push(event);
    }
    assert_gapless_per_session(&events)?;
    Ok(events)
}

fn assert_gapless_per_session(events: &[StoredEvent]) -> PathwayResult<()> {
    use std::collections::HashMap;

    let mut seqs_by_session: HashMap<&SessionId, Vec<u64>> = HashMap::new();
    for event in events {
        seqs_by_session.entry(&event.session_id).or_default().push(event.seq);
    }
    for (session_id, mut seqs) in seqs_by_session {
        seqs.sort_unstable();
        for (expected, actual) in (1..=seqs.len() as u64).zip(seqs.iter()) {
            if expected != *actual {
                return Err(PathwayError::InvalidEnvelope {
                    reason: format!(
                        "session {} has non-gapless seqs after import: expected {} found {}",
                        session_id, expected, actual
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Looks up a single imported event by id within an already-parsed batch,
/// without requiring a store round-trip. Useful for tests asserting on
/// import output before it's been appended anywhere.
pub fn find_event<'a>(events: &'a [StoredEvent], event_id: &EventId) -> Option<&'a StoredEvent> {
    events.iter().find(|e| &e.event_id == event_id)
}
