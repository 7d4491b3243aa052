//! Ingest-time validation: envelope shape, payload size, and the topology
//! checks a store applies before opening its allocation transaction.
//!
//! These are free functions rather than methods on the store trait so they
//! can be exercised directly in unit tests without a backend, and so every
//! backend (in-memory, SQLite) applies exactly the same rules.

use crate::error::PathwayError;
use crate::ids::MAX_ID_LENGTH;
use crate::kinds::EventPayload;
use chrono::{DateTime, Utc};

/// `session_id`: case-sensitive, alphanumeric plus `_`/`-`, non-empty, within `max_len`.
pub fn validate_session_id(session_id: &str, max_len: usize) -> Result<(), PathwayError> {
    validate_id_shape(session_id, max_len).map_err(|_| PathwayError::SessionIdShape {
        session_id: session_id.to_string(),
    })
}

/// `event_id`: non-empty, case-sensitive, within [`MAX_ID_LENGTH`].
/// Event ids are not restricted to alphanumeric/`_`/`-` the way session ids
/// are (a caller-supplied id may be any globally-unique string), so only
/// the length bound is enforced here.
pub fn validate_event_id(event_id: &str) -> Result<(), PathwayError> {
    if event_id.is_empty() || event_id.len() > MAX_ID_LENGTH {
        return Err(PathwayError::EventIdShape {
            event_id: event_id.to_string(),
        });
    }
    Ok(())
}

fn validate_id_shape(raw: &str, max_len: usize) -> Result<(), ()> {
    if raw.is_empty() || raw.len() > max_len {
        return Err(());
    }
    if !raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(());
    }
    Ok(())
}

/// `max_payload_size` bound, measured on the serialized JSON byte length.
pub fn validate_payload_size(payload: &EventPayload, max_bytes: usize) -> Result<(), PathwayError> {
    let encoded = serde_json::to_vec(payload)?;
    if encoded.len() > max_bytes {
        return Err(PathwayError::InvalidEnvelope {
            reason: format!(
                "payload of {} bytes exceeds max_payload_size of {} bytes",
                encoded.len(),
                max_bytes
            ),
        });
    }
    Ok(())
}

/// `ts` must be non-decreasing per session (clock skew tolerated; strictly
/// increasing is not required — see Open Questions).
pub fn validate_ts_non_decreasing(
    previous: Option<DateTime<Utc>>,
    candidate: DateTime<Utc>,
) -> Result<(), PathwayError> {
    if let Some(previous) = previous {
        if candidate < previous {
            return Err(PathwayError::InvalidEnvelope {
                reason: format!(
                    "ts {} is earlier than the session's prior event ts {}",
                    candidate, previous
                ),
            });
        }
    }
    Ok(())
}

/// A referenced parent (or backtrack target) must exist in the same session
/// and carry a strictly smaller `seq` than the new event.
pub fn validate_smaller_seq(parent_seq: u64, candidate_seq: u64) -> Result<(), PathwayError> {
    if parent_seq >= candidate_seq {
        return Err(PathwayError::InvalidEnvelope {
            reason: format!(
                "referenced event has seq {} which is not smaller than the new event's seq {}",
                parent_seq, candidate_seq
            ),
        });
    }
    Ok(())
}

/// `Merged.source_head_ids` must all currently be branch tips.
pub fn validate_merge_sources(
    source_head_ids: &[String],
    current_tips: &[String],
) -> Result<(), PathwayError> {
    for source in source_head_ids {
        if !current_tips.iter().any(|tip| tip == source) {
            return Err(PathwayError::InvalidEnvelope {
                reason: format!("merge source head {:?} is not a current branch tip", source),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_accepts_alphanumeric_underscore_dash() {
        assert!(validate_session_id("s1-abc_123", 128).is_ok());
    }

    #[test]
    fn session_id_rejects_slash() {
        assert!(validate_session_id("s1/abc", 128).is_err());
    }

    #[test]
    fn session_id_rejects_empty() {
        assert!(validate_session_id("", 128).is_err());
    }

    #[test]
    fn session_id_rejects_over_length() {
        let long = "a".repeat(200);
        assert!(validate_session_id(&long, 128).is_err());
    }

    #[test]
    fn ts_rejects_decreasing() {
        let earlier = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2026-01-02T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(validate_ts_non_decreasing(Some(later), earlier).is_err());
        assert!(validate_ts_non_decreasing(Some(earlier), later).is_ok());
        assert!(validate_ts_non_decreasing(Some(earlier), earlier).is_ok());
    }

    #[test]
    fn merge_sources_must_be_current_tips() {
        let tips = vec!["main".to_string(), "alt".to_string()];
        assert!(validate_merge_sources(&["main".to_string()], &tips).is_ok());
        assert!(validate_merge_sources(&["gone".to_string()], &tips).is_err());
    }

    proptest::proptest! {
        #[test]
        fn any_alphanumeric_underscore_dash_string_within_bound_is_accepted(
            raw in "[a-zA-Z0-9_-]{1,128}"
        ) {
            proptest::prop_assert!(validate_session_id(&raw, 128).is_ok());
        }

        #[test]
        fn any_string_containing_a_slash_is_rejected(
            prefix in "[a-zA-Z0-9_-]{0,20}",
            suffix in "[a-zA-Z0-9_-]{0,20}",
        ) {
            let raw = format!("{prefix}/{suffix}");
            proptest::prop_assert!(validate_session_id(&raw, 128).is_err());
        }

        #[test]
        fn event_id_accepts_any_non_empty_ascii_string_within_length_bound(
            raw in "[ -~]{1,128}"
        ) {
            proptest::prop_assert!(validate_event_id(&raw).is_ok());
        }
    }
}
