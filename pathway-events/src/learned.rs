//! Learned reducer: preferences, concepts, and constraints, with confidence
//! clamped to `[0, 1]`.
//!
//! Learned state is global across branches and backtracks: this reducer
//! never rewinds on `Backtracked`, realizing the "learning persists"
//! guarantee (§4.3).

use pathway_core::{ConceptEntry, EventPayload, LearnedView, StoredEvent, ValueEntry};

/// Clamps `x` to the closed interval `[lo, hi]`.
fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// Folds `events` (in `seq` order) into a [`LearnedView`].
pub fn reduce_learned(events: &[StoredEvent]) -> LearnedView {
    let mut view = LearnedView::empty();

    for event in events {
        match &event.payload {
            EventPayload::PreferenceLearned(payload) => {
                apply_value_update(
                    &mut view.preferences,
                    &payload.key,
                    &payload.value,
                    payload.confidence_delta,
                    event.seq,
                    false,
                );
            }
            EventPayload::ConstraintLearned(payload) => {
                apply_value_update(
                    &mut view.constraints,
                    &payload.key,
                    &payload.value,
                    payload.confidence_delta,
                    event.seq,
                    true,
                );
            }
            EventPayload::ConceptLearned(payload) => {
                let entry = view
                    .concepts
                    .entry(payload.concept_id.clone())
                    .or_insert_with(|| ConceptEntry {
                        summary: payload.summary.clone(),
                        confidence: 0.0,
                        evidence_event_ids: Vec::new(),
                        first_seen_seq: event.seq,
                        last_updated_seq: event.seq,
                    });
                entry.summary = payload.summary.clone();
                entry.confidence = clamp(entry.confidence + payload.confidence_delta, 0.0, 1.0);
                entry.last_updated_seq = event.seq;
                if let Some(evidence_event_id) = &payload.evidence_event_id {
                    if !entry.evidence_event_ids.contains(evidence_event_id) {
                        entry.evidence_event_ids.push(evidence_event_id.clone());
                    }
                }
            }
            _ => {}
        }
    }

    view
}

/// Shared update rule for `preferences` and `constraints`: same clamp and
/// first/last-seen bookkeeping; `always_replace_value` selects the
/// constraint-specific "latest value always wins" rule over the
/// preference-specific "same value accumulates, different value resets"
/// rule (§4.3).
fn apply_value_update(
    table: &mut std::collections::HashMap<String, ValueEntry>,
    key: &str,
    value: &str,
    delta: f64,
    seq: u64,
    always_replace_value: bool,
) {
    match table.get_mut(key) {
        None => {
            table.insert(
                key.to_string(),
                ValueEntry {
                    value: value.to_string(),
                    confidence: clamp(delta, 0.0, 1.0),
                    first_seen_seq: seq,
                    last_updated_seq: seq,
                },
            );
        }
        Some(entry) => {
            if always_replace_value {
                entry.value = value.to_string();
                entry.confidence = clamp(delta, 0.0, 1.0);
                entry.last_updated_seq = seq;
            } else if entry.value == value {
                entry.confidence = clamp(entry.confidence + delta, 0.0, 1.0);
                entry.last_updated_seq = seq;
            } else {
                entry.value = value.to_string();
                entry.confidence = clamp(delta, 0.0, 1.0);
                entry.last_updated_seq = seq;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathway_test_utils::fixtures;

    #[test]
    fn confidence_clamps_at_one() {
        let events = fixtures::confidence_clamp("s");
        let view = reduce_learned(&events);
        assert_eq!(view.preferences["x"].confidence, 1.0);
    }

    #[test]
    fn learning_survives_backtrack() {
        let events = fixtures::learning_persists_across_backtrack("s2");
        let view = reduce_learned(&events);
        let pref = &view.preferences["style"];
        assert_eq!(pref.value, "terse");
        assert_eq!(pref.confidence, 0.5);
    }

    #[test]
    fn preference_value_change_resets_confidence() {
        use pathway_core::{EventPayload, PreferenceLearnedPayload};

        let mut builder = fixtures::EventSeqBuilder::new("s4");
        builder.push(
            "main",
            None,
            None,
            EventPayload::PreferenceLearned(PreferenceLearnedPayload {
                key: "style".to_string(),
                value: "terse".to_string(),
                confidence_delta: 0.5,
            }),
        );
        builder.push(
            "main",
            None,
            None,
            EventPayload::PreferenceLearned(PreferenceLearnedPayload {
                key: "style".to_string(),
                value: "verbose".to_string(),
                confidence_delta: 0.3,
            }),
        );
        let events = builder.build();

        let view = reduce_learned(&events);
        let pref = &view.preferences["style"];
        assert_eq!(pref.value, "verbose");
        assert_eq!(pref.confidence, 0.3);
        assert_eq!(pref.first_seen_seq, 1);
        assert_eq!(pref.last_updated_seq, 2);
    }
}
