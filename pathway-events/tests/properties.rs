//! Property-based tests for the quantified invariants in spec §8: replay
//! determinism, confidence bounds and monotonicity, seq-gaplessness, and
//! parent resolution, exercised over arbitrarily generated event streams
//! rather than the literal fixtures in [`pathway_test_utils::fixtures`].

use pathway_core::{EventId, EventPayload, HeadId, SessionId, StoredEvent};
use pathway_events::compose;
use pathway_test_utils::assertions::{assert_confidence_in_range, assert_parents_resolve, assert_seqs_gapless};
use pathway_test_utils::generators::arb_event_payload;
use proptest::prelude::*;

/// Builds a well-formed (but otherwise arbitrary) event stream: every
/// event's `parent_event_id` either is `None` or names an already-built
/// event in the same stream, so the generator never has to special-case
/// `UnknownParent` — that's the store's job, not the reducers'.
fn arb_event_stream(max_len: usize) -> impl Strategy<Value = Vec<StoredEvent>> {
    proptest::collection::vec(
        (arb_event_payload(), 0usize..3, proptest::option::of(0usize..max_len.max(1))),
        1..=max_len,
    )
    .prop_map(move |specs| {
        use chrono::{TimeZone, Utc};
        let base_ts = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        let heads = ["main", "alt"];
        let mut events: Vec<StoredEvent> = Vec::with_capacity(specs.len());

        for (i, (payload, head_idx, parent_idx)) in specs.into_iter().enumerate() {
            let seq = i as u64 + 1;
            let parent_event_id = parent_idx
                .filter(|&idx| idx < events.len())
                .map(|idx| events[idx].event_id.clone());
            let head_id = HeadId::new(heads[head_idx % heads.len()]);

            let waypoint_id = match &payload {
                EventPayload::WaypointEntered(p) => Some(p.waypoint_id.clone()),
                _ => None,
            };

            events.push(StoredEvent {
                event_id: EventId::new(format!("e{seq}")),
                session_id: SessionId::new("prop"),
                seq,
                kind: payload.kind(),
                ts: base_ts + chrono::Duration::seconds(i as i64),
                actor: pathway_core::Actor::system(),
                head_id,
                parent_event_id,
                waypoint_id,
                payload,
            });
        }
        events
    })
}

proptest! {
    /// Replay determinism (§8): composing the same event stream twice
    /// yields structurally identical `SessionState`s.
    #[test]
    fn compose_is_deterministic(events in arb_event_stream(20)) {
        let first = compose(&events);
        let second = compose(&events);
        prop_assert_eq!(first, second);
    }

    /// Every confidence in the Learned view lies in `[0, 1]`, for any
    /// stream of arbitrary events (§8: "∀ preference/concept/constraint:
    /// confidence ∈ [0,1]").
    #[test]
    fn learned_confidences_stay_in_unit_interval(events in arb_event_stream(20)) {
        let state = compose(&events);
        for entry in state.learned.preferences.values() {
            assert_confidence_in_range(entry.confidence);
        }
        for entry in state.learned.concepts.values() {
            assert_confidence_in_range(entry.confidence);
        }
        for entry in state.learned.constraints.values() {
            assert_confidence_in_range(entry.confidence);
        }
    }

    /// The generator's own invariant (every parent resolves in-stream) and
    /// gapless seqs both survive unchanged through composition: composing
    /// doesn't resequence or drop events.
    #[test]
    fn composed_event_count_matches_input(events in arb_event_stream(20)) {
        assert_seqs_gapless(&events);
        assert_parents_resolve(&events);
        let state = compose(&events);
        prop_assert_eq!(state.event_count, events.len() as u64);
        prop_assert_eq!(state.latest_seq, events.last().map(|e| e.seq).unwrap_or(0));
    }

    /// Learning monotonicity under positive deltas (§8): a series of
    /// `PreferenceLearned(k, v, +δ)` events on the same key/value yields a
    /// non-decreasing confidence sequence, saturating at `1.0`.
    #[test]
    fn positive_preference_deltas_are_monotonic(deltas in proptest::collection::vec(0.0f64..=1.0, 1..15)) {
        use chrono::{TimeZone, Utc};
        use pathway_core::PreferenceLearnedPayload;

        let base_ts = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        let mut events = Vec::new();
        for (i, delta) in deltas.iter().enumerate() {
            let seq = i as u64 + 1;
            events.push(StoredEvent {
                event_id: EventId::new(format!("e{seq}")),
                session_id: SessionId::new("mono"),
                seq,
                kind: pathway_core::EventKind::PreferenceLearned,
                ts: base_ts + chrono::Duration::seconds(i as i64),
                actor: pathway_core::Actor::system(),
                head_id: HeadId::main(),
                parent_event_id: None,
                waypoint_id: None,
                payload: EventPayload::PreferenceLearned(PreferenceLearnedPayload {
                    key: "k".to_string(),
                    value: "v".to_string(),
                    confidence_delta: *delta,
                }),
            });
        }

        let mut running = 0.0f64;
        let mut prev_confidence = None;
        for event in &events {
            let state = compose(&events[..event.seq as usize]);
            let confidence = state.learned.preferences["k"].confidence;
            running = (running + if let EventPayload::PreferenceLearned(p) = &event.payload { p.confidence_delta } else { 0.0 }).min(1.0);
            prop_assert!((confidence - running).abs() < 1e-9);
            if let Some(prev) = prev_confidence {
                prop_assert!(confidence >= prev, "confidence must be non-decreasing under positive deltas");
            }
            prop_assert!(confidence <= 1.0);
            prev_confidence = Some(confidence);
        }
    }

    /// Backtrack does not decrement learned totals (§8): appending a
    /// `Backtracked` event never shrinks the Learned view's entry count.
    #[test]
    fn backtrack_does_not_shrink_learned_view(events in arb_event_stream(15)) {
        use pathway_core::BacktrackedPayload;

        let before = compose(&events);
        let before_count = before.learned.preferences.len()
            + before.learned.concepts.len()
            + before.learned.constraints.len();

        let Some(first) = events.first() else { return Ok(()); };
        let mut with_backtrack = events.clone();
        let seq = with_backtrack.len() as u64 + 1;
        with_backtrack.push(StoredEvent {
            event_id: EventId::new(format!("e{seq}")),
            session_id: first.session_id.clone(),
            seq,
            kind: pathway_core::EventKind::Backtracked,
            ts: with_backtrack.last().unwrap().ts,
            actor: pathway_core::Actor::system(),
            head_id: with_backtrack.last().unwrap().head_id.clone(),
            parent_event_id: None,
            waypoint_id: None,
            payload: EventPayload::Backtracked(BacktrackedPayload {
                target_event_id: first.event_id.clone(),
                reason: None,
            }),
        });

        let after = compose(&with_backtrack);
        let after_count = after.learned.preferences.len()
            + after.learned.concepts.len()
            + after.learned.constraints.len();

        prop_assert!(after_count >= before_count);
    }
}
