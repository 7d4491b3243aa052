//! Custom assertions for Pathway-specific invariants (§8).

use pathway_core::StoredEvent;

/// Asserts that `events`' seqs are exactly `{1..events.len()}`, i.e. gapless
/// and starting at 1, regardless of the order they appear in `events`.
pub fn assert_seqs_gapless(events: &[StoredEvent]) {
    let mut seqs: Vec<u64> = events.iter().map(|e| e.seq).collect();
    seqs.sort_unstable();
    let expected: Vec<u64> = (1..=events.len() as u64).collect();
    assert_eq!(seqs, expected, "seqs must be exactly {{1..N}} with no gaps");
}

/// Asserts every event whose `parent_event_id` is set resolves to an event
/// in the same slice with strictly smaller `seq`.
pub fn assert_parents_resolve(events: &[StoredEvent]) {
    use std::collections::HashMap;
    let by_id: HashMap<&pathway_core::EventId, &StoredEvent> =
        events.iter().map(|e| (&e.event_id, e)).collect();
    for event in events {
        if let Some(parent_id) = &event.parent_event_id {
            let parent = by_id
                .get(parent_id)
                .unwrap_or_else(|| panic!("parent {:?} does not resolve", parent_id));
            assert!(
                parent.seq < event.seq,
                "parent seq {} must be smaller than child seq {}",
                parent.seq,
                event.seq
            );
        }
    }
}

/// Asserts a confidence value lies in the closed unit interval.
pub fn assert_confidence_in_range(confidence: f64) {
    assert!(
        (0.0..=1.0).contains(&confidence),
        "confidence {} out of [0,1]",
        confidence
    );
}
