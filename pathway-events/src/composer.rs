//! Session composer: folds one session's ordered event stream through all
//! three reducers and assembles a [`SessionState`].

use crate::artifacts::reduce_artifacts;
use crate::journey::reduce_journey;
use crate::learned::reduce_learned;
use pathway_core::{SessionState, StoredEvent};

/// Composes a [`SessionState`] from `events`, which callers must already
/// have ordered by `seq` (the store guarantees this on read).
///
/// Pure over its input: replaying the same events always yields the same
/// state, since none of the three reducers hold state beyond the view they
/// build during the fold.
pub fn compose(events: &[StoredEvent]) -> SessionState {
    let journey = reduce_journey(events);
    let learned = reduce_learned(events);
    let (artifacts, mut warnings) = reduce_artifacts(events);

    let latest_seq = events.last().map(|e| e.seq).unwrap_or(0);
    let event_count = events.len() as u64;

    warnings.sort_by(warning_sort_key);
    for warning in &warnings {
        tracing::warn!(?warning, "reducer warning");
    }

    SessionState {
        journey,
        learned,
        artifacts,
        event_count,
        latest_seq,
        warnings,
    }
}

/// Orders warnings by variant then by their leading id, so composing the
/// same events always returns warnings in the same order.
fn warning_sort_key(a: &pathway_core::ReducerWarning, b: &pathway_core::ReducerWarning) -> std::cmp::Ordering {
    fn rank(w: &pathway_core::ReducerWarning) -> (u8, String) {
        use pathway_core::ReducerWarning::*;
        match w {
            DuplicateArtifact { artifact_id, .. } => (0, artifact_id.as_str().to_string()),
            SupersedenceCycle { artifact_id } => (1, artifact_id.as_str().to_string()),
            DanglingSupersedence { old_artifact_id, .. } => (2, old_artifact_id.as_str().to_string()),
        }
    }
    rank(a).cmp(&rank(b))
}
