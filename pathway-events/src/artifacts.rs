//! Artifact reducer: active/superseded artifact sets and supersedence
//! chains.

use pathway_core::{ArtifactEntry, ArtifactId, ArtifactView, EventId, EventPayload, ReducerWarning, StoredEvent};
use std::collections::{HashMap, HashSet};

/// Folds `events` (in `seq` order) into an [`ArtifactView`] plus any
/// warnings raised along the way.
pub fn reduce_artifacts(events: &[StoredEvent]) -> (ArtifactView, Vec<ReducerWarning>) {
    let mut artifacts: HashMap<ArtifactId, ArtifactEntry> = HashMap::new();
    let mut warnings = Vec::new();
    // Supersedence links recorded before their `new_artifact_id` appeared,
    // so they can be resolved once (or reported as dangling) at the end.
    let mut pending: Vec<(ArtifactId, ArtifactId, EventId)> = Vec::new();

    for event in events {
        match &event.payload {
            EventPayload::ArtifactCreated(payload) => {
                if artifacts.contains_key(&payload.artifact_id) {
                    warnings.push(ReducerWarning::DuplicateArtifact {
                        artifact_id: payload.artifact_id.clone(),
                        event_id: event.event_id.clone(),
                    });
                    continue;
                }
                artifacts.insert(
                    payload.artifact_id.clone(),
                    ArtifactEntry {
                        artifact_type: payload.artifact_type,
                        created_event_id: event.event_id.clone(),
                        waypoint_id: event.waypoint_id.clone(),
                        superseded_by: None,
                    },
                );
            }
            EventPayload::ArtifactSuperseded(payload) => {
                if let Some(entry) = artifacts.get_mut(&payload.old_artifact_id) {
                    entry.superseded_by = Some(payload.new_artifact_id.clone());
                    if !artifacts.contains_key(&payload.new_artifact_id) {
                        pending.push((
                            payload.old_artifact_id.clone(),
                            payload.new_artifact_id.clone(),
                            event.event_id.clone(),
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    pending.retain(|(_, new_id, _)| !artifacts.contains_key(new_id));
    for (old_id, new_id, _) in &pending {
        warnings.push(ReducerWarning::DanglingSupersedence {
            old_artifact_id: old_id.clone(),
            new_artifact_id: new_id.clone(),
        });
    }

    let (chains, cycle_warnings) = build_chains(&artifacts);
    warnings.extend(cycle_warnings);

    (ArtifactView { artifacts, chains }, warnings)
}

/// Walks from every artifact with no inbound supersedence link (i.e.
/// nothing else's `superseded_by` names it) forward along `superseded_by`,
/// producing ordered chains of length ≥ 2. Breaks at a repeating node on
/// cycle detection, emitting a warning.
///
/// A cycle with no external entry point (every node in it has an inbound
/// link, e.g. `a1 -> a2 -> a1`) has no start node at all, so the pass above
/// never reaches it. A second pass walks every artifact the first pass
/// never covered, which by construction can only be rootless cycles, and
/// emits one warning per cycle.
fn build_chains(
    artifacts: &HashMap<ArtifactId, ArtifactEntry>,
) -> (Vec<Vec<ArtifactId>>, Vec<ReducerWarning>) {
    let mut has_inbound: HashSet<&ArtifactId> = HashSet::new();
    for entry in artifacts.values() {
        if let Some(target) = &entry.superseded_by {
            has_inbound.insert(target);
        }
    }

    let mut starts: Vec<&ArtifactId> = artifacts
        .keys()
        .filter(|id| !has_inbound.contains(id))
        .collect();
    starts.sort();

    let mut chains = Vec::new();
    let mut warnings = Vec::new();
    let mut covered: HashSet<ArtifactId> = HashSet::new();

    for start in starts {
        let mut chain = vec![start.clone()];
        let mut visited: HashSet<ArtifactId> = HashSet::new();
        visited.insert(start.clone());
        covered.insert(start.clone());

        let mut current = artifacts.get(start).and_then(|e| e.superseded_by.as_ref());
        while let Some(next_id) = current {
            if visited.contains(next_id) {
                warnings.push(ReducerWarning::SupersedenceCycle {
                    artifact_id: next_id.clone(),
                });
                break;
            }
            chain.push(next_id.clone());
            visited.insert(next_id.clone());
            covered.insert(next_id.clone());
            current = artifacts.get(next_id).and_then(|e| e.superseded_by.as_ref());
        }

        if chain.len() > 1 {
            chains.push(chain);
        }
    }

    let mut rootless: Vec<&ArtifactId> = artifacts
        .keys()
        .filter(|id| !covered.contains(*id))
        .collect();
    rootless.sort();

    let mut cycle_handled: HashSet<ArtifactId> = HashSet::new();
    for start in rootless {
        if cycle_handled.contains(start) {
            continue;
        }
        let mut seen: HashSet<ArtifactId> = HashSet::new();
        let mut current = Some(start.clone());
        while let Some(cur) = current {
            if seen.contains(&cur) {
                warnings.push(ReducerWarning::SupersedenceCycle { artifact_id: cur.clone() });
                break;
            }
            seen.insert(cur.clone());
            current = artifacts.get(&cur).and_then(|e| e.superseded_by.clone());
        }
        cycle_handled.extend(seen);
    }

    (chains, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathway_test_utils::fixtures;

    #[test]
    fn supersedence_chain_in_order() {
        let events = fixtures::supersedence_chain("s4");
        let (view, warnings) = reduce_artifacts(&events);
        assert!(warnings.is_empty());
        assert_eq!(view.chains.len(), 1);
        assert_eq!(
            view.chains[0],
            vec![
                ArtifactId::new("a1"),
                ArtifactId::new("a2"),
                ArtifactId::new("a3"),
            ]
        );
        let active: Vec<&ArtifactId> = view.active_artifacts();
        assert_eq!(active, vec![&ArtifactId::new("a3")]);
        assert_eq!(view.superseded_artifacts().len(), 2);
    }

    #[test]
    fn rootless_supersedence_cycle_is_warned() {
        use pathway_core::{ArtifactCreatedPayload, ArtifactSupersededPayload, ArtifactType, EventPayload, SideEffect};

        let mut builder = fixtures::EventSeqBuilder::new("s6");
        builder.push(
            "main",
            None,
            None,
            EventPayload::ArtifactCreated(ArtifactCreatedPayload {
                artifact_id: "a1".into(),
                artifact_type: ArtifactType::Code,
                side_effects: SideEffect::None,
                uri: None,
                evidence: Vec::new(),
            }),
        );
        builder.push(
            "main",
            None,
            None,
            EventPayload::ArtifactCreated(ArtifactCreatedPayload {
                artifact_id: "a2".into(),
                artifact_type: ArtifactType::Code,
                side_effects: SideEffect::None,
                uri: None,
                evidence: Vec::new(),
            }),
        );
        builder.push(
            "main",
            None,
            None,
            EventPayload::ArtifactSuperseded(ArtifactSupersededPayload {
                old_artifact_id: "a1".into(),
                new_artifact_id: "a2".into(),
                reason: None,
            }),
        );
        builder.push(
            "main",
            None,
            None,
            EventPayload::ArtifactSuperseded(ArtifactSupersededPayload {
                old_artifact_id: "a2".into(),
                new_artifact_id: "a1".into(),
                reason: None,
            }),
        );
        let events = builder.build();

        let (view, warnings) = reduce_artifacts(&events);
        assert!(view.chains.is_empty());
        assert_eq!(
            warnings
                .iter()
                .filter(|w| matches!(w, ReducerWarning::SupersedenceCycle { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn duplicate_artifact_create_keeps_first_and_warns() {
        use pathway_core::{ArtifactCreatedPayload, ArtifactType, EventPayload, SideEffect};

        let mut builder = fixtures::EventSeqBuilder::new("s5");
        builder.push(
            "main",
            None,
            None,
            EventPayload::ArtifactCreated(ArtifactCreatedPayload {
                artifact_id: "a1".into(),
                artifact_type: ArtifactType::Code,
                side_effects: SideEffect::None,
                uri: None,
                evidence: Vec::new(),
            }),
        );
        builder.push(
            "main",
            None,
            None,
            EventPayload::ArtifactCreated(ArtifactCreatedPayload {
                artifact_id: "a1".into(),
                artifact_type: ArtifactType::Doc,
                side_effects: SideEffect::None,
                uri: None,
                evidence: Vec::new(),
            }),
        );
        let events = builder.build();

        let (view, warnings) = reduce_artifacts(&events);
        assert_eq!(warnings.len(), 1);
        assert_eq!(view.artifacts[&ArtifactId::new("a1")].artifact_type, ArtifactType::Code);
    }
}
