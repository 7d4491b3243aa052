//! Proptest generators for envelope fields and the 14 event payloads.

use chrono::{DateTime, TimeZone, Utc};
use pathway_core::{
    Actor, ActorKind, ArtifactCreatedPayload, ArtifactId, ArtifactSupersededPayload, ArtifactType,
    BacktrackedPayload, BlockCategory, BlockedPayload, ChoiceMadePayload, ConceptLearnedPayload,
    ConstraintLearnedPayload, EventId, EventPayload, HeadId, IntentCreatedPayload, MergedPayload,
    PreferenceLearnedPayload, ReplannedPayload, SessionId, SideEffect, StepCompletedPayload,
    TrailVersionCreatedPayload, WaypointEnteredPayload, WaypointId,
};
use proptest::prelude::*;

/// Identifier alphabet matching [`pathway_core::validate::validate_session_id`]'s
/// shape: alphanumeric plus `_`/`-`.
fn arb_id_fragment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,24}"
}

pub fn arb_session_id() -> impl Strategy<Value = SessionId> {
    arb_id_fragment().prop_map(SessionId::new)
}

pub fn arb_event_id() -> impl Strategy<Value = EventId> {
    arb_id_fragment().prop_map(EventId::new)
}

pub fn arb_waypoint_id() -> impl Strategy<Value = WaypointId> {
    arb_id_fragment().prop_map(WaypointId::new)
}

pub fn arb_artifact_id() -> impl Strategy<Value = ArtifactId> {
    arb_id_fragment().prop_map(ArtifactId::new)
}

pub fn arb_head_id() -> impl Strategy<Value = HeadId> {
    prop_oneof![
        Just(HeadId::main()),
        arb_id_fragment().prop_map(HeadId::new),
    ]
}

pub fn arb_actor_kind() -> impl Strategy<Value = ActorKind> {
    prop_oneof![Just(ActorKind::User), Just(ActorKind::System)]
}

pub fn arb_actor() -> impl Strategy<Value = Actor> {
    (arb_actor_kind(), proptest::option::of(arb_id_fragment())).prop_map(|(kind, id)| Actor {
        kind,
        id,
    })
}

pub fn arb_ts() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..2_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap())
}

/// Confidence deltas within the bound the spec places on payload fields:
/// `confidence_delta ∈ [-1, 1]`.
pub fn arb_confidence_delta() -> impl Strategy<Value = f64> {
    -1.0f64..=1.0f64
}

pub fn arb_block_category() -> impl Strategy<Value = BlockCategory> {
    prop_oneof![
        Just(BlockCategory::Dependency),
        Just(BlockCategory::KnowledgeGap),
        Just(BlockCategory::External),
        Just(BlockCategory::Ambiguity),
        Just(BlockCategory::Other),
    ]
}

pub fn arb_artifact_type() -> impl Strategy<Value = ArtifactType> {
    prop_oneof![
        Just(ArtifactType::Code),
        Just(ArtifactType::Doc),
        Just(ArtifactType::Config),
        Just(ArtifactType::Data),
        Just(ArtifactType::Other),
    ]
}

pub fn arb_side_effect() -> impl Strategy<Value = SideEffect> {
    prop_oneof![
        Just(SideEffect::None),
        Just(SideEffect::Local),
        Just(SideEffect::Remote),
    ]
}

pub fn arb_intent_created() -> impl Strategy<Value = EventPayload> {
    (arb_id_fragment(), proptest::option::of(arb_id_fragment())).prop_map(|(goal, context)| {
        EventPayload::IntentCreated(IntentCreatedPayload { goal, context })
    })
}

pub fn arb_trail_version_created() -> impl Strategy<Value = EventPayload> {
    (
        1u32..100,
        proptest::collection::vec(arb_id_fragment(), 0..5),
        proptest::option::of(arb_id_fragment()),
    )
        .prop_map(|(version, waypoints, rationale)| {
            EventPayload::TrailVersionCreated(TrailVersionCreatedPayload {
                version,
                waypoints,
                rationale,
            })
        })
}

pub fn arb_waypoint_entered() -> impl Strategy<Value = EventPayload> {
    (arb_waypoint_id(), arb_id_fragment()).prop_map(|(waypoint_id, kind)| {
        EventPayload::WaypointEntered(WaypointEnteredPayload { waypoint_id, kind })
    })
}

pub fn arb_choice_made() -> impl Strategy<Value = EventPayload> {
    (
        proptest::collection::vec(arb_id_fragment(), 1..5),
        arb_id_fragment(),
        proptest::option::of(arb_id_fragment()),
    )
        .prop_map(|(options, chosen, reason)| {
            EventPayload::ChoiceMade(ChoiceMadePayload {
                options,
                chosen,
                reason,
            })
        })
}

pub fn arb_step_completed() -> impl Strategy<Value = EventPayload> {
    (
        proptest::option::of(arb_waypoint_id()),
        proptest::collection::vec(arb_artifact_id(), 0..3),
        proptest::collection::vec(arb_event_id(), 0..3),
    )
        .prop_map(|(waypoint_id, artifacts, evidence)| {
            EventPayload::StepCompleted(StepCompletedPayload {
                waypoint_id,
                artifacts,
                evidence,
            })
        })
}

pub fn arb_blocked() -> impl Strategy<Value = EventPayload> {
    (
        arb_block_category(),
        arb_id_fragment(),
        proptest::option::of(arb_id_fragment()),
    )
        .prop_map(|(category, detail, suggested_next)| {
            EventPayload::Blocked(BlockedPayload {
                category,
                detail,
                suggested_next,
            })
        })
}

pub fn arb_backtracked() -> impl Strategy<Value = EventPayload> {
    (arb_event_id(), proptest::option::of(arb_id_fragment())).prop_map(|(target_event_id, reason)| {
        EventPayload::Backtracked(BacktrackedPayload {
            target_event_id,
            reason,
        })
    })
}

pub fn arb_replanned() -> impl Strategy<Value = EventPayload> {
    (1u32..100, arb_id_fragment()).prop_map(|(new_trail_version, reason)| {
        EventPayload::Replanned(ReplannedPayload {
            new_trail_version,
            reason,
        })
    })
}

pub fn arb_merged() -> impl Strategy<Value = EventPayload> {
    (
        proptest::collection::vec(arb_id_fragment(), 1..3),
        arb_id_fragment(),
    )
        .prop_map(|(source_head_ids, into_head_id)| {
            EventPayload::Merged(MergedPayload {
                source_head_ids,
                into_head_id,
            })
        })
}

pub fn arb_artifact_created() -> impl Strategy<Value = EventPayload> {
    (
        arb_artifact_id(),
        arb_artifact_type(),
        arb_side_effect(),
        proptest::option::of(arb_id_fragment()),
        proptest::collection::vec(arb_event_id(), 0..3),
    )
        .prop_map(|(artifact_id, artifact_type, side_effects, uri, evidence)| {
            EventPayload::ArtifactCreated(ArtifactCreatedPayload {
                artifact_id,
                artifact_type,
                side_effects,
                uri,
                evidence,
            })
        })
}

pub fn arb_artifact_superseded() -> impl Strategy<Value = EventPayload> {
    (
        arb_artifact_id(),
        arb_artifact_id(),
        proptest::option::of(arb_id_fragment()),
    )
        .prop_map(|(old_artifact_id, new_artifact_id, reason)| {
            EventPayload::ArtifactSuperseded(ArtifactSupersededPayload {
                old_artifact_id,
                new_artifact_id,
                reason,
            })
        })
}

pub fn arb_preference_learned() -> impl Strategy<Value = EventPayload> {
    (arb_id_fragment(), arb_id_fragment(), arb_confidence_delta()).prop_map(
        |(key, value, confidence_delta)| {
            EventPayload::PreferenceLearned(PreferenceLearnedPayload {
                key,
                value,
                confidence_delta,
            })
        },
    )
}

pub fn arb_concept_learned() -> impl Strategy<Value = EventPayload> {
    (
        arb_id_fragment(),
        arb_id_fragment(),
        arb_confidence_delta(),
        proptest::option::of(arb_event_id()),
    )
        .prop_map(|(concept_id, summary, confidence_delta, evidence_event_id)| {
            EventPayload::ConceptLearned(ConceptLearnedPayload {
                concept_id,
                summary,
                confidence_delta,
                evidence_event_id,
            })
        })
}

pub fn arb_constraint_learned() -> impl Strategy<Value = EventPayload> {
    (arb_id_fragment(), arb_id_fragment(), arb_confidence_delta()).prop_map(
        |(key, value, confidence_delta)| {
            EventPayload::ConstraintLearned(ConstraintLearnedPayload {
                key,
                value,
                confidence_delta,
            })
        },
    )
}

/// Any one of the 14 event payload kinds, uniformly chosen.
pub fn arb_event_payload() -> impl Strategy<Value = EventPayload> {
    prop_oneof![
        arb_intent_created(),
        arb_trail_version_created(),
        arb_waypoint_entered(),
        arb_choice_made(),
        arb_step_completed(),
        arb_blocked(),
        arb_backtracked(),
        arb_replanned(),
        arb_merged(),
        arb_artifact_created(),
        arb_artifact_superseded(),
        arb_preference_learned(),
        arb_concept_learned(),
        arb_constraint_learned(),
    ]
}
