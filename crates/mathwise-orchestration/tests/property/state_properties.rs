//! Property tests for the pipeline-state merge policy.

use proptest::prelude::*;

use mathwise_core::models::InputType;
use mathwise_orchestration::state::{ErrorEntry, TraceEvent};
use mathwise_orchestration::{GraphState, PipelineState, StateUpdate, Status};

#[derive(Debug, Clone)]
struct UpdateSpec {
    solution: Option<String>,
    confidence: Option<f64>,
    needs_human: Option<bool>,
    issues: Vec<String>,
    errors: usize,
    traces: usize,
}

fn update_spec() -> impl Strategy<Value = UpdateSpec> {
    (
        proptest::option::of("[a-z ]{0,12}"),
        proptest::option::of(0.0f64..=1.0),
        proptest::option::of(any::<bool>()),
        proptest::collection::vec("[a-z]{1,6}", 0..3),
        0usize..3,
        0usize..3,
    )
        .prop_map(
            |(solution, confidence, needs_human, issues, errors, traces)| UpdateSpec {
                solution,
                confidence,
                needs_human,
                issues,
                errors,
                traces,
            },
        )
}

fn to_update(spec: &UpdateSpec) -> StateUpdate {
    StateUpdate {
        current_solution: spec.solution.clone(),
        verification_confidence: spec.confidence,
        needs_human: spec.needs_human,
        verification_issues: spec.issues.clone(),
        errors: (0..spec.errors)
            .map(|i| ErrorEntry::new("solver", "failed", format!("attempt {i}")))
            .collect(),
        agent_trace: (0..spec.traces).map(|_| TraceEvent::started("solver")).collect(),
        ..StateUpdate::default()
    }
}

proptest! {
    #[test]
    fn append_fields_accumulate_and_replace_fields_keep_last(
        specs in proptest::collection::vec(update_spec(), 0..8)
    ) {
        let mut state = PipelineState::new("x", InputType::Text);
        for spec in &specs {
            state.merge(to_update(spec));
        }

        let issues: Vec<String> = specs.iter().flat_map(|s| s.issues.clone()).collect();
        prop_assert_eq!(&state.verification_issues, &issues);
        prop_assert_eq!(state.errors.len(), specs.iter().map(|s| s.errors).sum::<usize>());
        prop_assert_eq!(state.agent_trace.len(), specs.iter().map(|s| s.traces).sum::<usize>());

        let last_solution = specs.iter().rev().find_map(|s| s.solution.clone()).unwrap_or_default();
        prop_assert_eq!(&state.current_solution, &last_solution);
        let last_confidence = specs.iter().rev().find_map(|s| s.confidence);
        prop_assert_eq!(state.verification_confidence, last_confidence);
        let last_human = specs.iter().rev().find_map(|s| s.needs_human).unwrap_or(false);
        prop_assert_eq!(state.needs_human, last_human);

        // Nothing above writes status.
        prop_assert_eq!(state.status, Status::Processing);
    }

    #[test]
    fn empty_update_is_identity(spec in update_spec()) {
        let mut state = PipelineState::new("x", InputType::Text);
        state.merge(to_update(&spec));
        let before = state.clone();
        state.merge(StateUpdate::default());
        prop_assert_eq!(state, before);
    }
}
