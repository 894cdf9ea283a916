//! Property-based tests for the phase state machine
//!
//! These tests verify key invariants hold across arbitrary transcript growth.

use super::*;
use crate::transcript::{Message, Role, Transcript};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_phase() -> impl Strategy<Value = Phase> {
    prop_oneof![
        Just(Phase::InitialDataCollection),
        Just(Phase::DeepDive),
        Just(Phase::Analysis),
    ]
}

fn arb_policy() -> impl Strategy<Value = CountingPolicy> {
    prop_oneof![Just(CountingPolicy::NonSystem), Just(CountingPolicy::UserOnly)]
}

fn arb_message() -> impl Strategy<Value = Message> {
    ("[a-z ]{0,20}", 0u8..4).prop_map(|(text, kind)| match kind {
        0 => Message::system(text),
        1 => Message::user(text),
        2 => Message::assistant(text),
        _ => Message::greeting(text),
    })
}

/// Batches of messages appended between controller steps
fn arb_growth() -> impl Strategy<Value = Vec<Vec<Message>>> {
    proptest::collection::vec(proptest::collection::vec(arb_message(), 0..5), 0..30)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn transition_never_regresses(phase in arb_phase(), counted in 0usize..100) {
        let result = transition(phase, counted);
        prop_assert!(result.new_phase >= phase);
        // A directive is emitted exactly when the phase changes
        prop_assert_eq!(result.directive.is_some(), result.new_phase != phase);
    }

    #[test]
    fn terminal_phase_is_absorbing(counted in 0usize..1_000) {
        let result = transition(Phase::Analysis, counted);
        prop_assert_eq!(result.new_phase, Phase::Analysis);
        prop_assert!(result.directive.is_none());
    }

    #[test]
    fn controller_is_monotonic(policy in arb_policy(), growth in arb_growth()) {
        let mut controller = PhaseController::new(policy);
        let mut transcript = Transcript::new();
        let mut last = controller.phase();
        let mut directives = 0usize;

        for batch in growth {
            for msg in batch {
                transcript.push(msg);
            }
            let step = controller.advance(&transcript);
            prop_assert!(step.phase >= last);
            if let Some(directive) = step.directive {
                prop_assert_eq!(directive.role, Role::System);
                transcript.push(directive);
                directives += 1;
            }
            last = step.phase;
        }

        // Each transition fires at most once per session
        prop_assert!(directives <= 2);
        let expected = match last {
            Phase::InitialDataCollection => 0,
            Phase::DeepDive => 1,
            Phase::Analysis => 2,
        };
        prop_assert_eq!(directives, expected);
    }

    #[test]
    fn restored_controller_never_goes_back(
        start in arb_phase(),
        growth in arb_growth(),
    ) {
        let mut controller = PhaseController::default();
        controller.restore(start);
        let mut transcript = Transcript::new();
        for batch in growth {
            for msg in batch {
                transcript.push(msg);
            }
            prop_assert!(controller.advance(&transcript).phase >= start);
        }
    }
}
