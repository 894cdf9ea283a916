//! Per-session owner of the current phase

use super::transition::{transition, Directive};
use super::{CountingPolicy, Phase};
use crate::transcript::{Message, Transcript};

/// Outcome of a controller step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseAdvance {
    pub phase: Phase,
    /// System message to append to the transcript, if a phase was entered
    pub directive: Option<Message>,
}

#[derive(Debug, Clone, Default)]
pub struct PhaseController {
    phase: Phase,
    policy: CountingPolicy,
}

impl PhaseController {
    pub fn new(policy: CountingPolicy) -> Self {
        Self {
            phase: Phase::InitialDataCollection,
            policy,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Inspect the transcript and move forward if a threshold was crossed.
    ///
    /// The returned directive is not appended here; the caller owns the transcript.
    pub fn advance(&mut self, transcript: &Transcript) -> PhaseAdvance {
        let counted = self.policy.count(transcript.messages());
        let result = transition(self.phase, counted);

        if result.new_phase != self.phase {
            tracing::info!(
                from = %self.phase,
                to = %result.new_phase,
                message_count = counted,
                "Phase transition"
            );
        }
        debug_assert!(result.new_phase >= self.phase);
        self.phase = result.new_phase;

        PhaseAdvance {
            phase: self.phase,
            directive: result.directive.map(Directive::to_message),
        }
    }

    /// Place the controller directly into a saved phase. Skipped directives
    /// are not emitted.
    pub fn restore(&mut self, phase: Phase) {
        self.phase = phase;
    }
}
