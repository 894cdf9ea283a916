//! Pure phase transition function
//!
//! Given the same phase and message count this always produces the same
//! result, with no I/O. The controller is responsible for applying it.

use super::Phase;
use crate::transcript::Message;

/// Counted messages must exceed this to leave initial data collection
pub const DEEP_DIVE_AFTER: usize = 6;
/// Counted messages must exceed this to move from deep dive to analysis
pub const ANALYSIS_AFTER: usize = 14;

/// Guidance appended to the transcript when a phase is entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    ExploreDynamics,
    SurfaceInsights,
}

impl Directive {
    pub fn text(self) -> &'static str {
        match self {
            Directive::ExploreDynamics => {
                "The user has provided basic family information. Now transition to exploring \
                 deeper dynamics like communication patterns, decision-making, and conflicts."
            }
            Directive::SurfaceInsights => {
                "Now provide insights about patterns you've observed in their family dynamics. \
                 Offer thoughtful observations that might help them understand their family better."
            }
        }
    }

    pub fn to_message(self) -> Message {
        Message::system(self.text())
    }
}

/// Result of a phase transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_phase: Phase,
    pub directive: Option<Directive>,
}

impl TransitionResult {
    fn stay(phase: Phase) -> Self {
        Self {
            new_phase: phase,
            directive: None,
        }
    }

    fn enter(phase: Phase, directive: Directive) -> Self {
        Self {
            new_phase: phase,
            directive: Some(directive),
        }
    }
}

/// Evaluate the transition table. At most one step is taken per call.
pub fn transition(phase: Phase, counted: usize) -> TransitionResult {
    match phase {
        Phase::InitialDataCollection if counted > DEEP_DIVE_AFTER => {
            TransitionResult::enter(Phase::DeepDive, Directive::ExploreDynamics)
        }
        Phase::DeepDive if counted > ANALYSIS_AFTER => {
            TransitionResult::enter(Phase::Analysis, Directive::SurfaceInsights)
        }
        Phase::InitialDataCollection | Phase::DeepDive | Phase::Analysis => {
            TransitionResult::stay(phase)
        }
    }
}
