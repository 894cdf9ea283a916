//! Dialogue phase state machine
//!
//! Pure transition function plus a small controller that owns the current
//! phase for one session. Phases only move forward.

mod controller;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use controller::{PhaseAdvance, PhaseController};
pub use state::{CountingPolicy, Phase};
pub use transition::{transition, Directive, TransitionResult};
