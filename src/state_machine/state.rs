//! Phase and progress-counting types

use crate::transcript::{Message, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dialogue phase
///
/// Declaration order is progression order, so `Ord` can be used to check
/// that a phase never regresses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Mapping who is in the family
    #[default]
    InitialDataCollection,
    /// Communication, decision-making and conflict patterns
    DeepDive,
    /// Surfacing observed patterns. Terminal.
    Analysis,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::InitialDataCollection => "initial_data_collection",
            Phase::DeepDive => "deep_dive",
            Phase::Analysis => "analysis",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial_data_collection" => Ok(Phase::InitialDataCollection),
            "deep_dive" => Ok(Phase::DeepDive),
            "analysis" => Ok(Phase::Analysis),
            other => Err(format!("unknown phase: {other}")),
        }
    }
}

/// Which transcript messages count as progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingPolicy {
    /// Every user and assistant message
    #[default]
    NonSystem,
    /// Only user messages
    UserOnly,
}

impl CountingPolicy {
    /// Count progress messages. Initialization greetings never count.
    pub fn count(self, messages: &[Message]) -> usize {
        messages
            .iter()
            .filter(|m| !m.is_initialization())
            .filter(|m| match (self, m.role) {
                (_, Role::System) | (CountingPolicy::UserOnly, Role::Assistant) => false,
                (_, Role::User) | (CountingPolicy::NonSystem, Role::Assistant) => true,
            })
            .count()
    }
}

impl FromStr for CountingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "non_system" => Ok(CountingPolicy::NonSystem),
            "user_only" => Ok(CountingPolicy::UserOnly),
            other => Err(format!("unknown counting policy: {other}")),
        }
    }
}
