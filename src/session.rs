//! Conversation sessions
//!
//! A session owns one transcript, one entity store, and one phase
//! controller. Sessions share nothing; the registry hands each caller a
//! locked handle so turns within a session are serialized.

mod context;
pub mod prompts;
mod registry;
pub mod summary;

pub use context::{SaveOutcome, SessionContext, Turn};
pub use registry::{SessionHandle, SessionRegistry};

use crate::family::FamilyData;
use crate::llm::LlmError;
use crate::state_machine::{CountingPolicy, Phase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Session-level failures. Everything else degrades inside the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("text generation unavailable: {0}")]
    CollaboratorUnavailable(#[source] LlmError),
    #[error("session not found: {0}")]
    NotFound(String),
}

/// Per-session tunables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub counting: CountingPolicy,
    pub reply_max_tokens: u32,
    pub reply_temperature: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            counting: CountingPolicy::default(),
            reply_max_tokens: 1000,
            reply_temperature: 0.7,
        }
    }
}

impl SessionConfig {
    /// Read `FAMILY_PHASE_COUNTING`; unknown values fall back to the default
    pub fn from_env() -> Self {
        let counting = match std::env::var("FAMILY_PHASE_COUNTING") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "Ignoring FAMILY_PHASE_COUNTING");
                CountingPolicy::default()
            }),
            Err(_) => CountingPolicy::default(),
        };
        Self {
            counting,
            ..Self::default()
        }
    }
}

/// Timestamp keys in order of preference; `last_updated` is the older name
const TIMESTAMP_KEYS: [&str; 2] = ["saved_at", "last_updated"];

/// Persisted state of a session: the family record and the phase reached.
///
/// Deserialization never fails on content: each field is read on its own
/// and falls back to its default, so one bad field cannot discard the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub family_data: FamilyData,
    pub phase: Phase,
    pub saved_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn new(family_data: FamilyData, phase: Phase) -> Self {
        Self {
            family_data,
            phase,
            saved_at: Utc::now(),
        }
    }

    /// Build a snapshot from caller-supplied JSON, keeping every readable field
    pub fn from_untrusted(value: Value) -> Self {
        let Some(map) = value.as_object() else {
            tracing::warn!("Saved data is not an object, restoring an empty snapshot");
            return Self::new(FamilyData::default(), Phase::default());
        };

        let family_data = map
            .get("family_data")
            .cloned()
            .map(FamilyData::from)
            .unwrap_or_default();

        let phase = match map.get("phase").and_then(Value::as_str) {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "Saved phase unreadable, using default");
                Phase::default()
            }),
            None => Phase::default(),
        };

        let saved_at = TIMESTAMP_KEYS
            .iter()
            .find_map(|key| {
                let raw = map.get(*key)?.as_str()?;
                DateTime::parse_from_rfc3339(raw).ok()
            })
            .map_or_else(Utc::now, |t| t.with_timezone(&Utc));

        Self {
            family_data,
            phase,
            saved_at,
        }
    }
}

impl<'de> Deserialize<'de> for SessionSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_untrusted(Value::deserialize(deserializer)?))
    }
}
