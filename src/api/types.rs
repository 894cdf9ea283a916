//! API request and response types

use crate::db::StoredSnapshot;
use crate::extraction::ExtractionStatus;
use crate::family::FamilyData;
use crate::session::SessionSnapshot;
use crate::state_machine::Phase;
use crate::transcript::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Request to restore a saved session
#[derive(Debug, Default, Deserialize)]
pub struct RestoreRequest {
    /// Snapshot JSON as previously returned by save. When absent the stored
    /// snapshot for the session is used.
    #[serde(default)]
    pub saved_data: Option<Value>,
}

/// Response carrying an assistant reply
#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub response: String,
    pub phase: Phase,
}

/// Response for session creation and reset
#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: String,
    pub response: String,
    pub phase: Phase,
}

/// Full view of one session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub phase: Phase,
    pub messages: Vec<Message>,
    pub family_data: FamilyData,
}

/// Response for save
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub snapshot: SessionSnapshot,
    pub summary: String,
    pub extraction_status: ExtractionStatus,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotListResponse {
    pub snapshots: Vec<StoredSnapshot>,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
