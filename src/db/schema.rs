//! Database schema and row types

use crate::session::SessionSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS snapshots (
    session_id TEXT PRIMARY KEY,
    phase TEXT NOT NULL,
    family_data TEXT NOT NULL,
    saved_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_snapshots_saved ON snapshots(saved_at DESC);
";

/// Snapshot row keyed by the session that saved it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSnapshot {
    pub session_id: String,
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
}

pub(super) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
