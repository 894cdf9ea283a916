//! Snapshot persistence
//!
//! Saved sessions outlive the process; live sessions do not.

mod schema;

pub use schema::{StoredSnapshot, SCHEMA};

use crate::family::FamilyData;
use crate::session::SessionSnapshot;
use crate::state_machine::Phase;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Database lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Where saved sessions are kept
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert or replace the snapshot for a session
    async fn save(&self, session_id: &str, snapshot: &SessionSnapshot) -> DbResult<()>;

    /// Latest snapshot for a session, if any was saved
    async fn load(&self, session_id: &str) -> DbResult<Option<SessionSnapshot>>;

    /// All saved snapshots, newest first
    async fn list(&self) -> DbResult<Vec<StoredSnapshot>>;
}

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.lock()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn save_snapshot(&self, session_id: &str, snapshot: &SessionSnapshot) -> DbResult<()> {
        let family_data = serde_json::to_string(&snapshot.family_data)?;
        self.lock()?.execute(
            "INSERT INTO snapshots (session_id, phase, family_data, saved_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(session_id) DO UPDATE SET
                phase = excluded.phase,
                family_data = excluded.family_data,
                saved_at = excluded.saved_at",
            params![
                session_id,
                snapshot.phase.as_str(),
                family_data,
                snapshot.saved_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn load_snapshot(&self, session_id: &str) -> DbResult<Option<SessionSnapshot>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT phase, family_data, saved_at FROM snapshots WHERE session_id = ?1",
                params![session_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(phase, data, saved_at)| decode_snapshot(&phase, &data, &saved_at))
            .transpose()
    }

    pub fn list_snapshots(&self) -> DbResult<Vec<StoredSnapshot>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT session_id, phase, family_data, saved_at FROM snapshots
             ORDER BY saved_at DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(session_id, phase, data, saved_at)| {
                Ok(StoredSnapshot {
                    session_id,
                    snapshot: decode_snapshot(&phase, &data, &saved_at)?,
                })
            })
            .collect()
    }
}

/// Stored rows pass through the same filtering as any untrusted input
fn decode_snapshot(phase: &str, family_data: &str, saved_at: &str) -> DbResult<SessionSnapshot> {
    let value: Value = serde_json::from_str(family_data)?;
    Ok(SessionSnapshot {
        family_data: FamilyData::from(value),
        phase: phase.parse().unwrap_or_else(|e: String| {
            tracing::warn!(error = %e, "Stored phase unreadable, using default");
            Phase::default()
        }),
        saved_at: schema::parse_datetime(saved_at),
    })
}

#[async_trait]
impl SnapshotStore for Database {
    async fn save(&self, session_id: &str, snapshot: &SessionSnapshot) -> DbResult<()> {
        self.save_snapshot(session_id, snapshot)
    }

    async fn load(&self, session_id: &str) -> DbResult<Option<SessionSnapshot>> {
        self.load_snapshot(session_id)
    }

    async fn list(&self) -> DbResult<Vec<StoredSnapshot>> {
        self.list_snapshots()
    }
}

/// Process-local store, used when no database path is configured and in tests
#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshots: Mutex<HashMap<String, SessionSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, HashMap<String, SessionSnapshot>>> {
        self.snapshots.lock().map_err(|_| DbError::Poisoned)
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, session_id: &str, snapshot: &SessionSnapshot) -> DbResult<()> {
        self.lock()?
            .insert(session_id.to_string(), snapshot.clone());
        Ok(())
    }

    async fn load(&self, session_id: &str) -> DbResult<Option<SessionSnapshot>> {
        Ok(self.lock()?.get(session_id).cloned())
    }

    async fn list(&self) -> DbResult<Vec<StoredSnapshot>> {
        let mut all: Vec<StoredSnapshot> = self
            .lock()?
            .iter()
            .map(|(id, snapshot)| StoredSnapshot {
                session_id: id.clone(),
                snapshot: snapshot.clone(),
            })
            .collect();
        all.sort_by(|a, b| b.snapshot.saved_at.cmp(&a.snapshot.saved_at));
        Ok(all)
    }
}
