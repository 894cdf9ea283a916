//! HTTP API
//!
//! A thin layer over the session registry and snapshot store.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::db::SnapshotStore;
use crate::session::SessionRegistry;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub snapshots: Arc<dyn SnapshotStore>,
}

impl AppState {
    pub fn new(sessions: SessionRegistry, snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self {
            sessions: Arc::new(sessions),
            snapshots,
        }
    }
}
