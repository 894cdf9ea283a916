//! Live sessions, keyed by id

use super::{SessionConfig, SessionContext, SessionError};
use crate::llm::{LlmConfig, LlmError, LlmService};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared handle to one session. Holding the lock serializes its turns.
pub type SessionHandle = Arc<Mutex<SessionContext>>;

type Connector = Box<dyn Fn() -> Result<Arc<dyn LlmService>, LlmError> + Send + Sync>;

/// Owns every live session. Sessions never share state with each other.
pub struct SessionRegistry {
    connector: Connector,
    config: SessionConfig,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(
        connector: impl Fn() -> Result<Arc<dyn LlmService>, LlmError> + Send + Sync + 'static,
        config: SessionConfig,
    ) -> Self {
        Self {
            connector: Box::new(connector),
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Registry whose sessions use the configured provider. Credentials are
    /// checked each time a session is created.
    pub fn from_llm_config(llm_config: LlmConfig, config: SessionConfig) -> Self {
        Self::new(move || llm_config.build_service(), config)
    }

    fn connect(&self) -> Result<SessionContext, SessionError> {
        let llm = (self.connector)().map_err(SessionError::CollaboratorUnavailable)?;
        let mut context = SessionContext::new(llm, self.config);
        context.initialize();
        Ok(context)
    }

    /// Create and initialize a session under a fresh id
    pub async fn create(&self) -> Result<(String, SessionHandle), SessionError> {
        let id = uuid::Uuid::new_v4().to_string();
        let handle = self.insert(&id).await?;
        Ok((id, handle))
    }

    /// Existing session, or a new one registered under the given id
    pub async fn get_or_create(&self, id: &str) -> Result<SessionHandle, SessionError> {
        if let Some(handle) = self.get(id).await {
            return Ok(handle);
        }

        // Another caller may have created it between the read and write locks
        let mut sessions = self.sessions.write().await;
        if let Some(handle) = sessions.get(id) {
            return Ok(Arc::clone(handle));
        }
        tracing::info!(session_id = %id, "Recreating missing session");
        let handle = Arc::new(Mutex::new(self.connect()?));
        sessions.insert(id.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Replace a session with a freshly initialized one
    pub async fn reset(&self, id: &str) -> Result<SessionHandle, SessionError> {
        let mut sessions = self.sessions.write().await;
        let Some(slot) = sessions.get_mut(id) else {
            return Err(SessionError::NotFound(id.to_string()));
        };
        tracing::info!(session_id = %id, "Resetting session");
        let handle = Arc::new(Mutex::new(self.connect()?));
        *slot = Arc::clone(&handle);
        Ok(handle)
    }

    /// Drop a session. Returns whether it existed.
    pub async fn evict(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session evicted");
        }
        removed
    }

    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn insert(&self, id: &str) -> Result<SessionHandle, SessionError> {
        let handle = Arc::new(Mutex::new(self.connect()?));
        self.sessions
            .write()
            .await
            .insert(id.to_string(), Arc::clone(&handle));
        tracing::info!(session_id = %id, "Session created");
        Ok(handle)
    }
}
