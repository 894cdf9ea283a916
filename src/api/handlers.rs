//! HTTP request handlers

use super::types::{
    ChatRequest, ErrorResponse, ReplyResponse, RestoreRequest, SaveResponse,
    SessionCreatedResponse, SessionListResponse, SessionResponse, SnapshotListResponse,
    SuccessResponse,
};
use super::AppState;
use crate::db::DbError;
use crate::session::{SessionError, SessionSnapshot};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/save", post(save_session))
        .route("/api/sessions/:id/restore", post(restore_session))
        .route("/api/sessions/:id/reset", post(reset_session))
        .route("/api/snapshots", get(list_snapshots))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.sessions.ids().await,
    })
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<SessionCreatedResponse>, AppError> {
    let (session_id, handle) = state.sessions.create().await?;
    let mut session = handle.lock().await;
    Ok(Json(SessionCreatedResponse {
        session_id,
        response: session.initialize(),
        phase: session.phase(),
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))?;
    let session = handle.lock().await;
    Ok(Json(SessionResponse {
        session_id: id,
        phase: session.phase(),
        messages: session.transcript().dialogue().cloned().collect(),
        family_data: session.family_data().clone(),
    }))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionCreatedResponse>, AppError> {
    let handle = state.sessions.reset(&id).await?;
    let mut session = handle.lock().await;
    Ok(Json(SessionCreatedResponse {
        session_id: id,
        response: session.initialize(),
        phase: session.phase(),
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.evict(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Session not found: {id}")))
    }
}

// ============================================================
// Conversation
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ReplyResponse>, AppError> {
    let text = req.message.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".to_string()));
    }

    let handle = state.sessions.get_or_create(&id).await?;
    let turn = handle.lock().await.advance(text).await;

    Ok(Json(ReplyResponse {
        response: turn.response,
        phase: turn.phase,
    }))
}

// ============================================================
// Snapshots
// ============================================================

async fn save_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SaveResponse>, AppError> {
    let handle = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No active conversation found: {id}")))?;

    let outcome = handle.lock().await.save_snapshot().await;
    state.snapshots.save(&id, &outcome.snapshot).await?;

    Ok(Json(SaveResponse {
        snapshot: outcome.snapshot,
        summary: outcome.summary,
        extraction_status: outcome.extraction_status,
    }))
}

async fn restore_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<RestoreRequest>>,
) -> Result<Json<ReplyResponse>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let snapshot = match req.saved_data {
        Some(value) if !value.is_null() => SessionSnapshot::from_untrusted(value),
        _ => state
            .snapshots
            .load(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No saved data for session: {id}")))?,
    };

    let handle = state.sessions.get_or_create(&id).await?;
    let mut session = handle.lock().await;
    let response = session.restore(snapshot).await;

    Ok(Json(ReplyResponse {
        response,
        phase: session.phase(),
    }))
}

async fn list_snapshots(
    State(state): State<AppState>,
) -> Result<Json<SnapshotListResponse>, AppError> {
    Ok(Json(SnapshotListResponse {
        snapshots: state.snapshots.list().await?,
    }))
}

async fn get_version() -> &'static str {
    concat!("family-dynamics ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        let message = err.to_string();
        match err {
            SessionError::CollaboratorUnavailable(_) => AppError::ServiceUnavailable(message),
            SessionError::NotFound(_) => AppError::NotFound(message),
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        tracing::error!(error = %err, "Snapshot store failed");
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
