//! Family Dynamics - guided conversations about family relationships
//!
//! A phased conversation engine that interviews a user about their family,
//! extracts a structured record of members, relationships, dynamics, and
//! events, and persists it so a later session can pick up where this one
//! left off.

mod api;
mod db;
mod extraction;
mod family;
mod llm;
mod session;
mod state_machine;
mod transcript;

use api::{create_router, AppState};
use db::{Database, InMemorySnapshotStore, SnapshotStore};
use llm::LlmConfig;
use session::{SessionConfig, SessionRegistry};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const IN_MEMORY_DB: &str = ":memory:";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "family_dynamics=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let db_path = std::env::var("FAMILY_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.family-dynamics/snapshots.db")
    });

    let port: u16 = std::env::var("FAMILY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let snapshots: Arc<dyn SnapshotStore> = if db_path == IN_MEMORY_DB {
        tracing::warn!("Snapshots are kept in memory and will not survive a restart");
        Arc::new(InMemorySnapshotStore::new())
    } else {
        if let Some(parent) = PathBuf::from(&db_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        tracing::info!(path = %db_path, "Opening snapshot database");
        Arc::new(Database::open(&db_path)?)
    };

    let llm_config = LlmConfig::from_env();
    let session_config = SessionConfig::from_env();

    // Sessions fail at creation without credentials; say so up front
    match llm_config.build_service() {
        Ok(service) => tracing::info!(model = %service.model_id(), "Text generation configured"),
        Err(e) => tracing::warn!(
            error = %e,
            "Text generation unavailable. Set ANTHROPIC_API_KEY or LLM_GATEWAY."
        ),
    }
    tracing::info!(counting = ?session_config.counting, "Phase counting policy");

    let state = AppState::new(
        SessionRegistry::from_llm_config(llm_config, session_config),
        snapshots,
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Family dynamics server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
