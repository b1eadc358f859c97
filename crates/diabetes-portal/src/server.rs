//! Server startup and routing.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tracing::info;

use crate::{api, config::Config, credential_db::CredentialDatabase, shared_state::AppState};

pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    crate::telemetry::init_tracing();
    crate::metrics::init_metrics();
    cfg.print_config();

    let database = CredentialDatabase::new(Path::new(&cfg.database_path), cfg.database_pool_size)
        .with_context(|| format!("Failed to open credential database {}", cfg.database_path))?;
    let stats = database.get_stats()?;
    info!(
        "Credential database ready: {} users, schema version {}",
        stats.total_users, stats.schema_version
    );

    let addr = cfg.api_addr()?;
    let state = AppState::new(cfg, Arc::new(database));

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = build_router(state);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Page routes plus health and metrics, behind the session layer.
pub fn build_router(state: AppState) -> Router {
    // Session cookie without expiry; sessions live as long as the process.
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.secure_cookies);
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);
    let body_limit = state.config.max_form_bytes;

    Router::new()
        .route("/", get(api::show_page))
        .route("/login", get(api::show_login).post(api::login))
        .route("/signup", get(api::show_signup).post(api::signup))
        .route("/predict", post(api::predict))
        .route("/another", post(api::another))
        .route("/healthz", get(api::healthz))
        .route("/metrics", get(crate::metrics::get_metrics))
        .layer(sessions)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
