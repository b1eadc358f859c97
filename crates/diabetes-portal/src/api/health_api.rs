use axum::{extract::State, http::StatusCode};
use tracing::warn;

use crate::shared_state::AppState;

/// Liveness plus a credential-store round trip.
pub async fn healthz(State(app): State<AppState>) -> (StatusCode, &'static str) {
    let auth = app.auth.clone();
    let stats = tokio::task::spawn_blocking(move || auth.database().get_stats()).await;
    match stats {
        Ok(Ok(_)) => (StatusCode::OK, "OK"),
        Ok(Err(e)) => {
            warn!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
        Err(e) => {
            warn!("Health check task aborted: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
