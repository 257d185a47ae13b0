use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use storefront_db::migrations::migration_status;

use crate::state::AppState;

/// Health check response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether every embedded migration has been applied.
    pub migrations_current: bool,
}

/// GET /health -- returns service and database health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = state.db.health_check().await;
    let migrations_current = match migration_status(state.db.pool()).await {
        Ok((total, applied)) => total == applied,
        Err(_) => false,
    };

    let status = if db_healthy && migrations_current {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        migrations_current,
    })
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
