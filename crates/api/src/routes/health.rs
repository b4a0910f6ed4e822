use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Audit entries lost since startup. Non-zero means the trail has gaps.
    pub audit_write_failures: u64,
}

/// GET /health -- returns service, database and audit health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = pxe_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        audit_write_failures: state.audit.failure_count(),
    })
}

/// Mount health check routes. Merged at the root and under `/api`, both
/// outside the Access Gate.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
