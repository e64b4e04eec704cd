//! Health Check API Handlers
//!
//! Liveness and readiness endpoints for monitoring.

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use super::AppState;
use crate::repository::LocationRepository;

/// Upper bound of the database check behind `/readyz`
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(3);

/// Runs the repository health check, failing if it outlasts `timeout`
pub async fn check_database(
    locations: &dyn LocationRepository,
    timeout: Duration,
) -> anyhow::Result<()> {
    match tokio::time::timeout(timeout, locations.health_check()).await {
        Ok(result) => result,
        Err(_) => anyhow::bail!("health check timed out after {:?}", timeout),
    }
}

/// GET /healthz
/// Liveness: the process is up and serving requests
pub async fn liveness(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": state.config.service_name,
            "environment": state.config.environment,
        })),
    )
}

/// GET /readyz
/// Readiness: the database is reachable and the queue accepts work
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if state.queue.is_shut_down() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not ready", "reason": "job queue is shutting down" })),
        );
    }

    match check_database(state.locations.as_ref(), READINESS_TIMEOUT).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "database": "connected" })),
        ),
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not ready",
                    "reason": format!("database unavailable: {:#}", e),
                })),
            )
        }
    }
}
