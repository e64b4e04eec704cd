//! API Module
//!
//! HTTP API layer for the server.
//! Each submodule handles endpoints for a specific domain.

pub mod download;
pub mod error;
pub mod health;
pub mod job;
pub mod location;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::repository::LocationRepository;
use crate::service::DistanceQueue;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<DistanceQueue>,
    pub locations: Arc<dyn LocationRepository>,
    pub config: Arc<Config>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health checks
        .route("/healthz", get(health::liveness))
        .route("/readyz", get(health::readiness))
        // Distance jobs
        .route("/distance", post(job::calculate_distance))
        .route("/job/{id}", get(job::get_job))
        .route("/jobs", get(job::list_jobs))
        .route("/stats", get(job::get_stats))
        .route("/download/{filename}", get(download::download_csv))
        // Location history
        .route("/devices", get(location::list_devices))
        .route("/locations", get(location::list_locations))
        .route("/locations/count", get(location::count_locations))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
