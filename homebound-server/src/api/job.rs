//! Job API Handlers
//!
//! HTTP endpoints for submitting distance calculations and inspecting the
//! job queue.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use homebound_core::domain::distance::{DistanceReport, DistanceRequest};
use homebound_core::dto::job::{
    CalculateDistance, CalculateDistanceResponse, DistanceResult, JobStatusResponse, JobSummary,
    ListJobsQuery, ListJobsResponse, StatsResponse,
};
use homebound_queue::{Job, JobStats, JobStatus};
use uuid::Uuid;

use super::AppState;
use crate::api::error::{ApiError, ApiResult};

/// Page size used when none (or zero) is requested
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: usize = 500;

type DistanceJob = Job<DistanceRequest, DistanceReport>;

/// POST /distance
/// Queue a distance-from-home calculation
pub async fn calculate_distance(
    State(state): State<AppState>,
    Json(req): Json<CalculateDistance>,
) -> ApiResult<(StatusCode, Json<CalculateDistanceResponse>)> {
    let date = parse_date(&req.date)?;
    let request = DistanceRequest::new(date, req.device_id);

    tracing::info!(%date, device_id = ?request.device_id, "Queueing distance calculation");

    let job_id = state.queue.enqueue(request)?;
    let job = state.queue.get_job(job_id)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(CalculateDistanceResponse {
            job_id,
            status: JobStatus::Queued.to_string(),
            queued_at: job.queued_at,
        }),
    ))
}

/// GET /job/{id}
/// Get the status of one job
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("invalid job id: {}", id)))?;

    tracing::debug!(job_id = %id, "Getting job");

    let job = state.queue.get_job(id)?;
    Ok(Json(status_response(job)))
}

/// GET /jobs
/// List jobs, newest first
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> ApiResult<Json<ListJobsResponse>> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<JobStatus>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        ),
    };
    let limit = page_size(query.limit);
    let offset = query.offset.unwrap_or(0);

    let jobs: Vec<JobSummary> = state
        .queue
        .list_jobs(status, limit, offset)
        .into_iter()
        .map(summary)
        .collect();

    Ok(Json(ListJobsResponse {
        total_count: jobs.len(),
        jobs,
        limit,
        offset,
    }))
}

/// GET /stats
/// Job counts per status
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(stats_response(state.queue.stats()))
}

// =============================================================================
// Conversions
// =============================================================================

fn parse_date(raw: &str) -> ApiResult<NaiveDate> {
    if raw.is_empty() {
        return Err(ApiError::BadRequest("date is required".to_string()));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest(format!("invalid date format, expected YYYY-MM-DD: {}", raw))
    })
}

fn page_size(limit: Option<usize>) -> usize {
    match limit {
        None | Some(0) => DEFAULT_PAGE_SIZE,
        Some(n) => n.min(MAX_PAGE_SIZE),
    }
}

fn status_response(job: DistanceJob) -> JobStatusResponse {
    let result = job
        .result
        .as_ref()
        .map(|r| DistanceResult::new(&job.params, &r.output, r.processing_time_ms));

    JobStatusResponse {
        job_id: job.id,
        status: job.status.to_string(),
        queued_at: job.queued_at,
        started_at: job.started_at,
        completed_at: job.completed_at,
        error_message: job.error_message,
        result,
    }
}

fn summary(job: DistanceJob) -> JobSummary {
    JobSummary {
        job_id: job.id,
        date: job.params.date.format("%Y-%m-%d").to_string(),
        device_id: job.params.device_id,
        status: job.status.to_string(),
        queued_at: job.queued_at,
        completed_at: job.completed_at,
    }
}

fn stats_response(stats: JobStats) -> StatsResponse {
    StatsResponse {
        total: stats.total,
        queued: stats.queued,
        processing: stats.processing,
        completed: stats.completed,
        failed: stats.failed,
    }
}
