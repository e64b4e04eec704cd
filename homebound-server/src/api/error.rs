//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use homebound_queue::QueueError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    ServiceUnavailable(String),
    DatabaseError(anyhow::Error),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<QueueError> for ApiError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::JobNotFound(id) => ApiError::NotFound(format!("job not found: {}", id)),
            QueueError::QueueFull => {
                ApiError::ServiceUnavailable("job queue is full, try again later".to_string())
            }
            QueueError::ShutDown | QueueError::ShutdownTimeout(_) => {
                ApiError::ServiceUnavailable("job queue is shutting down".to_string())
            }
            QueueError::InvalidConfig(msg) => ApiError::BadRequest(msg),
            err @ (QueueError::DuplicateJob(_) | QueueError::InvalidTransition { .. }) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_queue_error_status_codes() {
        let cases = [
            (QueueError::JobNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (QueueError::QueueFull, StatusCode::SERVICE_UNAVAILABLE),
            (QueueError::ShutDown, StatusCode::SERVICE_UNAVAILABLE),
            (
                QueueError::DuplicateJob(Uuid::nil()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_database_error_is_not_leaked() {
        let err = anyhow::anyhow!("password authentication failed for user \"reader\"")
            .context("database query failed");
        let response = ApiError::DatabaseError(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
    }
}
