//! Download API Handler
//!
//! Serves generated CSV exports from the output directory.

use axum::{
    extract::{Path, Request, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use tower_http::services::ServeFile;

use super::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::export::is_valid_export_name;

/// GET /download/{filename}
/// Download a CSV export
pub async fn download_csv(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    req: Request,
) -> ApiResult<Response> {
    if !is_valid_export_name(&filename) {
        return Err(ApiError::BadRequest(format!(
            "invalid export file name: {}",
            filename
        )));
    }

    let path = state.config.csv_output_path.join(&filename);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(ApiError::NotFound(format!("export not found: {}", filename)));
    }

    tracing::debug!(path = %path.display(), "Serving export");

    let mut response = match ServeFile::new(&path).try_call(req).await {
        Ok(response) => response.into_response(),
        Err(e) => return Err(ApiError::InternalError(format!("failed to serve file: {}", e))),
    };

    let disposition = format!("attachment; filename=\"{}\"", filename);
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}
