//! Location API Handlers
//!
//! Read-only views over the location history.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use homebound_core::domain::location::Location;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::api::error::{ApiError, ApiResult};

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocationsQuery {
    pub start: NaiveDate,
    /// Defaults to `start`
    pub end: Option<NaiveDate>,
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub locations: Vec<Location>,
    pub total_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub date: NaiveDate,
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub date: NaiveDate,
    pub device_id: Option<String>,
    pub count: i64,
}

/// GET /devices
/// List known device identifiers
pub async fn list_devices(State(state): State<AppState>) -> ApiResult<Json<DevicesResponse>> {
    let devices = state
        .locations
        .devices()
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(DevicesResponse { devices }))
}

/// GET /locations?start=&end=&device_id=
/// Locations recorded in a date range, oldest first
pub async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationsQuery>,
) -> ApiResult<Json<LocationsResponse>> {
    let end = query.end.unwrap_or(query.start);
    if end < query.start {
        return Err(ApiError::BadRequest(
            "end date must not be before start date".to_string(),
        ));
    }

    let device_id = query.device_id.as_deref().filter(|id| !id.is_empty());
    let locations = state
        .locations
        .locations_by_date_range(query.start, end, device_id)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(LocationsResponse {
        total_count: locations.len(),
        locations,
    }))
}

/// GET /locations/count?date=&device_id=
/// Number of locations recorded on one day
pub async fn count_locations(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> ApiResult<Json<CountResponse>> {
    let device_id = query.device_id.filter(|id| !id.is_empty());
    let count = state
        .locations
        .location_count(query.date, device_id.as_deref())
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(CountResponse {
        date: query.date,
        device_id,
        count,
    }))
}
