//! Distance job DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::distance::{DistanceReport, DistanceRequest};

/// Request to calculate distances from home for one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateDistance {
    /// Day to evaluate, `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    /// Empty or absent means all devices
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Acknowledgement of an accepted calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateDistanceResponse {
    pub job_id: Uuid,
    pub status: String,
    pub queued_at: DateTime<Utc>,
}

/// Result section of a completed job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    pub date: String,
    pub device_id: Option<String>,
    pub csv_path: String,
    pub total_distance_km: f64,
    pub max_distance_km: f64,
    pub min_distance_km: f64,
    pub avg_distance_km: f64,
    pub total_locations: usize,
    pub processing_time_ms: i64,
}

impl DistanceResult {
    /// Combines a report with the request it answers
    pub fn new(request: &DistanceRequest, report: &DistanceReport, processing_time_ms: i64) -> Self {
        Self {
            date: request.date.format("%Y-%m-%d").to_string(),
            device_id: request.device_id.clone(),
            csv_path: report.csv_path.clone(),
            total_distance_km: report.total_distance_km,
            max_distance_km: report.max_distance_km,
            min_distance_km: report.min_distance_km,
            avg_distance_km: report.avg_distance_km,
            total_locations: report.total_locations,
            processing_time_ms,
        }
    }
}

/// Full status of one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: String,
    pub queued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DistanceResult>,
}

/// One row of a job listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: Uuid,
    pub date: String,
    pub device_id: Option<String>,
    pub status: String,
    pub queued_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Query parameters of the job listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// A page of job summaries
///
/// `total_count` is the number of jobs in this page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobSummary>,
    pub total_count: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Job counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total: usize,
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_calculate_distance_optional_fields() {
        let req: CalculateDistance = serde_json::from_str(r#"{"date":"2025-01-15"}"#).unwrap();
        assert_eq!(req.date, "2025-01-15");
        assert!(req.device_id.is_none());

        let req: CalculateDistance = serde_json::from_str("{}").unwrap();
        assert!(req.date.is_empty());
    }

    #[test]
    fn test_distance_result_echoes_request() {
        let request = DistanceRequest::new(
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            Some("phone".to_string()),
        );
        let report = DistanceReport {
            csv_path: "/data/csv/distance_20250115_phone.csv".to_string(),
            total_distance_km: 12.5,
            max_distance_km: 6.0,
            min_distance_km: 0.1,
            avg_distance_km: 2.5,
            total_locations: 5,
        };

        let result = DistanceResult::new(&request, &report, 42);
        assert_eq!(result.date, "2025-01-15");
        assert_eq!(result.device_id.as_deref(), Some("phone"));
        assert_eq!(result.total_locations, 5);
        assert_eq!(result.processing_time_ms, 42);
    }

    #[test]
    fn test_status_response_omits_empty_sections() {
        let response = JobStatusResponse {
            job_id: Uuid::nil(),
            status: "queued".to_string(),
            queued_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error_message: None,
            result: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("error_message").is_none());
        assert!(json.get("result").is_none());
        assert!(json["started_at"].is_null());
    }
}
