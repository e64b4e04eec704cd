//! Distance job payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Parameters of a distance-from-home calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceRequest {
    /// Day whose locations are evaluated
    pub date: NaiveDate,
    /// Restricts the calculation to one device when set
    pub device_id: Option<String>,
}

impl DistanceRequest {
    pub fn new(date: NaiveDate, device_id: Option<String>) -> Self {
        // An empty device filter means "all devices"
        let device_id = device_id.filter(|id| !id.is_empty());
        Self { date, device_id }
    }
}

/// Outcome of a completed distance calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceReport {
    /// Path of the generated CSV export
    pub csv_path: String,
    pub total_distance_km: f64,
    pub max_distance_km: f64,
    pub min_distance_km: f64,
    pub avg_distance_km: f64,
    pub total_locations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_device_filter_is_dropped() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(DistanceRequest::new(date, Some(String::new())).device_id, None);
        assert_eq!(
            DistanceRequest::new(date, Some("phone".to_string())).device_id,
            Some("phone".to_string())
        );
    }

    #[test]
    fn test_request_serializes_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let json = serde_json::to_value(DistanceRequest::new(date, None)).unwrap();
        assert_eq!(json["date"], "2025-01-15");
        assert!(json["device_id"].is_null());
    }
}
