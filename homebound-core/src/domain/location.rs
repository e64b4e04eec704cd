//! Location domain types

use serde::{Deserialize, Serialize};

use crate::calculator::Coordinate;

/// GPS location record as reported by a tracking device
///
/// Nullable columns of the backing table are normalised to zero values
/// (or empty strings) when the record is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub device_id: String,
    pub tid: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: i32,
    pub altitude: i32,
    pub velocity: i32,
    pub battery: i32,
    pub battery_status: String,
    pub connection_type: String,
    pub trigger: String,
    /// Device-reported timestamp, seconds since the Unix epoch
    pub timestamp: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Location {
    /// Returns the point this record was taken at
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}
