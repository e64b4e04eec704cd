//! Distance calculator
//!
//! Great-circle distances between coordinates using the haversine formula,
//! and summary metrics of a set of locations relative to a fixed home point.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the Earth's surface in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Summary statistics of distances from home
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceMetrics {
    pub total_distance_km: f64,
    pub max_distance_km: f64,
    pub min_distance_km: f64,
    pub avg_distance_km: f64,
    pub total_locations: usize,
}

/// Great-circle distance between two coordinates, in kilometers
pub fn haversine(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance of a point from the home coordinate, in kilometers
pub fn distance_from_home(home: Coordinate, point: Coordinate) -> f64 {
    haversine(home, point)
}

/// Computes distance metrics for a set of points
///
/// An empty input yields all-zero metrics.
pub fn calculate_metrics(home: Coordinate, points: &[Coordinate]) -> DistanceMetrics {
    if points.is_empty() {
        return DistanceMetrics::default();
    }

    let mut metrics = DistanceMetrics {
        total_locations: points.len(),
        min_distance_km: f64::INFINITY,
        ..DistanceMetrics::default()
    };

    for point in points {
        let distance = distance_from_home(home, *point);
        metrics.total_distance_km += distance;
        metrics.max_distance_km = metrics.max_distance_km.max(distance);
        metrics.min_distance_km = metrics.min_distance_km.min(distance);
    }

    if !metrics.min_distance_km.is_finite() {
        metrics.min_distance_km = 0.0;
    }
    metrics.avg_distance_km = metrics.total_distance_km / points.len() as f64;

    metrics
}

/// Number of points farther than `threshold_km` from home
pub fn count_away(home: Coordinate, points: &[Coordinate], threshold_km: f64) -> usize {
    points
        .iter()
        .filter(|point| distance_from_home(home, **point) > threshold_km)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: Coordinate = Coordinate {
        latitude: 40.736097,
        longitude: -74.039373,
    };

    fn approx(actual: f64, expected: f64, tolerance: f64) -> bool {
        (actual - expected).abs() <= tolerance
    }

    #[test]
    fn test_haversine_same_point_is_zero() {
        assert_eq!(haversine(HOME, HOME), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // New York City to Los Angeles is roughly 3936 km
        let nyc = Coordinate::new(40.7128, -74.0060);
        let la = Coordinate::new(34.0522, -118.2437);
        assert!(approx(haversine(nyc, la), 3936.0, 10.0));
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = Coordinate::new(51.5074, -0.1278);
        let b = Coordinate::new(48.8566, 2.3522);
        assert!(approx(haversine(a, b), haversine(b, a), 1e-9));
        assert!(approx(haversine(a, b), 343.5, 2.0));
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        assert!(approx(haversine(a, b), 111.19, 0.01));
    }

    #[test]
    fn test_calculate_metrics_empty() {
        assert_eq!(calculate_metrics(HOME, &[]), DistanceMetrics::default());
    }

    #[test]
    fn test_calculate_metrics_single_point_at_home() {
        let metrics = calculate_metrics(HOME, &[HOME]);
        assert_eq!(metrics.total_locations, 1);
        assert_eq!(metrics.min_distance_km, 0.0);
        assert_eq!(metrics.max_distance_km, 0.0);
        assert_eq!(metrics.avg_distance_km, 0.0);
    }

    #[test]
    fn test_calculate_metrics_aggregates() {
        let near = Coordinate::new(40.740, -74.040);
        let far = Coordinate::new(40.800, -74.000);
        let metrics = calculate_metrics(HOME, &[HOME, near, far]);

        let d_near = distance_from_home(HOME, near);
        let d_far = distance_from_home(HOME, far);

        assert_eq!(metrics.total_locations, 3);
        assert!(approx(metrics.total_distance_km, d_near + d_far, 1e-9));
        assert!(approx(metrics.max_distance_km, d_far, 1e-9));
        assert_eq!(metrics.min_distance_km, 0.0);
        assert!(approx(metrics.avg_distance_km, (d_near + d_far) / 3.0, 1e-9));
    }

    #[test]
    fn test_count_away() {
        let near = Coordinate::new(40.737, -74.039);
        let far = Coordinate::new(40.800, -74.000);
        assert_eq!(count_away(HOME, &[HOME, near, far], 0.5), 1);
        assert_eq!(count_away(HOME, &[HOME, near, far], 100.0), 0);
        assert_eq!(count_away(HOME, &[], 0.5), 0);
    }
}
