//! Distance Service
//!
//! The job processor behind `POST /distance`: loads one day of locations,
//! measures each against home and writes the CSV export.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use homebound_core::calculator::{self, Coordinate};
use homebound_core::domain::distance::{DistanceReport, DistanceRequest};
use homebound_queue::{CancellationToken, Job, JobQueue, Processor};

use crate::export::CsvExporter;
use crate::repository::LocationRepository;

/// Job queue running distance calculations
pub type DistanceQueue = JobQueue<DistanceProcessor>;

pub struct DistanceProcessor {
    locations: Arc<dyn LocationRepository>,
    exporter: CsvExporter,
    home: Coordinate,
    away_threshold_km: f64,
}

impl DistanceProcessor {
    pub fn new(
        locations: Arc<dyn LocationRepository>,
        exporter: CsvExporter,
        home: Coordinate,
        away_threshold_km: f64,
    ) -> Self {
        Self {
            locations,
            exporter,
            home,
            away_threshold_km,
        }
    }
}

#[async_trait]
impl Processor for DistanceProcessor {
    type Params = DistanceRequest;
    type Output = DistanceReport;

    async fn process(
        &self,
        cancel: CancellationToken,
        job: Job<DistanceRequest, DistanceReport>,
    ) -> anyhow::Result<DistanceReport> {
        let request = job.params;
        let device_id = request.device_id.as_deref();

        tracing::info!(
            job_id = %job.id,
            date = %request.date,
            ?device_id,
            "Calculating distances"
        );

        let locations = tokio::select! {
            biased;
            _ = cancel.cancelled() => anyhow::bail!("cancelled before locations were loaded"),
            result = self.locations.locations_by_date(request.date, device_id) => {
                result.context("database query failed")?
            }
        };

        if locations.is_empty() {
            anyhow::bail!("no locations found for date {}", request.date);
        }

        let points: Vec<Coordinate> = locations.iter().map(|l| l.coordinate()).collect();
        let metrics = calculator::calculate_metrics(self.home, &points);
        let away = calculator::count_away(self.home, &points, self.away_threshold_km);

        tracing::debug!(
            job_id = %job.id,
            total_locations = metrics.total_locations,
            away,
            max_distance_km = metrics.max_distance_km,
            "Distance metrics computed"
        );

        let csv_path = self
            .exporter
            .write(&request, &locations, &metrics)
            .await
            .context("CSV generation failed")?;

        Ok(DistanceReport {
            csv_path: csv_path.to_string_lossy().into_owned(),
            total_distance_km: metrics.total_distance_km,
            max_distance_km: metrics.max_distance_km,
            min_distance_km: metrics.min_distance_km,
            avg_distance_km: metrics.avg_distance_km,
            total_locations: metrics.total_locations,
        })
    }
}
