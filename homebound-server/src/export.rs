//! CSV export
//!
//! Writes one CSV file per distance job: a row per location followed by a
//! summary footer.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use chrono::SecondsFormat;
use homebound_core::calculator::{Coordinate, DistanceMetrics, distance_from_home};
use homebound_core::domain::distance::DistanceRequest;
use homebound_core::domain::location::Location;

const HEADER: [&str; 8] = [
    "timestamp",
    "device_id",
    "latitude",
    "longitude",
    "distance_from_home_km",
    "accuracy",
    "battery",
    "velocity",
];

/// Writes distance reports into a directory
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
    home: Coordinate,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>, home: Coordinate) -> Self {
        Self {
            output_dir: output_dir.into(),
            home,
        }
    }

    /// `distance_YYYYMMDD.csv`, or `distance_YYYYMMDD_<device>.csv` when the
    /// request is scoped to one device
    pub fn file_name(request: &DistanceRequest) -> String {
        let date = request.date.format("%Y%m%d");
        match &request.device_id {
            Some(device) => format!("distance_{}_{}.csv", date, sanitize(device)),
            None => format!("distance_{}.csv", date),
        }
    }

    /// Renders and writes the export, returning its path
    pub async fn write(
        &self,
        request: &DistanceRequest,
        locations: &[Location],
        metrics: &DistanceMetrics,
    ) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("failed to create {}", self.output_dir.display()))?;

        let path = self.output_dir.join(Self::file_name(request));
        let contents = render(self.home, locations, metrics);

        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        tracing::info!(csv_path = %path.display(), rows = locations.len(), "CSV file generated");

        Ok(path)
    }
}

/// Renders the full CSV document
pub fn render(home: Coordinate, locations: &[Location], metrics: &DistanceMetrics) -> String {
    let mut out = String::new();
    push_record(&mut out, &HEADER);

    for loc in locations {
        let distance = distance_from_home(home, loc.coordinate());
        push_record(
            &mut out,
            &[
                &format_timestamp(loc),
                loc.device_id.as_str(),
                &format!("{:.6}", loc.latitude),
                &format!("{:.6}", loc.longitude),
                &format!("{:.2}", distance),
                &loc.accuracy.to_string(),
                &loc.battery.to_string(),
                &loc.velocity.to_string(),
            ],
        );
    }

    out.push('\n');
    push_record(&mut out, &["Summary"]);
    push_record(
        &mut out,
        &["Total Distance (km)", &format!("{:.2}", metrics.total_distance_km)],
    );
    push_record(
        &mut out,
        &["Max Distance (km)", &format!("{:.2}", metrics.max_distance_km)],
    );
    push_record(
        &mut out,
        &["Min Distance (km)", &format!("{:.2}", metrics.min_distance_km)],
    );
    push_record(
        &mut out,
        &["Total Locations", &metrics.total_locations.to_string()],
    );
    push_record(
        &mut out,
        &["Average Distance (km)", &format!("{:.2}", metrics.avg_distance_km)],
    );

    out
}

/// Whether `name` can be a file produced by [`CsvExporter`]
///
/// Rejects anything that could escape the export directory.
pub fn is_valid_export_name(name: &str) -> bool {
    name.starts_with("distance_")
        && name.ends_with(".csv")
        && name.len() > "distance_.csv".len()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.contains("..")
}

/// Rows are stamped with the insert time, the same clock used to select them
fn format_timestamp(loc: &Location) -> String {
    loc.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn sanitize(device: &str) -> String {
    device
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn push_record(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push('\n');
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        let _ = write!(out, "\"{}\"", field.replace('"', "\"\""));
    } else {
        out.push_str(field);
    }
}
