//! Location Repository
//!
//! Read-only access to the `public.locations` table populated by the
//! tracking devices.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use homebound_core::domain::location::Location;
use sqlx::PgPool;

/// Source of location history
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Locations recorded on `date`, oldest first
    async fn locations_by_date(
        &self,
        date: NaiveDate,
        device_id: Option<&str>,
    ) -> anyhow::Result<Vec<Location>>;

    /// Locations recorded from `start` through `end` inclusive, oldest first
    async fn locations_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        device_id: Option<&str>,
    ) -> anyhow::Result<Vec<Location>>;

    /// Distinct known device identifiers, sorted
    async fn devices(&self) -> anyhow::Result<Vec<String>>;

    /// Number of locations recorded on `date`
    async fn location_count(&self, date: NaiveDate, device_id: Option<&str>)
    -> anyhow::Result<i64>;

    /// Verifies the backing store is reachable
    async fn health_check(&self) -> anyhow::Result<()>;
}

const LOCATION_COLUMNS: &str = r#"
    id::bigint AS id, device_id, tid,
    latitude::float8 AS latitude, longitude::float8 AS longitude,
    accuracy::int AS accuracy, altitude::int AS altitude,
    velocity::int AS velocity, battery::int AS battery,
    battery_status, connection_type, trigger,
    EXTRACT(EPOCH FROM timestamp)::bigint AS timestamp,
    created_at::timestamptz AS created_at
"#;

/// PostgreSQL-backed location repository
#[derive(Clone)]
pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn locations_by_date(
        &self,
        date: NaiveDate,
        device_id: Option<&str>,
    ) -> anyhow::Result<Vec<Location>> {
        let query = format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM public.locations
            WHERE DATE(created_at) = $1
              AND ($2::text IS NULL OR device_id = $2)
            ORDER BY created_at ASC
            "#
        );

        let rows = sqlx::query_as::<_, LocationRow>(&query)
            .bind(date)
            .bind(device_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(%date, ?device_id, count = rows.len(), "Loaded locations");

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn locations_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        device_id: Option<&str>,
    ) -> anyhow::Result<Vec<Location>> {
        let query = format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM public.locations
            WHERE created_at >= $1::date
              AND created_at < $2::date + interval '1 day'
              AND ($3::text IS NULL OR device_id = $3)
            ORDER BY created_at ASC
            "#
        );

        let rows = sqlx::query_as::<_, LocationRow>(&query)
            .bind(start)
            .bind(end)
            .bind(device_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn devices(&self) -> anyhow::Result<Vec<String>> {
        let devices = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT device_id
            FROM public.locations
            WHERE device_id IS NOT NULL
            ORDER BY device_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(devices)
    }

    async fn location_count(
        &self,
        date: NaiveDate,
        device_id: Option<&str>,
    ) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM public.locations
            WHERE DATE(created_at) = $1
              AND ($2::text IS NULL OR device_id = $2)
            "#,
        )
        .bind(date)
        .bind(device_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// =============================================================================
// Internal Row Type
// =============================================================================

#[derive(sqlx::FromRow)]
struct LocationRow {
    id: i64,
    device_id: Option<String>,
    tid: Option<String>,
    latitude: f64,
    longitude: f64,
    accuracy: Option<i32>,
    altitude: Option<i32>,
    velocity: Option<i32>,
    battery: Option<i32>,
    battery_status: Option<String>,
    connection_type: Option<String>,
    trigger: Option<String>,
    timestamp: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            device_id: row.device_id.unwrap_or_default(),
            tid: row.tid.unwrap_or_default(),
            latitude: row.latitude,
            longitude: row.longitude,
            accuracy: row.accuracy.unwrap_or_default(),
            altitude: row.altitude.unwrap_or_default(),
            velocity: row.velocity.unwrap_or_default(),
            battery: row.battery.unwrap_or_default(),
            battery_status: row.battery_status.unwrap_or_default(),
            connection_type: row.connection_type.unwrap_or_default(),
            trigger: row.trigger.unwrap_or_default(),
            timestamp: row.timestamp.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

/// In-memory repository for tests
#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    pub(crate) struct MemoryLocationRepository {
        pub(crate) locations: Vec<Location>,
        pub(crate) unavailable: AtomicBool,
        /// Added latency of `health_check`
        pub(crate) health_delay: Duration,
    }

    impl MemoryLocationRepository {
        pub(crate) fn new(locations: Vec<Location>) -> Self {
            Self {
                locations,
                ..Self::default()
            }
        }

        pub(crate) fn with_health_delay(mut self, delay: Duration) -> Self {
            self.health_delay = delay;
            self
        }

        pub(crate) fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn check(&self) -> anyhow::Result<()> {
            if self.unavailable.load(Ordering::SeqCst) {
                anyhow::bail!("connection refused");
            }
            Ok(())
        }

        fn matching(
            &self,
            start: NaiveDate,
            end: NaiveDate,
            device_id: Option<&str>,
        ) -> Vec<Location> {
            let mut matched: Vec<Location> = self
                .locations
                .iter()
                .filter(|l| (start..=end).contains(&l.created_at.date_naive()))
                .filter(|l| device_id.is_none_or(|id| l.device_id == id))
                .cloned()
                .collect();
            matched.sort_by_key(|l| l.created_at);
            matched
        }
    }

    #[async_trait]
    impl LocationRepository for MemoryLocationRepository {
        async fn locations_by_date(
            &self,
            date: NaiveDate,
            device_id: Option<&str>,
        ) -> anyhow::Result<Vec<Location>> {
            self.check()?;
            Ok(self.matching(date, date, device_id))
        }

        async fn locations_by_date_range(
            &self,
            start: NaiveDate,
            end: NaiveDate,
            device_id: Option<&str>,
        ) -> anyhow::Result<Vec<Location>> {
            self.check()?;
            Ok(self.matching(start, end, device_id))
        }

        async fn devices(&self) -> anyhow::Result<Vec<String>> {
            self.check()?;
            let mut devices: Vec<String> =
                self.locations.iter().map(|l| l.device_id.clone()).collect();
            devices.sort();
            devices.dedup();
            Ok(devices)
        }

        async fn location_count(
            &self,
            date: NaiveDate,
            device_id: Option<&str>,
        ) -> anyhow::Result<i64> {
            self.check()?;
            Ok(self.matching(date, date, device_id).len() as i64)
        }

        async fn health_check(&self) -> anyhow::Result<()> {
            if !self.health_delay.is_zero() {
                tokio::time::sleep(self.health_delay).await;
            }
            self.check()
        }
    }

    /// Location at the given coordinates, recorded at `created_at`
    pub(crate) fn location(
        id: i64,
        device_id: &str,
        latitude: f64,
        longitude: f64,
        created_at: &str,
    ) -> Location {
        let created_at = DateTime::parse_from_rfc3339(created_at)
            .unwrap()
            .with_timezone(&Utc);
        Location {
            id,
            device_id: device_id.to_string(),
            tid: "t1".to_string(),
            latitude,
            longitude,
            accuracy: 10,
            altitude: 0,
            velocity: 0,
            battery: 80,
            battery_status: "unplugged".to_string(),
            connection_type: "wifi".to_string(),
            trigger: "p".to_string(),
            timestamp: created_at.timestamp(),
            created_at,
        }
    }
}
