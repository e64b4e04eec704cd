use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use homebound_queue::JobQueue;
use opentelemetry::trace::TracerProvider as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod export;
pub mod repository;
pub mod service;
pub mod telemetry;

use crate::config::Config;
use crate::export::CsvExporter;
use crate::repository::{LocationRepository, PgLocationRepository};
use crate::service::DistanceProcessor;

/// Upper bound of the database check performed before serving
const STARTUP_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    // Init errors are logged once the subscriber is installed
    let (tracer_provider, tracer_error) =
        match telemetry::init_tracer(&config.service_name, &config.environment, &config.telemetry) {
            Ok(provider) => (provider, None),
            Err(e) => (None, Some(e)),
        };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(telemetry::env_filter(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .with(tracer_provider.as_ref().map(|provider| {
            tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
        }))
        .init();

    match (&tracer_provider, tracer_error) {
        (Some(_), _) => tracing::info!(
            endpoint = %config.telemetry.endpoint,
            "OpenTelemetry tracing initialized"
        ),
        (None, Some(e)) => tracing::error!(
            error = %format!("{:#}", e),
            "Failed to initialize OpenTelemetry tracing, continuing without trace export"
        ),
        (None, None) => tracing::info!("OpenTelemetry tracing disabled"),
    }

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        home_latitude = config.home.latitude,
        home_longitude = config.home.longitude,
        workers = config.workers,
        queue_capacity = config.queue_capacity,
        "Starting Homebound server..."
    );

    tracing::info!("Connecting to database...");

    let pool = db::create_pool(&config.database_url())
        .await
        .context("failed to create database pool")?;

    let locations: Arc<dyn LocationRepository> = Arc::new(PgLocationRepository::new(pool));
    api::health::check_database(locations.as_ref(), STARTUP_HEALTH_TIMEOUT)
        .await
        .context("database health check failed")?;

    tracing::info!("Database connection pool created");

    let processor = DistanceProcessor::new(
        locations.clone(),
        CsvExporter::new(config.csv_output_path.clone(), config.home),
        config.home,
        config.away_threshold_km,
    );
    let queue = Arc::new(
        JobQueue::new(config.queue_config(), processor).context("failed to start job queue")?,
    );

    let config = Arc::new(config);
    let app = api::create_router(api::AppState {
        queue: queue.clone(),
        locations,
        config: config.clone(),
    });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("HTTP server stopped, draining job queue...");

    if let Err(e) = queue.shutdown(config.shutdown_timeout).await {
        tracing::warn!(error = %e, "Job queue did not stop cleanly");
    }

    if let Some(provider) = tracer_provider {
        telemetry::shutdown_tracer(provider).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
