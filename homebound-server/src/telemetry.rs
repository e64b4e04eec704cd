//! Telemetry
//!
//! Log filtering and optional OpenTelemetry trace export. Spans recorded with
//! `tracing` are forwarded to an OTLP collector over gRPC when enabled.

use std::time::Duration;

use anyhow::Context;
use opentelemetry::KeyValue;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// How long a final span flush may take
pub const TRACER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the log filter, preferring RUST_LOG over `log_level`
pub fn env_filter(log_level: &str) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    EnvFilter::try_new(filter_directives(rust_log, log_level))
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(None, "info")))
}

fn filter_directives(rust_log: Option<String>, log_level: &str) -> String {
    match rust_log.filter(|value| !value.is_empty()) {
        Some(directives) => directives,
        None => format!(
            "homebound_server={level},homebound_queue={level},tower_http=debug",
            level = log_level.trim().to_ascii_lowercase()
        ),
    }
}

/// Installs the global tracer provider and propagators
///
/// Returns `None` when export is disabled. Must be called inside a tokio
/// runtime; the gRPC channel connects lazily.
pub fn init_tracer(
    service_name: &str,
    environment: &str,
    config: &TelemetryConfig,
) -> anyhow::Result<Option<SdkTracerProvider>> {
    if !config.enabled {
        return Ok(None);
    }

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_endpoint(&config.endpoint))
        .build()
        .context("failed to create OTLP trace exporter")?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource(service_name, environment, config))
        .with_sampler(Sampler::AlwaysOn)
        .build();

    opentelemetry::global::set_tracer_provider(provider.clone());
    opentelemetry::global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ]));

    Ok(Some(provider))
}

/// Flushes pending spans and stops the exporter
pub async fn shutdown_tracer(provider: SdkTracerProvider) {
    let flush = tokio::task::spawn_blocking(move || provider.shutdown());

    match tokio::time::timeout(TRACER_SHUTDOWN_TIMEOUT, flush).await {
        Ok(Ok(Ok(()))) => tracing::debug!("Tracer provider shut down"),
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Failed to shut down tracer provider"),
        Ok(Err(e)) => tracing::error!(error = %e, "Tracer shutdown task failed"),
        Err(_) => tracing::warn!(
            timeout = ?TRACER_SHUTDOWN_TIMEOUT,
            "Tracer provider shutdown timed out"
        ),
    }
}

fn resource(service_name: &str, environment: &str, config: &TelemetryConfig) -> Resource {
    Resource::builder()
        .with_service_name(service_name.to_string())
        .with_attributes([
            KeyValue::new("service.namespace", config.service_namespace.clone()),
            KeyValue::new("service.version", config.service_version.clone()),
            KeyValue::new("deployment.environment", environment.to_string()),
        ])
        .build()
}

/// Collector addresses are often given as bare `host:port`
fn otlp_endpoint(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::{Key, Value};

    fn telemetry(enabled: bool) -> TelemetryConfig {
        TelemetryConfig {
            enabled,
            endpoint: "localhost:4317".to_string(),
            service_namespace: "tracking".to_string(),
            service_version: "1.2.3".to_string(),
        }
    }

    #[test]
    fn test_filter_prefers_rust_log() {
        assert_eq!(
            filter_directives(Some("warn".to_string()), "debug"),
            "warn"
        );
        assert_eq!(
            filter_directives(Some(String::new()), "debug"),
            "homebound_server=debug,homebound_queue=debug,tower_http=debug"
        );
        assert_eq!(
            filter_directives(None, "INFO"),
            "homebound_server=info,homebound_queue=info,tower_http=debug"
        );
    }

    #[test]
    fn test_otlp_endpoint_scheme() {
        assert_eq!(otlp_endpoint("localhost:4317"), "http://localhost:4317");
        assert_eq!(
            otlp_endpoint("https://collector:4317"),
            "https://collector:4317"
        );
    }

    #[test]
    fn test_resource_attributes() {
        let resource = resource("homebound", "production", &telemetry(true));

        assert_eq!(
            resource.get(&Key::new("service.name")),
            Some(Value::from("homebound"))
        );
        assert_eq!(
            resource.get(&Key::new("service.namespace")),
            Some(Value::from("tracking"))
        );
        assert_eq!(
            resource.get(&Key::new("service.version")),
            Some(Value::from("1.2.3"))
        );
        assert_eq!(
            resource.get(&Key::new("deployment.environment")),
            Some(Value::from("production"))
        );
    }

    #[test]
    fn test_disabled_tracer_is_not_installed() {
        let provider = init_tracer("homebound", "test", &telemetry(false)).unwrap();
        assert!(provider.is_none());
    }
}
