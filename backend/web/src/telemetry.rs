use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;

/// Keeps the span exporter alive until [`Telemetry::shutdown`].
pub struct Telemetry {
    provider: Option<SdkTracerProvider>,
}

/// Installs JSON logging, plus span export over OTLP when
/// `telemetry_enabled` is set. `RUST_LOG` overrides the default `info` filter.
pub fn init(config: &AppConfig) -> anyhow::Result<Telemetry> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json());

    if !config.telemetry_enabled {
        registry.try_init()?;
        return Ok(Telemetry { provider: None });
    }

    let provider = tracer_provider(config)?;
    let tracer = provider.tracer(config.telemetry_service_name.clone());
    opentelemetry::global::set_tracer_provider(provider.clone());
    registry.with(OpenTelemetryLayer::new(tracer)).try_init()?;

    tracing::info!(
        service = %config.telemetry_service_name,
        endpoint = %config.telemetry_otlp_endpoint,
        "span export enabled"
    );
    Ok(Telemetry {
        provider: Some(provider),
    })
}

fn tracer_provider(config: &AppConfig) -> anyhow::Result<SdkTracerProvider> {
    let resource = Resource::builder_empty()
        .with_attribute(KeyValue::new(SERVICE_NAME, config.telemetry_service_name.clone()))
        .with_attribute(KeyValue::new(
            SERVICE_VERSION,
            config.telemetry_service_version.clone(),
        ))
        .with_attribute(KeyValue::new(
            "deployment.environment.name",
            config.telemetry_environment.clone(),
        ))
        .build();

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.telemetry_otlp_endpoint)
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

impl Telemetry {
    /// Flushes buffered spans. The global provider holds its own handle, so
    /// dropping this one would not.
    pub fn shutdown(self) {
        let Some(provider) = self.provider else {
            return;
        };
        match provider.shutdown() {
            Ok(()) => tracing::info!("span exporter flushed"),
            Err(e) => tracing::warn!(error = %e, "failed to flush span exporter"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_config() -> AppConfig {
        AppConfig {
            backend_url: "http://localhost:3001".to_string(),
            listen_addr: "127.0.0.1:0".to_string(),
            static_dir: "public".to_string(),
            upstream_timeout_secs: 10,
            telemetry_enabled: true,
            telemetry_service_name: "hotel-web".to_string(),
            telemetry_service_version: "test".to_string(),
            telemetry_environment: "test".to_string(),
            telemetry_otlp_endpoint: "http://127.0.0.1:4317".to_string(),
        }
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_provider() {
        let provider = tracer_provider(&enabled_config()).unwrap();
        let telemetry = Telemetry {
            provider: Some(provider.clone()),
        };

        telemetry.shutdown();

        // the shared provider is already shut down
        assert!(provider.shutdown().is_err());
    }

    #[test]
    fn test_shutdown_without_exporter_is_noop() {
        Telemetry { provider: None }.shutdown();
    }
}
