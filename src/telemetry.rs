use anyhow::{Context, Result};
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, Resource};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Telemetry configuration, resolved from the environment by default.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    pub otlp_endpoint: Option<String>,
    pub export_timeout: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: env!("CARGO_PKG_NAME").to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: std::env::var("DEPLOYMENT_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
            export_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for shutting the exporters down when the server exits.
pub struct TelemetryHandles {
    _config: TelemetryConfig,
}

impl TelemetryHandles {
    pub async fn shutdown(self) -> Result<()> {
        info!("Shutting down telemetry providers");
        global::shutdown_tracer_provider();
        Ok(())
    }
}

/// Set up the tracing subscriber and, when an OTLP endpoint is configured,
/// the distributed-tracing pipeline.
pub async fn init_telemetry(config: Option<TelemetryConfig>) -> Result<TelemetryHandles> {
    let config = config.unwrap_or_default();

    setup_tracing_subscriber()?;

    info!(
        "Initializing telemetry for {} v{} ({})",
        config.service_name, config.service_version, config.environment
    );

    if let Some(endpoint) = &config.otlp_endpoint {
        let resource = Resource::new(vec![
            KeyValue::new("service.name", config.service_name.clone()),
            KeyValue::new("service.version", config.service_version.clone()),
            KeyValue::new("deployment.environment", config.environment.clone()),
        ]);

        opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .tonic()
                    .with_endpoint(endpoint)
                    .with_timeout(config.export_timeout),
            )
            .with_trace_config(
                opentelemetry_sdk::trace::Config::default()
                    .with_resource(resource)
                    .with_sampler(opentelemetry_sdk::trace::Sampler::AlwaysOn),
            )
            .install_batch(runtime::Tokio)
            .context("Failed to initialize OTLP tracer")?;

        info!("Distributed tracing initialized with OTLP exporter");
    } else {
        info!("No OTLP endpoint configured, using console-only tracing");
    }

    Ok(TelemetryHandles { _config: config })
}

fn setup_tracing_subscriber() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into());

    Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}
