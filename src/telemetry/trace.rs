//! Trace export lifecycle.
//!
//! Wraps an OTLP trace pipeline with idempotent, restartable start/stop.
//! When no export endpoint resolves at the time of `start()`, tracing stays
//! off and the lifecycle remains `Stopped`; it is not re-checked until
//! someone calls `start()` again, which in practice means a process restart.

use async_trait::async_trait;
use opentelemetry::global;
use opentelemetry::trace::noop::NoopTracerProvider;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::lifecycle::{LifecycleCell, LifecycleState, StartOutcome, Stopping};
use super::logging::enable_sdk_diagnostics;
use crate::config::{EnvSource, ProcessEnv, Surface, TelemetryConfig, TraceSettings};
use crate::error::{BestEffort, TelemetryError};

/// Builds and starts a tracing SDK instance.
#[async_trait]
pub trait TraceBackend: Send + Sync {
    /// Build an exporter for `config` and start the SDK around it.
    async fn start(&self, config: &TelemetryConfig) -> Result<Box<dyn TraceSdk>, TelemetryError>;
}

/// A running tracing SDK instance.
#[async_trait]
pub trait TraceSdk: Send {
    /// Flush and shut down the SDK.
    async fn shutdown(self: Box<Self>) -> Result<(), TelemetryError>;
}

/// Idempotent start/stop for the trace export pipeline.
pub struct TraceLifecycle {
    surface: Surface,
    env: Arc<dyn EnvSource>,
    backend: Arc<dyn TraceBackend>,
    cell: LifecycleCell<Box<dyn TraceSdk>>,
}

impl TraceLifecycle {
    pub fn new(surface: Surface, env: Arc<dyn EnvSource>, backend: Arc<dyn TraceBackend>) -> Self {
        Self {
            surface,
            env,
            backend,
            cell: LifecycleCell::new(),
        }
    }

    /// Lifecycle reading the process environment and exporting over OTLP/HTTP.
    pub fn from_env(surface: Surface) -> Self {
        Self::new(surface, Arc::new(ProcessEnv), Arc::new(OtlpHttpBackend))
    }

    pub fn state(&self) -> LifecycleState {
        self.cell.state()
    }

    /// Start trace export if configured and not already running.
    ///
    /// Exporter or SDK failures propagate; the lifecycle is left `Stopped`.
    pub async fn start(&self) -> Result<StartOutcome, TelemetryError> {
        if self.cell.state() != LifecycleState::Stopped {
            return Ok(StartOutcome::AlreadyRunning);
        }

        let settings = TraceSettings::resolve(self.env.as_ref(), self.surface);
        if settings.sdk_disabled {
            debug!(surface = %self.surface, "tracing disabled by OTEL_SDK_DISABLED");
            return Ok(StartOutcome::Disabled);
        }
        let Some(endpoint) = settings.config.exporter_endpoint.clone() else {
            debug!(surface = %self.surface, "no trace export endpoint configured");
            return Ok(StartOutcome::Unconfigured);
        };

        let Some(ticket) = self.cell.try_begin_start() else {
            return Ok(StartOutcome::AlreadyRunning);
        };

        if settings.diagnostics {
            enable_sdk_diagnostics();
        }

        let sdk = match self.backend.start(&settings.config).await {
            Ok(sdk) => sdk,
            Err(err) => {
                self.cell.abandon_start(ticket);
                return Err(err);
            }
        };

        match self.cell.finish_start(ticket, sdk) {
            Ok(()) => {
                info!(
                    service = %settings.config.resource.service_name,
                    %endpoint,
                    "trace export started"
                );
                Ok(StartOutcome::Started)
            }
            Err(orphan) => {
                debug!("trace lifecycle stopped while starting; discarding new sdk");
                let _ = BestEffort::from_result("trace shutdown", orphan.shutdown().await);
                Ok(StartOutcome::Superseded)
            }
        }
    }

    /// Shut down trace export. Never fails; shutdown errors are discarded.
    pub async fn stop(&self) -> BestEffort {
        match self.cell.begin_stop() {
            Stopping::Idle | Stopping::Interrupted => BestEffort::Skipped,
            Stopping::Running(sdk) => {
                let outcome = BestEffort::from_result("trace shutdown", sdk.shutdown().await);
                info!("trace export stopped");
                outcome
            }
        }
    }
}

/// OTLP over HTTP/protobuf, installed as the global tracer provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct OtlpHttpBackend;

#[async_trait]
impl TraceBackend for OtlpHttpBackend {
    async fn start(&self, config: &TelemetryConfig) -> Result<Box<dyn TraceSdk>, TelemetryError> {
        let config = config.clone();
        // The blocking HTTP client must be built off the async runtime.
        let provider = tokio::task::spawn_blocking(move || build_provider(&config))
            .await
            .map_err(|e| TelemetryError::ExporterBuild {
                reason: e.to_string(),
            })??;

        global::set_tracer_provider(provider.clone());
        Ok(Box::new(OtlpTraceSdk { provider }))
    }
}

fn build_provider(config: &TelemetryConfig) -> Result<SdkTracerProvider, TelemetryError> {
    let endpoint = config
        .exporter_endpoint
        .as_deref()
        .ok_or_else(|| TelemetryError::ExporterBuild {
            reason: "no export endpoint".to_string(),
        })?;
    let headers: HashMap<String, String> = config
        .exporter_headers
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .with_headers(headers)
        .build()
        .map_err(|e| TelemetryError::ExporterBuild {
            reason: e.to_string(),
        })?;

    let resource = Resource::builder()
        .with_attributes(
            config
                .resource
                .pairs()
                .into_iter()
                .map(|(key, value)| KeyValue::new(key, value)),
        )
        .build();

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

struct OtlpTraceSdk {
    provider: SdkTracerProvider,
}

#[async_trait]
impl TraceSdk for OtlpTraceSdk {
    async fn shutdown(self: Box<Self>) -> Result<(), TelemetryError> {
        global::set_tracer_provider(NoopTracerProvider::new());
        let provider = self.provider;
        tokio::task::spawn_blocking(move || provider.shutdown())
            .await
            .map_err(|e| TelemetryError::TraceShutdown {
                reason: e.to_string(),
            })?
            .map_err(|e| TelemetryError::TraceShutdown {
                reason: e.to_string(),
            })
    }
}
