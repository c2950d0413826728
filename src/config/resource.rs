//! Service identity and export endpoint resolution.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

use super::env::EnvSource;

/// Path appended to a generic OTLP endpoint to reach the traces signal.
const TRACES_PATH: &str = "/v1/traces";

pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Runtime surface of the application emitting telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// HTTP API server
    Api,
    /// Batch job worker
    Worker,
    /// Web frontend server
    Web,
}

impl Surface {
    /// Suffix for the per-surface service name override (`OTEL_SERVICE_NAME_<SUFFIX>`).
    pub fn env_suffix(&self) -> &'static str {
        match self {
            Surface::Api => "API",
            Surface::Worker => "WORKER",
            Surface::Web => "WEB",
        }
    }

    pub fn default_service_name(&self) -> &'static str {
        match self {
            Surface::Api => "rental-api",
            Surface::Worker => "rental-worker",
            Surface::Web => "rental-web",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Surface::Api => "api",
            Surface::Worker => "worker",
            Surface::Web => "web",
        };
        f.write_str(name)
    }
}

/// Static metadata attached to everything a process emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceAttributes {
    pub service_name: String,
    pub service_version: String,
    pub deployment_environment: String,
}

impl ResourceAttributes {
    pub const SERVICE_NAME: &'static str = "service.name";
    pub const SERVICE_VERSION: &'static str = "service.version";
    pub const DEPLOYMENT_ENVIRONMENT: &'static str = "deployment.environment";

    /// Attributes as OpenTelemetry semantic-convention key/value pairs.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (Self::SERVICE_NAME, self.service_name.clone()),
            (Self::SERVICE_VERSION, self.service_version.clone()),
            (Self::DEPLOYMENT_ENVIRONMENT, self.deployment_environment.clone()),
        ]
    }
}

/// Resolve the trace export endpoint.
///
/// The traces-specific endpoint wins when non-blank. Otherwise the generic
/// endpoint has trailing slashes stripped and `/v1/traces` appended.
/// `None` means export stays disabled.
pub fn resolve_export_endpoint(traces: Option<&str>, generic: Option<&str>) -> Option<String> {
    if let Some(traces) = traces.map(str::trim).filter(|v| !v.is_empty()) {
        return Some(traces.to_string());
    }

    let generic = generic.map(str::trim).filter(|v| !v.is_empty())?;
    Some(format!("{}{}", generic.trim_end_matches('/'), TRACES_PATH))
}

/// Resolve service name, version and deployment environment.
///
/// - name: `OTEL_SERVICE_NAME_<SURFACE>`, then `OTEL_SERVICE_NAME`, then the surface default
/// - version: `OTEL_SERVICE_VERSION`, then `SERVICE_VERSION`, then this package's version
/// - environment: `OTEL_ENVIRONMENT`, then `APP_ENV`, then `development`
pub fn resolve_service_resource(env: &dyn EnvSource, surface: Surface) -> ResourceAttributes {
    let surface_key = format!("OTEL_SERVICE_NAME_{}", surface.env_suffix());
    let service_name = env
        .non_empty(&surface_key)
        .or_else(|| env.non_empty("OTEL_SERVICE_NAME"))
        .unwrap_or_else(|| surface.default_service_name().to_string());

    let service_version = env
        .non_empty("OTEL_SERVICE_VERSION")
        .or_else(|| env.non_empty("SERVICE_VERSION"))
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    let deployment_environment = env
        .non_empty("OTEL_ENVIRONMENT")
        .or_else(|| env.non_empty("APP_ENV"))
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

    ResourceAttributes {
        service_name,
        service_version,
        deployment_environment,
    }
}
