//! Typed settings for each telemetry component.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::env::EnvSource;
use super::parse::{parse_delimited_pairs, parse_flag};
use super::resource::{
    resolve_export_endpoint, resolve_service_resource, ResourceAttributes, Surface,
};

pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_PUSHGATEWAY_JOB: &str = "rental-batch";

/// Deployment environment under which automated test runs execute.
const TEST_ENVIRONMENT: &str = "test";

/// Telemetry configuration derived from the environment.
///
/// Rebuilt on every start attempt; nothing caches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryConfig {
    pub resource: ResourceAttributes,
    pub exporter_endpoint: Option<String>,
    #[serde(skip)]
    pub exporter_headers: BTreeMap<String, String>,
    pub extra_tags: BTreeMap<String, String>,
}

impl TelemetryConfig {
    pub fn resolve(env: &dyn EnvSource, surface: Surface) -> Self {
        let traces = env.var("OTEL_EXPORTER_OTLP_TRACES_ENDPOINT");
        let generic = env.var("OTEL_EXPORTER_OTLP_ENDPOINT");
        Self {
            resource: resolve_service_resource(env, surface),
            exporter_endpoint: resolve_export_endpoint(traces.as_deref(), generic.as_deref()),
            exporter_headers: parse_delimited_pairs(
                env.var("OTEL_EXPORTER_OTLP_HEADERS").as_deref(),
            ),
            extra_tags: parse_delimited_pairs(env.var("PYROSCOPE_TAGS").as_deref()),
        }
    }
}

/// Settings consumed by the trace lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceSettings {
    /// `OTEL_SDK_DISABLED=true`
    pub sdk_disabled: bool,
    /// `OTEL_LOG_LEVEL=debug`
    pub diagnostics: bool,
    pub config: TelemetryConfig,
}

impl TraceSettings {
    pub fn resolve(env: &dyn EnvSource, surface: Surface) -> Self {
        let sdk_disabled = parse_flag(env.var("OTEL_SDK_DISABLED").as_deref()) == Some(true);
        let diagnostics = env
            .non_empty("OTEL_LOG_LEVEL")
            .is_some_and(|level| level.eq_ignore_ascii_case("debug"));

        Self {
            sdk_disabled,
            diagnostics,
            config: TelemetryConfig::resolve(env, surface),
        }
    }
}

/// Settings consumed by the profiler lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilerSettings {
    /// `PYROSCOPE_ENABLED=false`
    pub force_disabled: bool,
    /// Running under CI or a test deployment environment.
    pub automated_run: bool,
    pub server_address: Option<String>,
    pub application_name: String,
    pub tags: BTreeMap<String, String>,
    pub basic_auth_user: Option<String>,
    #[serde(skip)]
    pub basic_auth_password: Option<String>,
    pub tenant_id: Option<String>,
    /// `PYROSCOPE_FLUSH_INTERVAL_MS`. Reported only: the pyroscope agent
    /// has no interval setting and uploads on its own fixed cadence.
    pub flush_interval: Duration,
}

impl ProfilerSettings {
    pub fn resolve(env: &dyn EnvSource, surface: Surface) -> Self {
        let config = TelemetryConfig::resolve(env, surface);
        let resource = &config.resource;

        let force_disabled = parse_flag(env.var("PYROSCOPE_ENABLED").as_deref()) == Some(false);
        let under_ci = env
            .non_empty("CI")
            .is_some_and(|ci| parse_flag(Some(ci.as_str())) != Some(false));
        let automated_run =
            under_ci || resource.deployment_environment.eq_ignore_ascii_case(TEST_ENVIRONMENT);

        let server_address = env
            .non_empty("PYROSCOPE_SERVER_ADDRESS")
            .or_else(|| env.non_empty("PYROSCOPE_URL"));

        // Extra tags override the base tags on key collision.
        let mut tags = BTreeMap::from([
            ("env".to_string(), resource.deployment_environment.clone()),
            ("service".to_string(), resource.service_name.clone()),
            ("version".to_string(), resource.service_version.clone()),
        ]);
        tags.extend(config.extra_tags.clone());

        let flush_ms = env
            .non_empty("PYROSCOPE_FLUSH_INTERVAL_MS")
            .and_then(|ms| ms.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_FLUSH_INTERVAL_MS);

        Self {
            force_disabled,
            automated_run,
            server_address,
            application_name: resource.service_name.clone(),
            tags,
            basic_auth_user: env.non_empty("PYROSCOPE_BASIC_AUTH_USER"),
            basic_auth_password: env.non_empty("PYROSCOPE_BASIC_AUTH_PASSWORD"),
            tenant_id: env.non_empty("PYROSCOPE_TENANT_ID"),
            flush_interval: Duration::from_millis(flush_ms),
        }
    }

    /// Whether profiling may run in this process.
    pub fn should_enable(&self) -> bool {
        !self.force_disabled && !self.automated_run && self.server_address.is_some()
    }
}

/// Push gateway target for batch-job metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushGatewaySettings {
    /// Base URL; `None` keeps the registry local-only.
    pub url: Option<String>,
    pub job_name: String,
    pub instance: String,
}

impl PushGatewaySettings {
    pub fn resolve(env: &dyn EnvSource) -> Self {
        Self {
            url: env.non_empty("PROMETHEUS_PUSHGATEWAY_URL"),
            job_name: env
                .non_empty("PROMETHEUS_PUSHGATEWAY_JOB")
                .unwrap_or_else(|| DEFAULT_PUSHGATEWAY_JOB.to_string()),
            instance: env
                .non_empty("PROMETHEUS_PUSHGATEWAY_INSTANCE")
                .unwrap_or_else(local_host_name),
        }
    }
}

fn local_host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
