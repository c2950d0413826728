//! Check command implementation
//!
//! Prints the telemetry configuration this process would use. Header
//! values and passwords are never shown.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::cli::output::{Output, Table};
use crate::config::{
    EnvSource, ProcessEnv, ProfilerSettings, PushGatewaySettings, ResourceAttributes, Surface,
    TraceSettings,
};

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub surface: Surface,
    pub resource: ResourceAttributes,
    pub tracing: TracingReport,
    pub profiler: ProfilerReport,
    pub metrics: MetricsReport,
}

#[derive(Debug, Serialize)]
pub struct TracingReport {
    pub enabled: bool,
    pub sdk_disabled: bool,
    pub endpoint: Option<String>,
    pub header_keys: Vec<String>,
    pub diagnostics: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfilerReport {
    pub enabled: bool,
    pub force_disabled: bool,
    pub automated_run: bool,
    pub server_address: Option<String>,
    pub application_name: String,
    pub tags: BTreeMap<String, String>,
    pub basic_auth: bool,
    pub tenant_id: Option<String>,
    pub flush_interval_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct MetricsReport {
    pub push_enabled: bool,
    pub pushgateway_url: Option<String>,
    pub job_name: String,
    pub instance: String,
}

impl CheckReport {
    pub fn resolve(env: &dyn EnvSource, surface: Surface) -> Self {
        let trace = TraceSettings::resolve(env, surface);
        let profiler = ProfilerSettings::resolve(env, surface);
        let push = PushGatewaySettings::resolve(env);

        Self {
            surface,
            resource: trace.config.resource.clone(),
            tracing: TracingReport {
                enabled: !trace.sdk_disabled && trace.config.exporter_endpoint.is_some(),
                sdk_disabled: trace.sdk_disabled,
                endpoint: trace.config.exporter_endpoint.clone(),
                header_keys: trace.config.exporter_headers.keys().cloned().collect(),
                diagnostics: trace.diagnostics,
            },
            profiler: ProfilerReport {
                enabled: profiler.should_enable(),
                force_disabled: profiler.force_disabled,
                automated_run: profiler.automated_run,
                server_address: profiler.server_address.clone(),
                application_name: profiler.application_name.clone(),
                tags: profiler.tags.clone(),
                basic_auth: profiler.basic_auth_user.is_some()
                    && profiler.basic_auth_password.is_some(),
                tenant_id: profiler.tenant_id.clone(),
                flush_interval_ms: profiler.flush_interval.as_millis() as u64,
            },
            metrics: MetricsReport {
                push_enabled: push.url.is_some(),
                pushgateway_url: push.url,
                job_name: push.job_name,
                instance: push.instance,
            },
        }
    }

    fn print(&self) {
        Output::header(&format!("Telemetry configuration ({})", self.surface));
        Output::kv("service", &self.resource.service_name);
        Output::kv("version", &self.resource.service_version);
        Output::kv("environment", &self.resource.deployment_environment);

        Output::header("Tracing");
        Output::kv("export", &Output::toggle(self.tracing.enabled));
        Output::kv("endpoint", &Output::optional(self.tracing.endpoint.as_deref()));
        if self.tracing.sdk_disabled {
            Output::warning("OTEL_SDK_DISABLED is set");
        }
        if !self.tracing.header_keys.is_empty() {
            Output::kv("headers", &self.tracing.header_keys.join(", "));
        }

        Output::header("Profiling");
        Output::kv("profiler", &Output::toggle(self.profiler.enabled));
        Output::kv(
            "server",
            &Output::optional(self.profiler.server_address.as_deref()),
        );
        if self.profiler.automated_run {
            Output::info("CI or test environment detected; profiling stays off");
        }
        let mut tags = Table::new(vec!["Tag", "Value"]);
        for (key, value) in &self.profiler.tags {
            tags.add_row(vec![key.as_str(), value.as_str()]);
        }
        if !tags.is_empty() {
            tags.print();
        }

        Output::header("Job metrics");
        Output::kv("push", &Output::toggle(self.metrics.push_enabled));
        Output::kv(
            "gateway",
            &Output::optional(self.metrics.pushgateway_url.as_deref()),
        );
        Output::kv("job", &self.metrics.job_name);
        Output::kv("instance", &self.metrics.instance);
    }
}

/// Run the check command
pub fn run_check(surface: Surface, json: bool) -> anyhow::Result<()> {
    let report = CheckReport::resolve(&ProcessEnv, surface);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}
