//! Environment-driven telemetry configuration.
//!
//! Every setting is read through an [`EnvSource`] and resolved by one
//! precedence-ordered function. Missing or malformed values never fail;
//! they degrade to an empty or default value.

mod env;
mod parse;
mod resource;
mod settings;

pub use env::{EnvSource, ProcessEnv};
pub use parse::{parse_delimited_pairs, parse_flag};
pub use resource::{
    resolve_export_endpoint, resolve_service_resource, ResourceAttributes, Surface,
    DEFAULT_ENVIRONMENT,
};
pub use settings::{
    ProfilerSettings, PushGatewaySettings, TelemetryConfig, TraceSettings,
    DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_PUSHGATEWAY_JOB,
};
