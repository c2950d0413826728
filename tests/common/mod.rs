//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod fakes;
pub mod mock_gateway;

use std::collections::HashMap;
use std::sync::Arc;

use rental_telemetry::config::EnvSource;

/// Environment built from literal pairs.
pub fn env(pairs: &[(&str, &str)]) -> Arc<dyn EnvSource> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Arc::new(map)
}

/// Environment with a trace endpoint configured.
pub fn traced_env() -> Arc<dyn EnvSource> {
    env(&[("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4318")])
}

/// Environment eligible for profiling.
pub fn profiled_env() -> Arc<dyn EnvSource> {
    env(&[
        ("PYROSCOPE_SERVER_ADDRESS", "http://pyroscope:4040"),
        ("APP_ENV", "production"),
    ])
}
