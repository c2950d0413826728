//! Telemetry bootstrap and lifecycle.
//!
//! - Structured logging via `tracing`, with switchable SDK diagnostics
//! - Trace export lifecycle over OTLP/HTTP
//! - Continuous profiler lifecycle (Pyroscope with the `pyroscope` feature)
//! - Batch job metrics pushed to a Prometheus push gateway
//! - Termination signal handling that stops both lifecycles
//!
//! # Feature Flags
//!
//! - `pyroscope`: compile in the Pyroscope profiler backend
//! - `release-logs`: Strip debug/trace at compile time
//! - `max-perf`: Disable all tracing for maximum performance

mod bootstrap;
mod job;
mod lifecycle;
mod logging;
pub mod metrics;
pub mod profiler;
mod pushgateway;
mod shutdown;
pub mod trace;

pub use bootstrap::{StopReport, Telemetry};
pub use job::{JobRun, JobRunSummary, JobStatus};
pub use lifecycle::{LifecycleState, StartOutcome};
pub use logging::{enable_sdk_diagnostics, init_logging, LoggingConfig, LoggingGuard};
pub use metrics::JobMetricsRecorder;
pub use profiler::{ProfilerAgent, ProfilerBackend, ProfilerLifecycle};
pub use pushgateway::PushGateway;
pub use shutdown::{spawn_signal_handler, ShutdownSignal, ShutdownSignals};
pub use trace::{OtlpHttpBackend, TraceBackend, TraceLifecycle, TraceSdk};
