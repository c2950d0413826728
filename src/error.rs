//! Error types for the telemetry subsystem.

use thiserror::Error;
use tracing::warn;

/// Errors raised while starting, stopping or delivering telemetry.
///
/// Start failures propagate to the caller. Stop and push failures are
/// wrapped in [`BestEffort::Discarded`] instead.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("failed to build trace exporter: {reason}")]
    ExporterBuild { reason: String },

    #[error("trace provider shutdown failed: {reason}")]
    TraceShutdown { reason: String },

    #[error("failed to start profiler: {reason}")]
    ProfilerStart { reason: String },

    #[error("failed to stop profiler: {reason}")]
    ProfilerStop { reason: String },

    #[error("profiling is configured but this build has no profiler backend (enable the `pyroscope` feature)")]
    ProfilerUnavailable,

    #[error("failed to set up metrics registry: {0}")]
    MetricsSetup(String),

    #[error("invalid push gateway url {url}: {reason}")]
    InvalidPushGateway { url: String, reason: String },

    #[error("push gateway request failed: {0}")]
    PushTransport(#[from] reqwest::Error),

    #[error("push gateway rejected snapshot with status {status}")]
    PushRejected { status: u16 },

    #[error("shutdown signal handlers are already installed")]
    SignalsInstalled,

    #[error("failed to install signal handler: {0}")]
    SignalInstall(#[from] std::io::Error),
}

/// Outcome of an operation whose failure must never reach the caller.
///
/// Returned by lifecycle `stop()` and by metrics recording. A discarded
/// error has already been logged; callers may inspect it but need not.
#[derive(Debug)]
pub enum BestEffort {
    /// The operation ran and succeeded.
    Completed,
    /// Nothing to do (not running, or not configured).
    Skipped,
    /// The operation failed and the failure was dropped.
    Discarded(TelemetryError),
}

impl BestEffort {
    /// Convert a result into a best-effort outcome, logging any failure.
    pub fn from_result(operation: &'static str, result: Result<(), TelemetryError>) -> Self {
        match result {
            Ok(()) => BestEffort::Completed,
            Err(err) => {
                warn!(operation, error = %err, "ignoring telemetry failure");
                BestEffort::Discarded(err)
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, BestEffort::Completed)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, BestEffort::Skipped)
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, BestEffort::Discarded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result_ok() {
        assert!(BestEffort::from_result("push", Ok(())).is_completed());
    }

    #[test]
    fn test_from_result_err_is_discarded() {
        let outcome = BestEffort::from_result("push", Err(TelemetryError::PushRejected { status: 502 }));
        match outcome {
            BestEffort::Discarded(TelemetryError::PushRejected { status }) => assert_eq!(status, 502),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
