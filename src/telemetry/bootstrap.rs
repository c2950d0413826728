//! Process-level composition of the trace and profiler lifecycles.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::lifecycle::StartOutcome;
use super::profiler::ProfilerLifecycle;
use super::trace::TraceLifecycle;
use crate::config::Surface;
use crate::error::{BestEffort, TelemetryError};

/// Outcome of stopping both lifecycles.
#[derive(Debug)]
pub struct StopReport {
    pub trace: BestEffort,
    pub profiler: BestEffort,
}

/// The lifecycles owned by one process, shared with signal handlers.
#[derive(Clone)]
pub struct Telemetry {
    trace: Arc<TraceLifecycle>,
    profiler: Arc<ProfilerLifecycle>,
}

impl Telemetry {
    pub fn new(trace: Arc<TraceLifecycle>, profiler: Arc<ProfilerLifecycle>) -> Self {
        Self { trace, profiler }
    }

    pub fn from_env(surface: Surface) -> Self {
        Self::new(
            Arc::new(TraceLifecycle::from_env(surface)),
            Arc::new(ProfilerLifecycle::from_env(surface)),
        )
    }

    pub fn trace(&self) -> &TraceLifecycle {
        &self.trace
    }

    pub fn profiler(&self) -> &ProfilerLifecycle {
        &self.profiler
    }

    /// Start the profiler, then tracing.
    ///
    /// Both are attempted; the first failure is returned.
    pub async fn start(&self) -> Result<(StartOutcome, StartOutcome), TelemetryError> {
        let profiler = self.profiler.start().await;
        let trace = self.trace.start().await;
        Ok((profiler?, trace?))
    }

    /// Run [`Telemetry::start`] in the background, logging any failure.
    ///
    /// Signal handlers do not need to wait for this; a stop that lands
    /// mid-start is handled by the lifecycles.
    pub fn spawn_start(&self) -> JoinHandle<()> {
        let telemetry = self.clone();
        tokio::spawn(async move {
            match telemetry.start().await {
                Ok((profiler, trace)) => {
                    info!(?profiler, ?trace, "telemetry bootstrap finished")
                }
                Err(err) => error!(error = %err, "telemetry bootstrap failed"),
            }
        })
    }

    /// Stop tracing and profiling. Never fails.
    pub async fn stop(&self) -> StopReport {
        let trace = self.trace.stop().await;
        let profiler = self.profiler.stop().await;
        StopReport { trace, profiler }
    }
}
