//! Metrics for batch job executions.
//!
//! Each completed run updates an instance-owned Prometheus registry and, when
//! a push gateway is configured, the whole snapshot is pushed afterwards.
//! Push failures are logged and dropped; they never change the job outcome.
//! Counters are cumulative, so a dropped push only delays visibility.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use tracing::debug;

use super::job::{JobRunSummary, JobStatus};
use super::pushgateway::PushGateway;
use crate::config::{EnvSource, ProcessEnv, PushGatewaySettings};
use crate::error::{BestEffort, TelemetryError};

// Metric name constants
pub const JOB_RUNS_TOTAL: &str = "batch_job_runs_total";
pub const JOB_DURATION_SECONDS: &str = "batch_job_duration_seconds";
pub const JOB_RECORDS_TOTAL: &str = "batch_job_records_total";
pub const JOB_RECORDS_PROCESSED_TOTAL: &str = "batch_job_records_processed_total";
pub const JOB_RECORDS_FAILED_TOTAL: &str = "batch_job_records_failed_total";
pub const JOB_LAST_SUCCESS_TIMESTAMP: &str = "batch_job_last_success_timestamp_seconds";

/// Duration buckets in seconds, from sub-second batches to 30-minute imports.
pub const DURATION_BUCKETS: &[f64] = &[
    0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 900.0, 1800.0,
];

/// Register metric descriptions with the current recorder.
pub fn register_metrics() {
    describe_counter!(JOB_RUNS_TOTAL, "Total number of batch job runs");
    describe_histogram!(
        JOB_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Duration of batch job runs in seconds"
    );
    describe_counter!(JOB_RECORDS_TOTAL, "Records seen by batch jobs");
    describe_counter!(
        JOB_RECORDS_PROCESSED_TOTAL,
        "Records processed successfully by batch jobs"
    );
    describe_counter!(JOB_RECORDS_FAILED_TOTAL, "Records that failed in batch jobs");
    describe_gauge!(
        JOB_LAST_SUCCESS_TIMESTAMP,
        metrics::Unit::Seconds,
        "Unix time of the last successful run"
    );
}

/// Apply one job run to the current recorder.
///
/// Record counts that are absent or zero leave their series untouched.
pub fn observe_job_run(summary: &JobRunSummary, now_unix_seconds: f64) {
    let job = summary.job.clone();
    let status = summary.status.as_str();

    counter!(JOB_RUNS_TOTAL, "job" => job.clone(), "status" => status).increment(1);
    histogram!(JOB_DURATION_SECONDS, "job" => job.clone(), "status" => status)
        .record(summary.duration_seconds);

    let records = [
        (JOB_RECORDS_TOTAL, summary.records_total),
        (JOB_RECORDS_PROCESSED_TOTAL, summary.records_processed),
        (JOB_RECORDS_FAILED_TOTAL, summary.records_failed),
    ];
    for (name, count) in records {
        if let Some(count) = count.filter(|c| *c > 0) {
            counter!(name, "job" => job.clone()).increment(count);
        }
    }

    if summary.status == JobStatus::Success {
        gauge!(JOB_LAST_SUCCESS_TIMESTAMP, "job" => job).set(now_unix_seconds);
    }
}

/// Records batch job runs and pushes snapshots to a push gateway.
///
/// Safe to share between concurrently finishing jobs.
pub struct JobMetricsRecorder {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    gateway: Option<PushGateway>,
}

impl JobMetricsRecorder {
    pub fn new(gateway: Option<PushGateway>) -> Result<Self, TelemetryError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(JOB_DURATION_SECONDS.to_string()),
                DURATION_BUCKETS,
            )
            .map_err(|e| TelemetryError::MetricsSetup(e.to_string()))?
            .build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, register_metrics);

        Ok(Self {
            recorder,
            handle,
            gateway,
        })
    }

    /// Recorder configured from the process environment.
    pub fn from_env() -> Result<Self, TelemetryError> {
        Self::from_env_source(&ProcessEnv)
    }

    pub fn from_env_source(env: &dyn EnvSource) -> Result<Self, TelemetryError> {
        let settings = PushGatewaySettings::resolve(env);
        Self::new(PushGateway::from_settings(&settings)?)
    }

    pub fn push_enabled(&self) -> bool {
        self.gateway.is_some()
    }

    /// Record a completed job run, then push the registry if configured.
    ///
    /// Returns `Skipped` without a gateway and `Discarded` when the push failed.
    pub async fn record(&self, summary: JobRunSummary) -> BestEffort {
        let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
        metrics::with_local_recorder(&self.recorder, || observe_job_run(&summary, now));
        debug!(
            job = %summary.job,
            status = %summary.status,
            duration_seconds = summary.duration_seconds,
            "recorded job run"
        );

        let Some(gateway) = &self.gateway else {
            return BestEffort::Skipped;
        };
        let pushed = gateway.push(&summary.job, self.render()).await;
        BestEffort::from_result("metrics push", pushed)
    }

    /// Current registry snapshot in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
