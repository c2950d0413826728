//! Batch job run summaries.

use std::fmt;
use std::time::Instant;

/// Final status of a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Success,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one completed job execution.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRunSummary {
    pub job: String,
    pub status: JobStatus,
    pub duration_seconds: f64,
    pub records_total: Option<u64>,
    pub records_processed: Option<u64>,
    pub records_failed: Option<u64>,
}

impl JobRunSummary {
    /// Summary without record counts. Negative or NaN durations clamp to zero.
    pub fn new(job: impl Into<String>, status: JobStatus, duration_seconds: f64) -> Self {
        Self {
            job: job.into(),
            status,
            duration_seconds: if duration_seconds.is_finite() {
                duration_seconds.max(0.0)
            } else {
                0.0
            },
            records_total: None,
            records_processed: None,
            records_failed: None,
        }
    }

    pub fn with_records(
        mut self,
        total: Option<u64>,
        processed: Option<u64>,
        failed: Option<u64>,
    ) -> Self {
        self.records_total = total;
        self.records_processed = processed;
        self.records_failed = failed;
        self
    }
}

/// Measures a job run from `begin` to `finish`.
#[derive(Debug)]
pub struct JobRun {
    job: String,
    started: Instant,
}

impl JobRun {
    pub fn begin(job: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            started: Instant::now(),
        }
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn finish(self, status: JobStatus) -> JobRunSummary {
        let elapsed = self.started.elapsed().as_secs_f64();
        JobRunSummary::new(self.job, status, elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_clamped() {
        assert_eq!(JobRunSummary::new("sync", JobStatus::Success, -3.0).duration_seconds, 0.0);
        assert_eq!(JobRunSummary::new("sync", JobStatus::Success, f64::NAN).duration_seconds, 0.0);
    }

    #[test]
    fn test_job_run_measures_elapsed() {
        let run = JobRun::begin("reconcile");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let summary = run.finish(JobStatus::Failed);
        assert_eq!(summary.job, "reconcile");
        assert_eq!(summary.status, JobStatus::Failed);
        assert!(summary.duration_seconds >= 0.005);
        assert_eq!(summary.records_total, None);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(JobStatus::Success.to_string(), "success");
        assert_eq!(JobStatus::Failed.as_str(), "failed");
    }
}
