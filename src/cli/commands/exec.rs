//! Exec command implementation
//!
//! Runs an external command as a batch job with telemetry booted around it,
//! then records the run and pushes job metrics.

use anyhow::Context;
use tokio::process::Command;
use tracing::{info, warn};

use crate::cli::output::Output;
use crate::config::Surface;
use crate::telemetry::{
    spawn_signal_handler, JobMetricsRecorder, JobRun, JobStatus, ShutdownSignals, Telemetry,
};
use crate::util::log_cmd;

/// Exit code used when the job command cannot be started.
const SPAWN_FAILED_EXIT_CODE: i32 = 127;

/// Options for the exec command
#[derive(Debug, Clone)]
pub struct ExecOptions {
    pub job: String,
    pub surface: Surface,
    pub records_total: Option<u64>,
    pub records_processed: Option<u64>,
    pub records_failed: Option<u64>,
    pub command: Vec<String>,
}

/// Run the exec command, returning the exit code to propagate.
pub async fn run_exec(options: ExecOptions) -> anyhow::Result<i32> {
    let (program, args) = options
        .command
        .split_first()
        .context("no command given to run as the job")?;

    let telemetry = Telemetry::from_env(options.surface);
    let signals = ShutdownSignals::install()?;
    let mut signal_handler = spawn_signal_handler(signals, telemetry.clone());
    telemetry.spawn_start();

    let metrics = match JobMetricsRecorder::from_env() {
        Ok(metrics) => metrics,
        Err(err) => {
            warn!(error = %err, "push gateway misconfigured; keeping job metrics local");
            JobMetricsRecorder::new(None)?
        }
    };

    let run = JobRun::begin(&options.job);
    let mut command = Command::new(program);
    command.args(args);
    log_cmd(command.as_std());

    let mut interrupted = false;
    let (status, exit_code) = match command.spawn() {
        Err(err) => {
            Output::error(&format!("failed to start {}: {}", program, err));
            (JobStatus::Failed, SPAWN_FAILED_EXIT_CODE)
        }
        Ok(mut child) => tokio::select! {
            waited = child.wait() => match waited {
                Ok(exit) if exit.success() => (JobStatus::Success, 0),
                Ok(exit) => (JobStatus::Failed, exit.code().unwrap_or(1)),
                Err(err) => {
                    Output::error(&format!("failed waiting for {}: {}", program, err));
                    (JobStatus::Failed, 1)
                }
            },
            stopped = &mut signal_handler => {
                interrupted = true;
                if let Err(err) = child.start_kill() {
                    warn!(error = %err, "could not kill job command");
                }
                if let Err(err) = child.wait().await {
                    warn!(error = %err, "could not reap killed job command");
                }
                let code = stopped.map(|(signal, _)| signal.exit_code()).unwrap_or(1);
                (JobStatus::Failed, code)
            }
        },
    };

    let summary = run.finish(status).with_records(
        options.records_total,
        options.records_processed,
        options.records_failed,
    );
    info!(
        job = %summary.job,
        status = %summary.status,
        duration_seconds = summary.duration_seconds,
        exit_code,
        "job finished"
    );
    let pushed = metrics.record(summary).await;
    if pushed.is_discarded() {
        Output::warning("job metrics could not be pushed");
    }

    if !interrupted {
        signal_handler.abort();
        telemetry.stop().await;
    }

    Ok(exit_code)
}
