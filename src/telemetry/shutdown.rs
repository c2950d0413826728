//! Termination signal handling.
//!
//! `SIGTERM` and `SIGINT` are each registered once per process; the first
//! one received stops tracing and profiling.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::info;

use super::bootstrap::{StopReport, Telemetry};
use crate::error::TelemetryError;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Which termination signal arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Terminate,
    Interrupt,
}

impl ShutdownSignal {
    /// Conventional shell exit code for a process ended by this signal.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShutdownSignal::Terminate => 128 + 15,
            ShutdownSignal::Interrupt => 128 + 2,
        }
    }
}

/// Registered termination signal streams.
pub struct ShutdownSignals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    /// Register the handlers. Fails if they were already installed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn install() -> Result<Self, TelemetryError> {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(TelemetryError::SignalsInstalled);
        }
        Self::register().inspect_err(|_| INSTALLED.store(false, Ordering::SeqCst))
    }

    #[cfg(unix)]
    fn register() -> Result<Self, TelemetryError> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    #[cfg(not(unix))]
    fn register() -> Result<Self, TelemetryError> {
        Ok(Self {})
    }

    /// Wait for the next termination signal.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> ShutdownSignal {
        // Without ctrl-c support there is nothing to wait for.
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        ShutdownSignal::Interrupt
    }
}

/// Stop `telemetry` when the first termination signal arrives.
///
/// The task resolves with the signal and the stop report; abort it when
/// the process finishes normally.
pub fn spawn_signal_handler(
    mut signals: ShutdownSignals,
    telemetry: Telemetry,
) -> JoinHandle<(ShutdownSignal, StopReport)> {
    tokio::spawn(async move {
        let signal = signals.recv().await;
        info!(?signal, "shutdown signal received, stopping telemetry");
        let report = telemetry.stop().await;
        (signal, report)
    })
}
