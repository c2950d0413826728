//! In-memory trace and profiler backends that count what they are asked to do.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use rental_telemetry::config::{ProfilerSettings, TelemetryConfig};
use rental_telemetry::telemetry::{ProfilerAgent, ProfilerBackend, TraceBackend, TraceSdk};
use rental_telemetry::TelemetryError;

/// Counters shared between a fake backend and the test body.
#[derive(Debug, Default)]
pub struct Calls {
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
}

impl Calls {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Backend whose instances can be told to fail on start or shutdown, or to
/// block in start until released.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: Arc<Calls>,
    pub fail_start: AtomicBool,
    pub fail_stop: AtomicBool,
    gate: Option<Gate>,
}

struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

/// Handle for a backend that blocks in `start`.
pub struct StartGate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_start() -> Arc<Self> {
        let backend = Self::default();
        backend.fail_start.store(true, Ordering::SeqCst);
        Arc::new(backend)
    }

    pub fn failing_stop() -> Arc<Self> {
        let backend = Self::default();
        backend.fail_stop.store(true, Ordering::SeqCst);
        Arc::new(backend)
    }

    /// Backend that waits in `start` until the returned gate is released.
    pub fn gated() -> (Arc<Self>, StartGate) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let backend = Self {
            gate: Some(Gate {
                entered: entered.clone(),
                release: release.clone(),
            }),
            ..Self::default()
        };
        (Arc::new(backend), StartGate { entered, release })
    }

    async fn open(&self) -> Result<FakeInstance, String> {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if self.fail_start.load(Ordering::SeqCst) {
            return Err("collector unreachable".to_string());
        }
        self.calls.started.fetch_add(1, Ordering::SeqCst);
        Ok(FakeInstance {
            calls: self.calls.clone(),
            fail: self.fail_stop.load(Ordering::SeqCst),
        })
    }
}

pub struct FakeInstance {
    calls: Arc<Calls>,
    fail: bool,
}

impl FakeInstance {
    fn close(&self) -> Result<(), String> {
        self.calls.stopped.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err("flush timed out".to_string())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TraceBackend for FakeBackend {
    async fn start(&self, _config: &TelemetryConfig) -> Result<Box<dyn TraceSdk>, TelemetryError> {
        let instance = self
            .open()
            .await
            .map_err(|reason| TelemetryError::ExporterBuild { reason })?;
        Ok(Box::new(instance))
    }
}

#[async_trait]
impl TraceSdk for FakeInstance {
    async fn shutdown(self: Box<Self>) -> Result<(), TelemetryError> {
        self.close()
            .map_err(|reason| TelemetryError::TraceShutdown { reason })
    }
}

#[async_trait]
impl ProfilerBackend for FakeBackend {
    async fn start(
        &self,
        _settings: &ProfilerSettings,
    ) -> Result<Box<dyn ProfilerAgent>, TelemetryError> {
        let instance = self
            .open()
            .await
            .map_err(|reason| TelemetryError::ProfilerStart { reason })?;
        Ok(Box::new(instance))
    }
}

#[async_trait]
impl ProfilerAgent for FakeInstance {
    async fn stop(self: Box<Self>) -> Result<(), TelemetryError> {
        self.close()
            .map_err(|reason| TelemetryError::ProfilerStop { reason })
    }
}
