//! Continuous profiler lifecycle.
//!
//! Same start/stop contract as the trace lifecycle, plus an eligibility gate:
//! profiling never runs when force-disabled, under CI or a `test`
//! environment, or without a server address.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::lifecycle::{LifecycleCell, LifecycleState, StartOutcome, Stopping};
use crate::config::{EnvSource, ProcessEnv, ProfilerSettings, Surface};
use crate::error::{BestEffort, TelemetryError};

/// Creates and starts profiler agents.
#[async_trait]
pub trait ProfilerBackend: Send + Sync {
    /// Initialize a profiler client from `settings` and begin collection.
    async fn start(
        &self,
        settings: &ProfilerSettings,
    ) -> Result<Box<dyn ProfilerAgent>, TelemetryError>;
}

/// A profiler that is collecting samples.
#[async_trait]
pub trait ProfilerAgent: Send {
    /// Stop collection and flush what is buffered.
    async fn stop(self: Box<Self>) -> Result<(), TelemetryError>;
}

/// Idempotent start/stop for the continuous profiler.
pub struct ProfilerLifecycle {
    surface: Surface,
    env: Arc<dyn EnvSource>,
    backend: Arc<dyn ProfilerBackend>,
    cell: LifecycleCell<Box<dyn ProfilerAgent>>,
}

impl ProfilerLifecycle {
    pub fn new(
        surface: Surface,
        env: Arc<dyn EnvSource>,
        backend: Arc<dyn ProfilerBackend>,
    ) -> Self {
        Self {
            surface,
            env,
            backend,
            cell: LifecycleCell::new(),
        }
    }

    /// Lifecycle reading the process environment with the compiled-in backend.
    pub fn from_env(surface: Surface) -> Self {
        Self::new(surface, Arc::new(ProcessEnv), default_backend())
    }

    pub fn state(&self) -> LifecycleState {
        self.cell.state()
    }

    /// Whether the current environment allows profiling.
    pub fn should_enable(&self) -> bool {
        ProfilerSettings::resolve(self.env.as_ref(), self.surface).should_enable()
    }

    pub async fn start(&self) -> Result<StartOutcome, TelemetryError> {
        if self.cell.state() != LifecycleState::Stopped {
            return Ok(StartOutcome::AlreadyRunning);
        }

        let settings = ProfilerSettings::resolve(self.env.as_ref(), self.surface);
        if !settings.should_enable() {
            debug!(
                force_disabled = settings.force_disabled,
                automated_run = settings.automated_run,
                configured = settings.server_address.is_some(),
                "profiling not enabled"
            );
            return Ok(StartOutcome::Disabled);
        }

        let Some(ticket) = self.cell.try_begin_start() else {
            return Ok(StartOutcome::AlreadyRunning);
        };

        let agent = match self.backend.start(&settings).await {
            Ok(agent) => agent,
            Err(err) => {
                self.cell.abandon_start(ticket);
                return Err(err);
            }
        };

        match self.cell.finish_start(ticket, agent) {
            Ok(()) => {
                info!(
                    application = %settings.application_name,
                    server = settings.server_address.as_deref().unwrap_or_default(),
                    flush_interval_ms = settings.flush_interval.as_millis() as u64,
                    "profiler started"
                );
                Ok(StartOutcome::Started)
            }
            Err(orphan) => {
                debug!("profiler lifecycle stopped while starting; discarding new agent");
                let _ = BestEffort::from_result("profiler stop", orphan.stop().await);
                Ok(StartOutcome::Superseded)
            }
        }
    }

    /// Stop profiling. Never fails; the lifecycle always ends `Stopped`.
    pub async fn stop(&self) -> BestEffort {
        match self.cell.begin_stop() {
            Stopping::Idle | Stopping::Interrupted => BestEffort::Skipped,
            Stopping::Running(agent) => {
                let outcome = BestEffort::from_result("profiler stop", agent.stop().await);
                info!("profiler stopped");
                outcome
            }
        }
    }
}

/// Backend used by [`ProfilerLifecycle::from_env`].
pub fn default_backend() -> Arc<dyn ProfilerBackend> {
    #[cfg(feature = "pyroscope")]
    {
        Arc::new(pyroscope_backend::PyroscopeBackend)
    }
    #[cfg(not(feature = "pyroscope"))]
    {
        Arc::new(UnavailableBackend)
    }
}

/// Stand-in when no profiler is compiled in; refuses to start.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBackend;

#[async_trait]
impl ProfilerBackend for UnavailableBackend {
    async fn start(
        &self,
        _settings: &ProfilerSettings,
    ) -> Result<Box<dyn ProfilerAgent>, TelemetryError> {
        Err(TelemetryError::ProfilerUnavailable)
    }
}

#[cfg(feature = "pyroscope")]
pub mod pyroscope_backend {
    //! Pyroscope agent with the pprof-rs sampler.

    use async_trait::async_trait;
    use pyroscope::pyroscope::PyroscopeAgentRunning;
    use pyroscope::PyroscopeAgent;
    use pyroscope_pprofrs::{pprof_backend, PprofConfig};

    use super::{ProfilerAgent, ProfilerBackend};
    use crate::config::ProfilerSettings;
    use crate::error::TelemetryError;

    const SAMPLE_RATE_HZ: u32 = 100;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct PyroscopeBackend;

    #[async_trait]
    impl ProfilerBackend for PyroscopeBackend {
        async fn start(
            &self,
            settings: &ProfilerSettings,
        ) -> Result<Box<dyn ProfilerAgent>, TelemetryError> {
            let settings = settings.clone();
            let agent = tokio::task::spawn_blocking(move || start_agent(&settings))
                .await
                .map_err(|e| TelemetryError::ProfilerStart {
                    reason: e.to_string(),
                })??;
            Ok(Box::new(RunningAgent { agent }))
        }
    }

    fn start_agent(
        settings: &ProfilerSettings,
    ) -> Result<PyroscopeAgent<PyroscopeAgentRunning>, TelemetryError> {
        let start_err = |e: pyroscope::PyroscopeError| TelemetryError::ProfilerStart {
            reason: e.to_string(),
        };
        let address = settings
            .server_address
            .as_deref()
            .ok_or_else(|| TelemetryError::ProfilerStart {
                reason: "no server address".to_string(),
            })?;
        // pyroscope's builder has no upload interval setting; the agent
        // flushes on its own fixed cadence, so the interval is only reported.
        tracing::debug!(
            flush_interval_ms = settings.flush_interval.as_millis() as u64,
            "starting pyroscope agent"
        );

        let tags: Vec<(&str, &str)> = settings
            .tags
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let backend = pprof_backend(PprofConfig::new().sample_rate(SAMPLE_RATE_HZ));

        let mut builder = PyroscopeAgent::builder(address, settings.application_name.as_str())
            .backend(backend)
            .tags(tags);
        if let (Some(user), Some(password)) =
            (&settings.basic_auth_user, &settings.basic_auth_password)
        {
            builder = builder.basic_auth(user, password);
        }
        if let Some(tenant) = &settings.tenant_id {
            builder = builder.tenant_id(tenant.clone());
        }

        builder.build().map_err(start_err)?.start().map_err(start_err)
    }

    struct RunningAgent {
        agent: PyroscopeAgent<PyroscopeAgentRunning>,
    }

    #[async_trait]
    impl ProfilerAgent for RunningAgent {
        async fn stop(self: Box<Self>) -> Result<(), TelemetryError> {
            let agent = self.agent;
            tokio::task::spawn_blocking(move || {
                let ready = agent.stop().map_err(|e| TelemetryError::ProfilerStop {
                    reason: e.to_string(),
                })?;
                ready.shutdown();
                Ok(())
            })
            .await
            .map_err(|e| TelemetryError::ProfilerStop {
                reason: e.to_string(),
            })?
        }
    }

}
