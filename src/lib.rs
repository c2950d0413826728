//! Telemetry bootstrap for the rental platform.
//!
//! Resolves tracing, profiling and metrics configuration from the
//! environment, and owns the start/stop lifecycle of each exporter so a
//! process can boot, run, and shut down its telemetry exactly once.
//!
//! ```rust,ignore
//! use rental_telemetry::config::Surface;
//! use rental_telemetry::telemetry::{spawn_signal_handler, ShutdownSignals, Telemetry};
//!
//! let telemetry = Telemetry::from_env(Surface::Api);
//! let signals = ShutdownSignals::install()?;
//! let _handler = spawn_signal_handler(signals, telemetry.clone());
//! telemetry.spawn_start();
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod util;

pub use error::{BestEffort, TelemetryError};
