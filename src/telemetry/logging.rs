//! Logging initialization.
//!
//! Installs the process-wide `tracing` subscriber and keeps a handle to its
//! filter so the exporter SDK's own diagnostics can be switched on later.

use once_cell::sync::OnceCell;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Filter directives that surface the OpenTelemetry SDK's internal logs.
const SDK_DIAGNOSTIC_DIRECTIVES: &str =
    "opentelemetry=debug,opentelemetry_sdk=debug,opentelemetry_otlp=debug,opentelemetry_http=debug";

static FILTER: OnceCell<FilterHandle> = OnceCell::new();
static SDK_DIAGNOSTICS: Once = Once::new();

struct FilterHandle {
    base: String,
    handle: reload::Handle<EnvFilter, Registry>,
}

/// Configuration for logging initialization.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level
    pub default_level: Level,
    /// Whether to include file and line numbers
    pub include_file_line: bool,
    /// Whether to include the target (module path)
    pub include_target: bool,
    /// Whether to use ANSI colors
    pub ansi_colors: bool,
    /// Whether to use compact format
    pub compact: bool,
    /// Custom filter directive (overrides `RUST_LOG` and default_level if set)
    pub filter_directive: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            include_file_line: false,
            include_target: true,
            ansi_colors: true,
            compact: true,
            filter_directive: None,
        }
    }
}

impl LoggingConfig {
    /// Create a development configuration (more verbose).
    pub fn development() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_file_line: true,
            include_target: true,
            ansi_colors: true,
            compact: false,
            filter_directive: None,
        }
    }

    /// Create a production configuration (minimal overhead).
    pub fn production() -> Self {
        Self {
            default_level: Level::WARN,
            include_file_line: false,
            include_target: false,
            ansi_colors: false,
            compact: true,
            filter_directive: None,
        }
    }

    /// Filter directives before any SDK diagnostics are added.
    pub fn base_directives(&self) -> String {
        if let Some(ref directive) = self.filter_directive {
            return directive.clone();
        }
        match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(from_env) if !from_env.trim().is_empty() => from_env,
            _ => format!(
                "{level},rental_telemetry={level}",
                level = self.default_level
            ),
        }
    }
}

/// Guard that keeps the logging subscriber active.
pub struct LoggingGuard {
    #[allow(dead_code)]
    _private: (),
}

/// Initialize logging with the given configuration.
///
/// Returns a guard that must be kept alive for the duration of the application.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    let base = config.base_directives();
    let (filter, handle) = reload::Layer::new(EnvFilter::try_new(&base)?);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .with_file(config.include_file_line)
        .with_line_number(config.include_file_line);

    let fmt_layer = if config.compact {
        fmt_layer.compact().boxed()
    } else {
        fmt_layer.boxed()
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)?;
    // set_global_default succeeds at most once, so the cell is always empty here.
    let _ = FILTER.set(FilterHandle { base, handle });

    Ok(LoggingGuard { _private: () })
}

/// Let the OpenTelemetry SDK's internal debug logs through the filter.
///
/// Applied at most once per process. Returns `true` only for the call that
/// actually widened the filter; without an installed subscriber it is a no-op.
pub fn enable_sdk_diagnostics() -> bool {
    let Some(filter) = FILTER.get() else {
        return false;
    };
    let mut applied = false;
    SDK_DIAGNOSTICS.call_once(|| {
        let directives = format!("{},{}", filter.base, SDK_DIAGNOSTIC_DIRECTIVES);
        match EnvFilter::try_new(&directives) {
            Ok(widened) => match filter.handle.reload(widened) {
                Ok(()) => {
                    applied = true;
                    tracing::debug!("opentelemetry sdk diagnostics enabled");
                }
                Err(err) => tracing::warn!(error = %err, "could not enable sdk diagnostics"),
            },
            Err(err) => tracing::warn!(error = %err, "invalid sdk diagnostic filter"),
        }
    });
    applied
}
