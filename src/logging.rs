//! Structured logging.
//!
//! The client only talks to the [`Logger`] trait. [`TracingLogger`] is the
//! production implementation: it applies a fixed severity threshold and
//! forwards one rendered line per event to `tracing`.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

/// Free-form structured fields attached to a log event.
pub type Metadata = Map<String, Value>;

/// Log severity, most severe first. `Silent` disables output entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    Info,
    Verbose,
    Debug,
    Silly,
}

impl LogLevel {
    /// Whether an event at `self` passes `threshold`.
    pub fn enabled_under(self, threshold: LogLevel) -> bool {
        self != LogLevel::Silent && self <= threshold
    }

    /// Lower-case level name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
            Self::Silly => "silly",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for structured log events.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, metadata: &Metadata);

    fn warn(&self, message: &str, metadata: &Metadata) {
        self.log(LogLevel::Warn, message, metadata);
    }
}

/// Renders `[LEVEL] message {metadata}`; metadata is omitted when empty.
pub fn render_line(level: LogLevel, message: &str, metadata: &Metadata) -> String {
    let level = level.as_str().to_ascii_uppercase();
    if metadata.is_empty() {
        format!("[{level}] {message}")
    } else {
        format!("[{level}] {message} {}", Value::Object(metadata.clone()))
    }
}

/// [`Logger`] that filters by a fixed threshold and emits through `tracing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TracingLogger {
    threshold: LogLevel,
}

impl TracingLogger {
    /// Creates a logger that drops events less severe than `threshold`.
    pub fn new(threshold: LogLevel) -> Self {
        Self { threshold }
    }

    /// Threshold fixed at construction.
    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, metadata: &Metadata) {
        if !level.enabled_under(self.threshold) {
            return;
        }
        let line = render_line(level, message, metadata);

        // tracing::event! needs the level as a constant.
        match level {
            LogLevel::Silent => {}
            LogLevel::Error => tracing::error!("{line}"),
            LogLevel::Warn => tracing::warn!("{line}"),
            LogLevel::Info => tracing::info!("{line}"),
            LogLevel::Verbose | LogLevel::Debug => tracing::debug!("{line}"),
            LogLevel::Silly => tracing::trace!("{line}"),
        }
    }
}

/// Installs a console subscriber and returns the logger to inject into clients.
///
/// `RUST_LOG` still narrows what the subscriber prints. Only the first call
/// in a process installs the subscriber; later calls still return a logger
/// with the requested threshold.
pub fn init(threshold: LogLevel) -> Arc<TracingLogger> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_level(false)
        .try_init();
    Arc::new(TracingLogger::new(threshold))
}
