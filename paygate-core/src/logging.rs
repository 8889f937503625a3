//! Structured logging system.
//!
//! The HTTP layer emits `tracing` spans and events; this module installs a
//! `tracing-subscriber` pipeline for applications and tests that want to see
//! them. Request bodies are never logged.

use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace level: most detailed debugging information.
    Trace,
    /// Debug level: detailed debugging information.
    Debug,
    /// Info level: important events.
    Info,
    /// Warn level: potential issues.
    Warn,
    /// Error level: error information.
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable formatted output.
    Pretty,
    /// Compact format.
    Compact,
    /// JSON format for production environments.
    Json,
}

/// Log configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level.
    pub level: LogLevel,
    /// Log format.
    pub format: LogFormat,
    /// Whether to show thread IDs.
    pub show_thread_ids: bool,
    /// Whether to show target module.
    pub show_target: bool,
    /// Whether to show span events (enter/close of request spans).
    pub show_span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            show_thread_ids: false,
            show_target: true,
            show_span_events: false,
        }
    }
}

impl LogConfig {
    /// Creates a log configuration for development environments.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            show_thread_ids: false,
            show_target: true,
            show_span_events: true,
        }
    }

    /// Creates a log configuration for production environments.
    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            show_thread_ids: true,
            show_target: true,
            show_span_events: false,
        }
    }

    /// Creates a log configuration for test environments.
    pub fn test() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            show_thread_ids: false,
            show_target: false,
            show_span_events: false,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "paygate_core={},paygate_gateway={}",
                self.level, self.level
            ))
        })
    }

    fn span_events(&self) -> FmtSpan {
        if self.show_span_events {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn install(&self) -> Result<(), TryInitError> {
        let filter = self.env_filter();
        match self.format {
            LogFormat::Pretty => {
                let layer = fmt::layer()
                    .pretty()
                    .with_thread_ids(self.show_thread_ids)
                    .with_target(self.show_target)
                    .with_span_events(self.span_events())
                    .with_filter(filter);
                tracing_subscriber::registry().with(layer).try_init()
            }
            LogFormat::Compact => {
                let layer = fmt::layer()
                    .compact()
                    .with_thread_ids(self.show_thread_ids)
                    .with_target(self.show_target)
                    .with_span_events(self.span_events())
                    .with_filter(filter);
                tracing_subscriber::registry().with(layer).try_init()
            }
            LogFormat::Json => {
                let layer = fmt::layer()
                    .json()
                    .with_thread_ids(self.show_thread_ids)
                    .with_target(self.show_target)
                    .with_span_events(self.span_events())
                    .with_filter(filter);
                tracing_subscriber::registry().with(layer).try_init()
            }
        }
    }
}

/// Initializes the logging system.
///
/// `RUST_LOG` takes precedence over `config.level` when set.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
///
/// ```no_run
/// use paygate_core::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::development());
/// ```
pub fn init_logging(config: &LogConfig) {
    if let Err(err) = config.install() {
        panic!("failed to install tracing subscriber: {err}");
    }
}

/// Attempts to initialize the logging system, ignoring duplicate initialization.
///
/// Suitable for test environments where multiple calls should not panic.
pub fn try_init_logging(config: &LogConfig) {
    let _ = config.install();
}
