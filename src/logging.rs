//! # Structured Logging & Diagnostics
//!
//! Tracing-based logging setup for the embedding app, plus the diagnostic
//! sink the pipeline records every normalized failure through. The sink is an
//! injected capability so the pipeline stays unit-testable; recording is
//! best-effort by contract and never aborts normalization.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::types::{FailureCategory, FailureRecord, Result};

// Flag to track if logging has been initialized
static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Configuration for the logging system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// The log level to use (trace, debug, info, warn, error)
    pub level: String,
    /// The application name for identification
    pub app_name: String,
    /// Whether to output logs to a file
    pub file_output: bool,
    /// The directory to store log files in
    pub log_dir: Option<String>,
    /// Whether to use JSON formatting
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            app_name: "erp-mobile".to_string(),
            file_output: false,
            log_dir: None,
            json_format: true,
        }
    }
}

impl TryFrom<config::Config> for LoggingConfig {
    type Error = config::ConfigError;

    fn try_from(cfg: config::Config) -> std::result::Result<Self, Self::Error> {
        // Start from defaults and selectively override from the provided config.
        let mut base = LoggingConfig::default();

        if let Ok(level) = cfg.get::<String>("logging.level") {
            base.level = level;
        }
        if let Ok(app_name) = cfg.get::<String>("logging.app_name") {
            base.app_name = app_name;
        }
        if let Ok(file_output) = cfg.get::<bool>("logging.file_output") {
            base.file_output = file_output;
        }
        if let Ok(log_dir) = cfg.get::<String>("logging.log_dir") {
            base.log_dir = Some(log_dir);
        }
        if let Ok(json_format) = cfg.get::<bool>("logging.json_format") {
            base.json_format = json_format;
        }

        Ok(base)
    }
}

/// Initializes the structured logging system.
///
/// A second call is a no-op so the pipeline can be initialized lazily from
/// several entry points without fighting over the global subscriber.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<()> {
    if LOGGING_INITIALIZED.load(Ordering::SeqCst) {
        return Ok(());
    }

    let config = config.unwrap_or_default();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![filter.boxed()];

    if config.json_format {
        layers.push(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_target(true)
                .boxed(),
        );
    } else {
        layers.push(fmt::layer().with_target(true).boxed());
    }

    if config.file_output {
        if let Some(log_dir) = &config.log_dir {
            let file_appender = RollingFileAppender::new(
                tracing_appender::rolling::Rotation::DAILY,
                log_dir,
                format!("{}.log", config.app_name),
            );

            let (non_blocking, guard) = NonBlocking::new(file_appender);

            // Keep the guard alive for the lifetime of the program so
            // buffered log lines are flushed.
            Box::leak(Box::new(guard));

            layers.push(fmt::layer().with_writer(non_blocking).with_ansi(false).boxed());
        }
    }

    tracing::subscriber::set_global_default(Registry::default().with(layers))?;

    LOGGING_INITIALIZED.store(true, Ordering::SeqCst);

    tracing::info!(
        app = %config.app_name,
        level = %config.level,
        json = %config.json_format,
        "Structured logging initialized"
    );

    Ok(())
}

/// An injected diagnostics channel.
///
/// Recording is infallible by contract: implementations swallow their own
/// failures so a broken diagnostics channel can never abort normalization.
pub trait DiagnosticSink: Send + Sync {
    /// Records a normalized failure for observability
    fn record(&self, record: &FailureRecord);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<T> {
    fn record(&self, record: &FailureRecord) {
        (**self).record(record)
    }
}

/// Default diagnostic sink emitting structured `tracing` events.
///
/// Failures that never reached the server log at `warn` (flaky mobile
/// connectivity is routine); everything else logs at `error`.
#[derive(Debug, Default)]
pub struct TracingDiagnostics;

impl TracingDiagnostics {
    /// Creates the tracing-backed diagnostic sink
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for TracingDiagnostics {
    fn record(&self, record: &FailureRecord) {
        match record.category {
            FailureCategory::ClientSide => {
                warn!(
                    failure_id = %record.id,
                    category = %record.category,
                    title = %record.title,
                    message = ?record.message,
                    timestamp = %record.timestamp,
                    "API request failed before reaching the server"
                );
            }
            _ => {
                error!(
                    failure_id = %record.id,
                    category = %record.category,
                    title = %record.title,
                    status = ?record.status,
                    message = ?record.message,
                    body = ?record.body,
                    timestamp = %record.timestamp,
                    "API request failed"
                );
            }
        }
    }
}
