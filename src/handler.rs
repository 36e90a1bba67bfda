//! # Failure Handler
//!
//! The top-level entry point of the pipeline: classify the raw failure,
//! extract the user-facing message, record diagnostics, notify through both
//! channels, and hand the message back to the caller for local state (for
//! example highlighting a form field).

use std::sync::Arc;

use metrics::counter;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::classify::{categorize, classify};
use crate::extract::extract;
use crate::logging::{DiagnosticSink, TracingDiagnostics};
use crate::notify::{Dispatcher, NotificationSink, TracingSink};
use crate::types::{FailureCategory, FailureInput, FailureRecord, NotificationEvent, Result};
use crate::{DEFAULT_MESSAGE, DEFAULT_TITLE};

// Global failure handler instance
static HANDLER: OnceCell<Arc<FailureHandler>> = OnceCell::new();

/// Configuration for the failure handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Notification title used when the caller does not supply one
    pub default_title: String,
    /// Message used when nothing more specific can be extracted
    pub fallback_message: String,
    /// Whether to record failure and notification counters
    pub record_metrics: bool,
    /// Whether diagnostic records carry a (redacted) snapshot of the body
    pub log_raw_body: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_TITLE.to_string(),
            fallback_message: DEFAULT_MESSAGE.to_string(),
            record_metrics: true,
            log_raw_body: true,
        }
    }
}

impl TryFrom<config::Config> for HandlerConfig {
    type Error = config::ConfigError;

    fn try_from(cfg: config::Config) -> std::result::Result<Self, Self::Error> {
        // Start with defaults and override from config where present.
        let mut base = HandlerConfig::default();

        if let Ok(default_title) = cfg.get::<String>("error_notify.default_title") {
            base.default_title = default_title;
        }
        if let Ok(fallback_message) = cfg.get::<String>("error_notify.fallback_message") {
            base.fallback_message = fallback_message;
        }
        if let Ok(record_metrics) = cfg.get::<bool>("error_notify.record_metrics") {
            base.record_metrics = record_metrics;
        }
        if let Ok(log_raw_body) = cfg.get::<bool>("error_notify.log_raw_body") {
            base.log_raw_body = log_raw_body;
        }

        Ok(base)
    }
}

/// Normalizes API failures and guarantees a dual-channel notification.
///
/// Stateless between calls; the sinks are the only side-effect surface.
pub struct FailureHandler {
    config: HandlerConfig,
    dispatcher: Dispatcher,
    diagnostics: Box<dyn DiagnosticSink>,
}

impl FailureHandler {
    /// Creates a handler with tracing-backed notification and diagnostic sinks
    pub fn new(config: HandlerConfig) -> Self {
        let record_metrics = config.record_metrics;
        Self {
            config,
            dispatcher: Dispatcher::new(
                Box::new(TracingSink::toast()),
                Box::new(TracingSink::alert()),
            )
            .with_metrics(record_metrics),
            diagnostics: Box::new(TracingDiagnostics::new()),
        }
    }

    /// Creates a handler over injected sinks
    pub fn with_sinks(
        config: HandlerConfig,
        toast: Box<dyn NotificationSink>,
        alert: Box<dyn NotificationSink>,
        diagnostics: Box<dyn DiagnosticSink>,
    ) -> Self {
        let record_metrics = config.record_metrics;
        Self {
            config,
            dispatcher: Dispatcher::new(toast, alert).with_metrics(record_metrics),
            diagnostics,
        }
    }

    /// The handler configuration
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Normalizes a failure using the configured default title
    pub fn handle(&self, input: &FailureInput) -> String {
        self.handle_with_title(input, &self.config.default_title)
    }

    /// Normalizes a failure and notifies the user under the given title.
    ///
    /// Always returns a non-empty message and always produces exactly one
    /// toast attempt and one alert attempt carrying that message. Never
    /// fails: malformed input converges to the configured fallback.
    pub fn handle_with_title(&self, input: &FailureInput, title: &str) -> String {
        let shape = classify(input);
        let category = categorize(input, &shape);

        // Diagnostics first, best-effort: the sink contract is infallible,
        // so a broken diagnostics channel cannot abort normalization.
        let record = FailureRecord::new(title, category, input, self.config.log_raw_body);
        self.diagnostics.record(&record);

        let fallback = input
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.config.fallback_message);
        let message = extract(&shape, fallback);

        if self.config.record_metrics {
            record_failure_metrics(category);
        }

        let event = NotificationEvent::new(title, message.clone());
        self.dispatcher.dispatch(&event);

        message
    }
}

/// Records counters for a normalized failure
fn record_failure_metrics(category: FailureCategory) {
    counter!("failures.total", 1);

    match category {
        FailureCategory::ClientSide => counter!("failures.category.client_side", 1),
        FailureCategory::StructuredMessage => counter!("failures.category.structured_message", 1),
        FailureCategory::FieldValidation => counter!("failures.category.field_validation", 1),
        FailureCategory::PlainText => counter!("failures.category.plain_text", 1),
        FailureCategory::Unclassified => counter!("failures.category.unclassified", 1),
    }
}

/// Initializes the global failure handler.
///
/// A second call is a no-op, mirroring [`crate::logging::init_logging`].
pub fn init_handler(config: Option<HandlerConfig>) -> Result<()> {
    let config = config.unwrap_or_default();
    let _ = HANDLER.set(Arc::new(FailureHandler::new(config)));
    Ok(())
}

/// Installs a fully built handler (custom sinks) as the global instance.
///
/// No-op when a global handler already exists.
pub fn install_handler(handler: FailureHandler) {
    let _ = HANDLER.set(Arc::new(handler));
}

/// Gets the global failure handler, auto-initializing with defaults
pub fn handler() -> Arc<FailureHandler> {
    HANDLER
        .get_or_init(|| Arc::new(FailureHandler::new(HandlerConfig::default())))
        .clone()
}

/// Normalizes a failure through the global handler under the default title
pub fn handle_api_error(input: &FailureInput) -> String {
    handler().handle(input)
}

/// Normalizes a failure through the global handler under a custom title
pub fn handle_api_error_with_title(input: &FailureInput, title: &str) -> String {
    handler().handle_with_title(input, title)
}
