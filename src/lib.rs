//! # Error Notify
//!
//! API failure normalization and dual-channel user notification for ERP
//! mobile clients talking to a heterogeneous backend.
//!
//! The backend error contract varies per endpoint: plain string bodies,
//! structured `{"detail"}` / `{"mensagem"}` / `{"error"}` objects, and
//! field-keyed validation maps. Client-side failures (timeout, no
//! connectivity) never carry a body at all. This crate reduces any such
//! failure to a single human-readable message and guarantees the user is
//! notified through two independent channels per call: a transient toast and
//! a blocking alert.
//!
//! ## Features
//!
//! - Total, panic-free classification of server error bodies into a tagged
//!   union of known shapes
//! - Priority-ordered message extraction with a non-empty fallback guarantee
//! - Dual-channel notification dispatch through injected sink capabilities
//! - Structured failure logging with credential redaction
//! - Failure and notification metrics
//!

pub mod classify;
pub mod extract;
pub mod handler;
pub mod http;
pub mod logging;
pub mod notify;
pub mod redact;
pub mod types;

// Re-export commonly used types
pub use classify::{categorize, classify, ErrorShape};
pub use extract::extract;
pub use handler::{
    handle_api_error, handle_api_error_with_title, handler, init_handler, install_handler,
    FailureHandler, HandlerConfig,
};
pub use logging::{init_logging, DiagnosticSink, LoggingConfig, TracingDiagnostics};
pub use notify::{Dispatcher, MemorySink, NotificationSink, SinkError, TracingSink};
pub use types::{
    FailureCategory, FailureInput, FailureRecord, InitError, NotificationEvent, ResponsePayload,
    Result,
};

/// Re-export of what a call site typically needs
pub mod prelude {
    pub use crate::handler::{
        handle_api_error, handle_api_error_with_title, FailureHandler, HandlerConfig,
    };
    pub use crate::notify::{MemorySink, NotificationSink, TracingSink};
    pub use crate::types::{FailureInput, NotificationEvent, ResponsePayload};
}

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default notification title when the caller does not supply one
pub const DEFAULT_TITLE: &str = "Erro";

/// Default user-facing message when nothing more specific can be extracted
pub const DEFAULT_MESSAGE: &str = "Ocorreu um erro inesperado.";

/// Initializes the pipeline with default settings
pub fn init() -> Result<()> {
    logging::init_logging(None)?;
    handler::init_handler(None)?;
    Ok(())
}

/// Initializes the pipeline with custom settings
pub fn init_with_config(config: config::Config) -> Result<()> {
    let log_config = config.clone().try_into().ok();
    let handler_config = config.try_into().ok();

    logging::init_logging(log_config)?;
    handler::init_handler(handler_config)?;
    Ok(())
}
