//! # Failure Pipeline Types
//!
//! Core data model for the normalization pipeline: the raw failure value
//! handed in by callers, the notification surfaced to the user, and the
//! structured record handed to the diagnostic sink.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::redact::{redact_message, redact_value};

/// A type alias for Result with the error type defaulting to [`InitError`]
pub type Result<T, E = InitError> = std::result::Result<T, E>;

/// Errors raised while wiring the pipeline into an application.
///
/// The pipeline itself never fails: once running, every input converges to a
/// valid notification. Only initialization has an error surface.
#[derive(Debug, Error)]
pub enum InitError {
    /// The global tracing subscriber could not be installed
    #[error("failed to install global tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// The raw failure value passed by a caller.
///
/// Follows the conventional shape of an HTTP client failure: a `message` for
/// failures that never reached the server, and a `response` snapshot when the
/// server replied with a non-success status. Both parts are optional and the
/// pipeline tolerates any combination, including neither.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureInput {
    /// Client-side failure message (timeout, no connectivity)
    pub message: Option<String>,
    /// Server reply snapshot, present only when a request reached the server
    pub response: Option<ResponsePayload>,
}

impl FailureInput {
    /// Creates an empty failure input
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a failure input carrying only a client-side message
    pub fn from_message<S: Into<String>>(message: S) -> Self {
        Self {
            message: Some(message.into()),
            response: None,
        }
    }

    /// Attaches a server reply snapshot
    pub fn with_response(mut self, response: ResponsePayload) -> Self {
        self.response = Some(response);
        self
    }

    /// Interprets an arbitrary JSON value as a failure input.
    ///
    /// Reads `message` (when it is a string) and `response.status` /
    /// `response.data` when present; anything else is ignored. Never fails:
    /// values that do not follow the conventional shape produce an empty
    /// input, which downstream normalization resolves to the default message.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::new();
        };

        let message = map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);

        let response = map.get("response").and_then(|r| match r {
            Value::Object(fields) => {
                let status = fields
                    .get("status")
                    .and_then(Value::as_u64)
                    .and_then(|s| u16::try_from(s).ok());
                let data = fields.get("data").cloned();
                Some(ResponsePayload { status, data })
            }
            _ => None,
        });

        Self { message, response }
    }

    /// Returns the server body, when one is present
    pub fn body(&self) -> Option<&Value> {
        self.response.as_ref().and_then(|r| r.data.as_ref())
    }
}

/// Snapshot of a non-success server reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    /// HTTP status code, kept for diagnostics only
    pub status: Option<u16>,
    /// The server body, of variable shape
    pub data: Option<Value>,
}

impl ResponsePayload {
    /// Creates an empty reply snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP status code
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the server body
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Coarse taxonomy of a normalized failure, used for logging and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCategory {
    /// No response reached the server; the message comes from the caller
    ClientSide,
    /// The server returned one of `detail` / `mensagem` / `error`
    StructuredMessage,
    /// The server returned a field-keyed validation map
    FieldValidation,
    /// The server returned a bare string body
    PlainText,
    /// None of the above; falls back to the generic default
    Unclassified,
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCategory::ClientSide => write!(f, "Client-Side Failure"),
            FailureCategory::StructuredMessage => write!(f, "Structured Server Message"),
            FailureCategory::FieldValidation => write!(f, "Field Validation Failure"),
            FailureCategory::PlainText => write!(f, "Plain Text Server Failure"),
            FailureCategory::Unclassified => write!(f, "Unclassified Failure"),
        }
    }
}

/// The notification surfaced to the user.
///
/// Always produced, never empty: the message falls back to
/// [`crate::DEFAULT_MESSAGE`] and the title to [`crate::DEFAULT_TITLE`] when
/// nothing more specific is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Notification title
    pub title: String,
    /// Human-readable message
    pub message: String,
}

impl NotificationEvent {
    /// Creates a notification event
    pub fn new<T: Into<String>, M: Into<String>>(title: T, message: M) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Structured record of a normalized failure, handed to the diagnostic sink.
///
/// The caller message and body snapshot are redacted at construction so no
/// diagnostic sink ever sees credentials the backend echoed into an error
/// body. The user-facing message is extracted from the original input and is
/// never touched by redaction.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    /// A unique identifier for this failure instance
    pub id: Uuid,
    /// The time when the failure was normalized
    pub timestamp: DateTime<Utc>,
    /// The notification title in effect for this call
    pub title: String,
    /// Coarse failure taxonomy
    pub category: FailureCategory,
    /// HTTP status of the server reply, when known
    pub status: Option<u16>,
    /// Redacted caller-side message
    pub message: Option<String>,
    /// Redacted snapshot of the server body, when capture is enabled
    pub body: Option<Value>,
}

impl FailureRecord {
    /// Builds a record from the raw input, redacting as it goes
    pub fn new(
        title: &str,
        category: FailureCategory,
        input: &FailureInput,
        capture_body: bool,
    ) -> Self {
        let body = if capture_body {
            input.body().map(redact_value)
        } else {
            None
        };

        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            title: title.to_string(),
            category,
            status: input.response.as_ref().and_then(|r| r.status),
            message: input.message.as_deref().map(redact_message),
            body,
        }
    }
}
