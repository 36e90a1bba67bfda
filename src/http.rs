//! # HTTP Client Boundary
//!
//! Adapters turning `reqwest` failures into [`FailureInput`] values. Client
//! errors (timeout, no connectivity) carry only a message; non-success
//! responses are snapshotted with status and body so classification can see
//! the server's error shape.

use serde_json::Value;

use crate::types::{FailureInput, ResponsePayload};

impl From<reqwest::Error> for FailureInput {
    fn from(err: reqwest::Error) -> Self {
        let mut input = FailureInput::from_message(err.to_string());

        // Some failures (decode errors, redirect loops) still know the
        // status; keep it for diagnostics even though there is no body.
        if let Some(status) = err.status() {
            input = input.with_response(ResponsePayload::new().with_status(status.as_u16()));
        }

        input
    }
}

/// Snapshots a non-success response into a failure input.
///
/// The body is parsed as JSON when possible and kept as a plain string body
/// otherwise, so string-typed backend errors classify the same way they were
/// delivered. Never fails: an unreadable body simply yields no data.
pub async fn capture_response(response: reqwest::Response) -> FailureInput {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();

    let mut payload = ResponsePayload::new().with_status(status);
    if !text.is_empty() {
        let data = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
        payload = payload.with_data(data);
    }

    FailureInput::from_message(format!("Request failed with status code {}", status))
        .with_response(payload)
}
