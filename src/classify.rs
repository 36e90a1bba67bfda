//! # Error Shape Classification
//!
//! Total, read-only classification of a raw failure into the recognized
//! backend error shapes. Every input maps to exactly one [`ErrorShape`]
//! variant; malformed or missing data classifies as
//! [`ErrorShape::Unrecognized`] rather than failing.

use serde_json::Value;

use crate::types::{FailureCategory, FailureInput};

/// The recognized structural categories of a server error body.
///
/// Field values are kept as delivered ([`serde_json::Value`]); coercion to a
/// display string is the extractor's concern.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorShape {
    /// The body is itself a string
    StringBody(String),
    /// Object with a `detail` field
    DetailBody(Value),
    /// Object with a `mensagem` field
    MensagemBody(Value),
    /// Object with an `error` field
    ErrorFieldBody(Value),
    /// Generic object; the first key in server-delivered order maps to a
    /// single message or an ordered list of messages
    FieldValidation {
        /// The offending field name, exactly as delivered
        field: String,
        /// A single message or an ordered list of messages
        errors: Value,
    },
    /// No body present, or none of the known shapes matched
    Unrecognized,
}

/// Classifies a raw failure into its error shape.
///
/// Priority order, first match wins, evaluated only when a server body is
/// present: string body, `detail`, `mensagem`, `error`, then the first key of
/// a generic object in delivered order. Matching is on field *presence*, not
/// truthiness, so `{"detail": null}` still classifies as `DetailBody`.
pub fn classify(input: &FailureInput) -> ErrorShape {
    let Some(data) = input.body() else {
        return ErrorShape::Unrecognized;
    };

    match data {
        Value::String(text) => ErrorShape::StringBody(text.clone()),
        Value::Object(map) => {
            if let Some(detail) = map.get("detail") {
                ErrorShape::DetailBody(detail.clone())
            } else if let Some(mensagem) = map.get("mensagem") {
                ErrorShape::MensagemBody(mensagem.clone())
            } else if let Some(error) = map.get("error") {
                ErrorShape::ErrorFieldBody(error.clone())
            } else if let Some((field, errors)) = map.iter().next() {
                ErrorShape::FieldValidation {
                    field: field.clone(),
                    errors: errors.clone(),
                }
            } else {
                ErrorShape::Unrecognized
            }
        }
        _ => ErrorShape::Unrecognized,
    }
}

/// Derives the coarse failure taxonomy from an input and its shape.
///
/// An unrecognized shape counts as client-side only when the request never
/// reached the server and the caller supplied a usable message.
pub fn categorize(input: &FailureInput, shape: &ErrorShape) -> FailureCategory {
    match shape {
        ErrorShape::StringBody(_) => FailureCategory::PlainText,
        ErrorShape::DetailBody(_) | ErrorShape::MensagemBody(_) | ErrorShape::ErrorFieldBody(_) => {
            FailureCategory::StructuredMessage
        }
        ErrorShape::FieldValidation { .. } => FailureCategory::FieldValidation,
        ErrorShape::Unrecognized => {
            let has_message = input
                .message
                .as_deref()
                .is_some_and(|m| !m.trim().is_empty());

            if input.response.is_none() && has_message {
                FailureCategory::ClientSide
            } else {
                FailureCategory::Unclassified
            }
        }
    }
}
