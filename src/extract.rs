//! # Message Extraction
//!
//! Reduces a classified error shape to a single human-readable message. The
//! result is guaranteed non-empty: anything that cannot be rendered degrades
//! to the supplied fallback.

use serde_json::Value;

use crate::classify::ErrorShape;

/// Extracts the user-facing message for a classified shape.
///
/// String values pass through verbatim; other non-null values render as
/// compact JSON; `null`, empty strings, and unrenderable shapes degrade to
/// `fallback`. Field-validation shapes surface only the first error of the
/// offending field, formatted as `"<field>: <first>"`.
///
/// The caller is expected to hand in a non-empty fallback; the entry point
/// derives it from the input's own message or the configured default.
pub fn extract(shape: &ErrorShape, fallback: &str) -> String {
    let message = match shape {
        ErrorShape::StringBody(text) => Some(text.clone()),
        ErrorShape::DetailBody(value)
        | ErrorShape::MensagemBody(value)
        | ErrorShape::ErrorFieldBody(value) => coerce(value),
        ErrorShape::FieldValidation { field, errors } => first_error(errors)
            .map(|first| format!("{}: {}", field, first)),
        ErrorShape::Unrecognized => None,
    };

    match message {
        Some(text) if !text.trim().is_empty() => text,
        _ => fallback.to_string(),
    }
}

/// First renderable error of a validation entry: element 0 of an ordered
/// list, or the value itself when the backend sent a scalar.
fn first_error(errors: &Value) -> Option<String> {
    match errors {
        Value::Array(items) => items.first().and_then(coerce),
        other => coerce(other),
    }
}

/// Coerces a JSON value to display text. Strings pass through unquoted,
/// `null` yields nothing, everything else renders as compact JSON.
fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
