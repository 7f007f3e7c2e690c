//! Per-form validation and notification builders.
//!
//! Each form module turns a raw JSON payload into a sanitized
//! [`Notification`](crate::notify::Notification) or a validation
//! error. Required fields are checked against the original payload
//! before any sanitized value flows downstream; the shared fallback
//! ladder in [`crate::notify`] handles everything after that.

pub mod contact;
pub mod order;
pub mod quote;

use serde_json::{Map, Value};

use crate::sanitize::{missing_fields, sanitize_string};

/// Raw string view of a payload field; absent or non-string is "".
pub(crate) fn str_field<'a>(payload: &'a Map<String, Value>, name: &str) -> &'a str {
    payload.get(name).and_then(Value::as_str).unwrap_or("")
}

/// Sanitized optional field: `None` when absent or empty after
/// sanitization, so optional embed fields are only included when
/// present and non-empty.
pub(crate) fn optional_field(payload: &Map<String, Value>, name: &str) -> Option<String> {
    let value = sanitize_string(str_field(payload, name));
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Run the required-field check and aggregate missing names into one
/// error before anything else is looked at.
pub(crate) fn require_fields(payload: &Map<String, Value>, required: &[&str]) -> Result<(), String> {
    let missing = missing_fields(payload, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Missing required fields: {}", missing.join(", ")))
    }
}
