//! Defensive clean-up of untrusted strings.
//!
//! These helpers are not an HTML sanitizer. They strip the characters and
//! schemes most often used to smuggle markup through URL parameters and
//! form fields.

use crate::config::InputLimits;
use serde_json::{Map, Value};

const INJECTION_MARKERS: &[&str] = &["<script", "javascript:", "data:"];

/// Removes `<` and `>`, trims surrounding whitespace and truncates to
/// `max_input_length` characters.
pub fn sanitize_input(value: &str, limits: &InputLimits) -> String {
    value
        .chars()
        .filter(|&c| c != '<' && c != '>')
        .collect::<String>()
        .trim()
        .chars()
        .take(*limits.max_input_length())
        .collect()
}

/// Like [`sanitize_input`], but any non-string value becomes `""`.
pub fn sanitize_value(value: &Value, limits: &InputLimits) -> String {
    match value {
        Value::String(s) => sanitize_input(s, limits),
        _ => String::new(),
    }
}

fn is_acceptable_param(value: &str, limits: &InputLimits) -> bool {
    if value.is_empty() || value.chars().count() > *limits.max_param_length() {
        return false;
    }
    let lowered = value.to_lowercase();
    !INJECTION_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Returns `false` if any value is empty, too long, or carries a script
/// or URI-scheme marker (case-insensitive).
pub fn validate_url_params<I, K, V>(params: I, limits: &InputLimits) -> bool
where
    I: IntoIterator<Item = (K, V)>,
    V: AsRef<str>,
{
    params
        .into_iter()
        .all(|(_, value)| is_acceptable_param(value.as_ref(), limits))
}

/// JSON flavour of [`validate_url_params`]: non-string values are rejected.
pub fn validate_url_param_values(params: &Map<String, Value>, limits: &InputLimits) -> bool {
    params.values().all(|value| match value {
        Value::String(s) => is_acceptable_param(s, limits),
        _ => false,
    })
}

/// Shallow clean-up of a JSON object.
///
/// Strings are sanitized, numbers and booleans are kept, arrays get their
/// string elements sanitized, and everything else is dropped. Returns
/// `None` if `data` is not an object.
pub fn validate_and_sanitize_data(data: &Value, limits: &InputLimits) -> Option<Map<String, Value>> {
    let object = data.as_object()?;
    let mut sanitized = Map::new();
    for (key, value) in object {
        let cleaned = match value {
            Value::String(s) => Value::String(sanitize_input(s, limits)),
            Value::Number(_) | Value::Bool(_) => value.clone(),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Value::String(sanitize_input(s, limits)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            Value::Null | Value::Object(_) => continue,
        };
        sanitized.insert(key.clone(), cleaned);
    }
    Some(sanitized)
}
