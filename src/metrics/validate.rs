//! Shape validation for raw backend payloads.
//!
//! The backend serves loosely-typed JSON: pairs of index-aligned arrays
//! under agreed keys. Nothing downstream runs until the shape invariants
//! hold, so every helper here either produces typed columns or a
//! [`MetricsError::Validation`] whose message names the offending field.

use serde_json::Value;

use crate::error::MetricsError;

/// Look up `key` and require it to be a JSON array.
pub fn require_array<'a>(payload: &'a Value, key: &str) -> Result<&'a Vec<Value>, MetricsError> {
    match payload.get(key) {
        None => Err(MetricsError::Validation(format!(
            "missing `{key}` array in response"
        ))),
        Some(value) => value.as_array().ok_or_else(|| {
            MetricsError::Validation(format!("`{key}` is not an array"))
        }),
    }
}

/// Require `labels[i]` / `counts[i]` alignment between two keys.
pub fn require_aligned(
    payload: &Value,
    label_key: &str,
    count_key: &str,
) -> Result<(), MetricsError> {
    let labels = require_array(payload, label_key)?;
    let counts = require_array(payload, count_key)?;
    if labels.len() != counts.len() {
        return Err(MetricsError::Validation(format!(
            "`{label_key}` and `{count_key}` arrays have different lengths ({} vs {})",
            labels.len(),
            counts.len()
        )));
    }
    Ok(())
}

/// Extract an array of strings under `key`.
pub fn string_column(payload: &Value, key: &str) -> Result<Vec<String>, MetricsError> {
    let raw = require_array(payload, key)?;
    let mut out = Vec::with_capacity(raw.len());
    for (idx, value) in raw.iter().enumerate() {
        let s = value.as_str().ok_or_else(|| {
            MetricsError::Validation(format!("`{key}[{idx}]` is not a string"))
        })?;
        out.push(s.to_string());
    }
    Ok(out)
}

/// Extract an array of numbers under `key`.
pub fn number_column(payload: &Value, key: &str) -> Result<Vec<f64>, MetricsError> {
    let raw = require_array(payload, key)?;
    let mut out = Vec::with_capacity(raw.len());
    for (idx, value) in raw.iter().enumerate() {
        let n = value.as_f64().ok_or_else(|| {
            MetricsError::Validation(format!("`{key}[{idx}]` is not a number"))
        })?;
        out.push(n);
    }
    Ok(out)
}

/// Index-aligned string labels + numeric counts, the common backend shape.
pub fn aligned_columns(
    payload: &Value,
    label_key: &str,
    count_key: &str,
) -> Result<(Vec<String>, Vec<f64>), MetricsError> {
    require_aligned(payload, label_key, count_key)?;
    let labels = string_column(payload, label_key)?;
    let counts = number_column(payload, count_key)?;
    Ok((labels, counts))
}
