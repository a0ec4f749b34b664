//! Coercions from raw form strings to typed values
//!
//! Form fields arrive as optional strings. These helpers turn them into the
//! optional typed values the schemas validate; `None` always means the field
//! is missing or could not be coerced, and the schema's `required` rule
//! reports it.

use std::str::FromStr;

/// Coerce to a required string: missing or blank becomes `None`
pub fn non_blank(value: Option<&str>) -> Option<String> {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => Some(s.to_string()),
        _ => None,
    }
}

/// Coerce to a number the way a form's numeric input is read
///
/// Missing or blank input reads as `0`, so it fails a positivity check
/// rather than a presence check. Unparsable and non-finite input becomes
/// `None`.
pub fn number(value: Option<&str>) -> Option<f64> {
    let raw = value.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce to one of a fixed set of values: exact match or `None`
pub fn one_of<T: FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|s| s.parse().ok())
}
