//! Lenient accessors over raw feature attributes.
//!
//! `GeoServer` is inconsistent about attribute types: numbers arrive as
//! strings and vice versa, and absent values show up as `null` or `""`.

use serde_json::{Map, Value};

pub type Properties = Map<String, Value>;

/// The `properties` object of a feature, empty if missing.
pub fn properties(feature: &Value) -> Properties {
    feature
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// The feature's `id`, or `fallback` when absent or empty.
pub fn feature_id(feature: &Value, fallback: impl FnOnce() -> String) -> String {
    match feature.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => fallback(),
    }
}

/// Non-empty string value. Numbers are stringified.
pub fn str_prop(props: &Properties, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Floating-point value from a number or a numeric string.
pub fn f64_prop(props: &Properties, key: &str) -> Option<f64> {
    let value = match props.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

/// Integer value. Strings are read up to the first non-digit, so `"3등급"`
/// yields `3`; fractional numbers are truncated.
pub fn int_prop(props: &Properties, key: &str) -> Option<i64> {
    match props.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => leading_int(s.trim()),
        _ => None,
    }
}

/// `true` when the attribute is the flag `'Y'`.
pub fn flag_prop(props: &Properties, key: &str) -> bool {
    props.get(key).and_then(Value::as_str) == Some("Y")
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(v: f64) -> Option<i64> {
    (v.is_finite() && v.abs() < 9.0e15).then(|| v.trunc() as i64)
}

fn leading_int(s: &str) -> Option<i64> {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
