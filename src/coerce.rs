//! Best-effort numeric coercion for monetary fields.
//!
//! Unlike timestamps, a bad amount never removes a record from a metric: it
//! contributes `0.0` instead.

use serde_json::Value;

const NUMBER_WRAPPERS: [&str; 4] = ["$numberDecimal", "$numberDouble", "$numberInt", "$numberLong"];

/// Coerce a raw amount field to a finite `f64`, defaulting to `0.0`.
///
/// Numbers and numeric strings are accepted, as are the extended-JSON number
/// wrappers (`$numberDecimal`, `$numberDouble`, `$numberInt`, `$numberLong`).
pub fn to_amount(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_amount(s),
        Some(Value::Object(map)) => NUMBER_WRAPPERS
            .iter()
            .find_map(|k| map.get(*k))
            .and_then(|v| v.as_str())
            .and_then(parse_amount),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
}

fn parse_amount(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}
