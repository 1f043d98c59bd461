use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bucket::timestamp_from_value;
use crate::coerce::to_amount;

// ---------------------------------------------------------------------------
// Order — one exported order document, projected to the fields metrics use
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Option<String>,
    /// Raw `created_at` value, kept as found in the document.
    pub created_at: Option<Value>,
    /// Raw shop-currency amount; see [`Order::amount`].
    pub total_price: Option<Value>,
    /// `None` for guest checkouts.
    pub customer_id: Option<String>,
}

impl Order {
    /// Build from a projected row whose columns hold the raw JSON text of
    /// each field (`id`, `created_at`, `total_price`, `customer_id`).
    pub fn from_row(row: &HashMap<String, Value>) -> Self {
        Self {
            id: identifier(raw_field(row, "id").as_ref()),
            created_at: raw_field(row, "created_at"),
            total_price: raw_field(row, "total_price"),
            customer_id: identifier(raw_field(row, "customer_id").as_ref()),
        }
    }

    /// Order timestamp in UTC, or `None` when missing or unparseable.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        timestamp_from_value(self.created_at.as_ref())
    }

    /// Order total, `0.0` when missing or not numeric.
    pub fn amount(&self) -> f64 {
        to_amount(self.total_price.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Customer — one exported customer document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Option<String>,
    pub created_at: Option<Value>,
    pub default_city: Option<String>,
}

impl Customer {
    pub fn from_row(row: &HashMap<String, Value>) -> Self {
        let city = match raw_field(row, "default_city") {
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
            None => None,
        };
        Self {
            id: identifier(raw_field(row, "id").as_ref()),
            created_at: raw_field(row, "created_at"),
            default_city: city,
        }
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        timestamp_from_value(self.created_at.as_ref())
    }

    /// City used for geographic grouping; absent cities group under `""`.
    pub fn city_key(&self) -> &str {
        self.default_city.as_deref().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Decode a column holding raw JSON text. SQL NULL and JSON `null` are both absent.
fn raw_field(row: &HashMap<String, Value>, column: &str) -> Option<Value> {
    let text = row.get(column)?.as_str()?;
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Null) => None,
        Ok(v) => Some(v),
        // Not valid JSON text; keep it as an opaque string
        Err(_) => Some(Value::String(text.to_string())),
    }
}

/// Normalize an identifier to a string. Numbers render in decimal form and
/// extended-JSON `$oid` / `$numberLong` wrappers are unwrapped.
fn identifier(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map
            .get("$oid")
            .or_else(|| map.get("$numberLong"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}
