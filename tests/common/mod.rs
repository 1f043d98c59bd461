//! Shared test fixtures for the metrics integration tests.
//!
//! Provides `setup_sample_db()` which creates an in-memory DuckDB connection
//! populated with small `orders` and `customers` collections via NDJSON temp
//! files, plus helpers for building custom collections.

#![allow(dead_code)]

use serde_json::{json, Value};
use shopmetrics::{Connection, RecordStore};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Create a `Connection` with the sample orders and customers loaded.
///
/// Returns `(Connection, tempfile::TempDir)`. The caller must keep the `TempDir`
/// alive for the duration of the test.
pub fn setup_sample_db() -> (Connection, tempfile::TempDir) {
    setup_db(&sample_orders(), &sample_customers())
}

/// Create a `Connection` with the given documents as the two collections.
pub fn setup_db(orders: &[Value], customers: &[Value]) -> (Connection, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(Some(tmp_dir.path().to_path_buf()));
    let conn = Connection::new(store).unwrap();

    write_ndjson_and_register(&conn, "orders", orders);
    write_ndjson_and_register(&conn, "customers", customers);

    (conn, tmp_dir)
}

/// A Shopify-shaped order document.
pub fn order(id: u64, customer_id: Option<u64>, created_at: &str, amount: Value) -> Value {
    let mut doc = json!({
        "id": id,
        "created_at": created_at,
        "total_price_set": {
            "shop_money": { "amount": amount, "currency_code": "CAD" },
            "presentment_money": { "amount": amount, "currency_code": "USD" }
        }
    });
    if let Some(cid) = customer_id {
        doc["customer"] = json!({ "id": cid, "email": format!("c{}@example.com", cid) });
    }
    doc
}

/// A Shopify-shaped customer document. `city: None` omits the address.
pub fn customer(id: u64, created_at: &str, city: Option<&str>) -> Value {
    let mut doc = json!({
        "id": id,
        "created_at": created_at,
        "orders_count": 0
    });
    if let Some(c) = city {
        doc["default_address"] = json!({ "city": c, "country": "Canada" });
    }
    doc
}

/// Two customers, three orders:
/// A (1) orders $10 on 2024-01-05 and $20 on 2024-02-10; B (2) orders $5 on 2024-01-20.
pub fn sample_orders() -> Vec<Value> {
    vec![
        order(1001, Some(1), "2024-01-05T10:00:00Z", json!("10.00")),
        order(1002, Some(1), "2024-02-10T12:00:00Z", json!("20.00")),
        order(1003, Some(2), "2024-01-20T09:00:00Z", json!("5.00")),
    ]
}

pub fn sample_customers() -> Vec<Value> {
    vec![
        customer(1, "2024-01-03T08:00:00Z", Some("Toronto")),
        customer(2, "2024-01-15", Some("Toronto")),
        customer(3, "2024-02-01T00:00:00Z", Some("Ottawa")),
        customer(4, "not-a-date", Some("Toronto")),
        customer(5, "2024-02-20T10:00:00Z", None),
        // 2024-01-01T04:30 in UTC
        customer(6, "2023-12-31T23:30:00-05:00", Some("Ottawa")),
    ]
}

/// Write documents as NDJSON to `path`.
pub fn write_ndjson(path: &Path, rows: &[Value]) {
    let mut file = std::fs::File::create(path).unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();
}

/// Write a slice of JSON values as NDJSON to a temp file and register it
/// as a collection via `Connection::register_collection_from_ndjson`.
fn write_ndjson_and_register(conn: &Connection, name: &str, rows: &[Value]) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    conn.register_collection_from_ndjson(name, path).unwrap();
    // DuckDB has copied the data into an in-memory table by now
}
