//! Raw record access over the `orders` and `customers` collections.
//!
//! Every metric pipeline starts here: documents are projected to the handful
//! of fields the metrics need, each column carrying the field's raw JSON text
//! so that number-vs-string and null-vs-missing survive the trip out of DuckDB.

use crate::config;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{Customer, Order};

// ---------------------------------------------------------------------------
// RecordQuery
// ---------------------------------------------------------------------------

/// Query interface for the raw order and customer records.
pub struct RecordQuery<'a> {
    conn: &'a Connection,
}

impl<'a> RecordQuery<'a> {
    /// Create a new `RecordQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Load every order, projected to id, timestamp, amount and customer id.
    pub fn orders(&self) -> Result<Vec<Order>> {
        self.conn.ensure_collections(&[config::ORDERS])?;

        let sql = format!(
            "SELECT {}, {}, {}, {} FROM {}",
            raw_column(config::ORDER_ID_PATH, "id"),
            raw_column(config::ORDER_CREATED_AT_PATH, "created_at"),
            raw_column(config::ORDER_AMOUNT_PATH, "total_price"),
            raw_column(config::ORDER_CUSTOMER_ID_PATH, "customer_id"),
            config::ORDERS,
        );

        let rows = self.conn.execute(&sql, &[])?;
        Ok(rows.iter().map(Order::from_row).collect())
    }

    /// Load every customer, projected to id, signup timestamp and default city.
    pub fn customers(&self) -> Result<Vec<Customer>> {
        self.conn.ensure_collections(&[config::CUSTOMERS])?;

        let sql = format!(
            "SELECT {}, {}, {} FROM {}",
            raw_column(config::CUSTOMER_ID_PATH, "id"),
            raw_column(config::CUSTOMER_CREATED_AT_PATH, "created_at"),
            raw_column(config::CUSTOMER_CITY_PATH, "default_city"),
            config::CUSTOMERS,
        );

        let rows = self.conn.execute(&sql, &[])?;
        Ok(rows.iter().map(Customer::from_row).collect())
    }

    /// Number of order documents in the store.
    pub fn order_count(&self) -> Result<u64> {
        self.count(config::ORDERS)
    }

    /// Number of customer documents in the store.
    pub fn customer_count(&self) -> Result<u64> {
        self.count(config::CUSTOMERS)
    }

    fn count(&self, collection: &str) -> Result<u64> {
        self.conn.ensure_collections(&[collection])?;
        let value = self
            .conn
            .execute_scalar(&format!("SELECT COUNT(*) FROM {}", collection), &[])?;
        Ok(value.and_then(|v| v.as_u64()).unwrap_or(0))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn raw_column(path: &str, alias: &str) -> String {
    format!("CAST(json_extract(doc, '{}') AS VARCHAR) AS {}", path, alias)
}
