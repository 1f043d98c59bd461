use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub const ORDERS: &str = "orders";
pub const CUSTOMERS: &str = "customers";

/// Per-call deadline applied by the async client.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Export file names probed in the data directory, in preference order.
///
/// DuckDB detects the JSON layout (array or newline-delimited) and gzip
/// compression from the file itself, so any of these may be used.
pub fn collection_files() -> HashMap<&'static str, &'static [&'static str]> {
    HashMap::from([
        (
            ORDERS,
            &[
                "orders.ndjson",
                "orders.jsonl",
                "orders.json",
                "orders.ndjson.gz",
                "orders.json.gz",
                "shopifyOrders.json",
            ][..],
        ),
        (
            CUSTOMERS,
            &[
                "customers.ndjson",
                "customers.jsonl",
                "customers.json",
                "customers.ndjson.gz",
                "customers.json.gz",
                "shopifyCustomers.json",
            ][..],
        ),
    ])
}

// JSON paths into the raw Shopify documents
pub const ORDER_ID_PATH: &str = "$.id";
pub const ORDER_CREATED_AT_PATH: &str = "$.created_at";
pub const ORDER_AMOUNT_PATH: &str = "$.total_price_set.shop_money.amount";
pub const ORDER_CUSTOMER_ID_PATH: &str = "$.customer.id";

pub const CUSTOMER_ID_PATH: &str = "$.id";
pub const CUSTOMER_CREATED_AT_PATH: &str = "$.created_at";
pub const CUSTOMER_CITY_PATH: &str = "$.default_address.city";

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("shopmetrics")
    } else {
        PathBuf::from(".shopmetrics-data")
    }
}
