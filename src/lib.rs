//! Storefront metrics engine.
//!
//! Computes time-bucketed business metrics (sales, growth, new and repeat
//! customers, geography, cohort lifetime value) from order and customer
//! exports. Exports are read from a data directory into an in-process DuckDB
//! database and reduced on every call; nothing is cached between calls
//! except the loaded records, which are re-read when the export changes.
//!
//! # Quick start
//!
//! ```no_run
//! use shopmetrics::{Granularity, ShopMetrics};
//!
//! let metrics = ShopMetrics::builder().data_dir("./data").build().unwrap();
//!
//! let sales = metrics.sales().over_time(Granularity::Monthly).unwrap();
//! let repeat = metrics.customers().repeat_over_time(Granularity::Quarterly).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod bucket;
pub mod coerce;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod queries;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncShopMetrics;
pub use bucket::{bucket_key, Granularity};
pub use coerce::to_amount;
pub use connection::Connection;
pub use error::{MetricsError, Result};
pub use queries::Metric;
pub use store::RecordStore;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

// ---------------------------------------------------------------------------
// ShopMetricsBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`ShopMetrics`] instance.
///
/// Use [`ShopMetrics::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](ShopMetricsBuilder::build).
#[derive(Default)]
pub struct ShopMetricsBuilder {
    data_dir: Option<PathBuf>,
    orders_file: Option<PathBuf>,
    customers_file: Option<PathBuf>,
}

impl ShopMetricsBuilder {
    /// Set the directory holding the order and customer exports.
    ///
    /// If not set, the platform data directory is used (e.g.
    /// `~/.local/share/shopmetrics` on Linux).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read orders from this file instead of probing the data directory.
    pub fn orders_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.orders_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read customers from this file instead of probing the data directory.
    pub fn customers_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.customers_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the engine and open the DuckDB connection.
    ///
    /// Export files are not read here; each collection loads on first use.
    pub fn build(self) -> Result<ShopMetrics> {
        let mut store = RecordStore::new(self.data_dir);
        if let Some(path) = self.orders_file {
            store = store.with_file(config::ORDERS, path);
        }
        if let Some(path) = self.customers_file {
            store = store.with_file(config::CUSTOMERS, path);
        }
        info!(data_dir = %store.data_dir.display(), "Opening metrics engine");
        let conn = Connection::new(store)?;
        Ok(ShopMetrics { conn })
    }
}

// ---------------------------------------------------------------------------
// ShopMetrics
// ---------------------------------------------------------------------------

/// The main entry point for the metrics engine.
///
/// Wraps a [`Connection`] (which owns the [`RecordStore`] and DuckDB database)
/// and exposes the metric pipelines as lightweight borrowing wrappers.
pub struct ShopMetrics {
    conn: Connection,
}

impl ShopMetrics {
    /// Create a new builder for configuring the engine.
    pub fn builder() -> ShopMetricsBuilder {
        ShopMetricsBuilder::default()
    }

    /// Wrap an already prepared connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the sales pipelines (total sales, growth rate).
    pub fn sales(&self) -> queries::sales::SalesQuery<'_> {
        queries::sales::SalesQuery::new(&self.conn)
    }

    /// Access the customer pipelines (new, repeat, lifetime value).
    pub fn customers(&self) -> queries::customers::CustomerQuery<'_> {
        queries::customers::CustomerQuery::new(&self.conn)
    }

    /// Access the geographic distribution pipeline.
    pub fn geography(&self) -> queries::geography::GeographyQuery<'_> {
        queries::geography::GeographyQuery::new(&self.conn)
    }

    /// Access the raw order and customer records.
    pub fn records(&self) -> queries::records::RecordQuery<'_> {
        queries::records::RecordQuery::new(&self.conn)
    }

    /// Run one metric from its name and a raw `timeFrame` value.
    ///
    /// Missing or unrecognized time frames resolve to monthly; `quarterly`
    /// is honoured by [`Metric::RepeatCustomers`] only. The rows are returned
    /// as a JSON array ready to serve.
    pub fn run_metric(
        &self,
        metric: Metric,
        time_frame: Option<&str>,
    ) -> Result<serde_json::Value> {
        let granularity = Granularity::from_param(time_frame);
        let value = match metric {
            Metric::SalesOverTime => serde_json::to_value(self.sales().over_time(granularity)?)?,
            Metric::SalesGrowthRate => {
                serde_json::to_value(self.sales().growth_rate(granularity)?)?
            }
            Metric::NewCustomersOverTime => {
                serde_json::to_value(self.customers().new_over_time(granularity)?)?
            }
            Metric::RepeatCustomers => {
                serde_json::to_value(self.customers().repeat_over_time(granularity)?)?
            }
            Metric::GeographicalDistribution => {
                serde_json::to_value(self.geography().distribution(granularity)?)?
            }
            Metric::CustomerLifetimeValue => {
                serde_json::to_value(self.customers().lifetime_value(granularity)?)?
            }
        };
        Ok(value)
    }

    // -- Metadata and utility methods --------------------------------------

    /// Return the names of the collections currently loaded into DuckDB.
    pub fn collections(&self) -> Vec<String> {
        self.conn.collections()
    }

    /// Execute a raw SQL query against the DuckDB database.
    ///
    /// Collections are tables with a single `doc` JSON column, loaded on
    /// first use by the query accessors.
    ///
    /// # Arguments
    ///
    /// * `query` - SQL string with `?` positional placeholders.
    /// * `params` - Parameter values corresponding to the placeholders.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Drop loaded collections so the next query re-reads the exports.
    ///
    /// Changed export files are picked up automatically; this forces a
    /// re-read regardless.
    pub fn reload(&self) {
        self.conn.reset_collections();
        info!("Collections reset; exports will be re-read on next query");
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for ShopMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ShopMetrics(data_dir={}, collections=[{}])",
            self.conn.store.data_dir.display(),
            self.conn.collections().join(", ")
        )
    }
}
