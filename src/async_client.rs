//! Async wrapper around [`ShopMetrics`] for use in Tokio runtimes.
//!
//! Runs every call on the blocking thread pool via
//! [`tokio::task::spawn_blocking`] and bounds it with a per-call deadline.
//! A call that overruns its deadline fails with
//! [`MetricsError::StoreUnavailable`]; its result is discarded once it finishes.
//!
//! # Example
//!
//! ```no_run
//! use shopmetrics::{AsyncShopMetrics, Metric};
//!
//! #[tokio::main]
//! async fn main() {
//!     let metrics = AsyncShopMetrics::builder().data_dir("./data").build().await.unwrap();
//!
//!     let rows = metrics.metric(Metric::SalesGrowthRate, Some("yearly")).await.unwrap();
//!
//!     let geo = metrics
//!         .run(|m| m.geography().distribution(shopmetrics::Granularity::Monthly))
//!         .await
//!         .unwrap();
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinError;
use tracing::warn;

use crate::config;
use crate::error::{MetricsError, Result};
use crate::queries::Metric;
use crate::ShopMetrics;

// ---------------------------------------------------------------------------
// AsyncShopMetricsBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncShopMetrics`] instance.
pub struct AsyncShopMetricsBuilder {
    data_dir: Option<PathBuf>,
    orders_file: Option<PathBuf>,
    customers_file: Option<PathBuf>,
    deadline: Duration,
}

impl Default for AsyncShopMetricsBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            orders_file: None,
            customers_file: None,
            deadline: config::DEFAULT_DEADLINE,
        }
    }
}

impl AsyncShopMetricsBuilder {
    /// Set the directory holding the order and customer exports.
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

    /// Set the per-call deadline. Defaults to 30 seconds.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Build the async engine on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncShopMetrics> {
        let deadline = self.deadline;
        let metrics = tokio::task::spawn_blocking(move || {
            let mut builder = ShopMetrics::builder();
            if let Some(dir) = self.data_dir {
                builder = builder.data_dir(dir);
            }
            if let Some(path) = self.orders_file {
                builder = builder.orders_file(path);
            }
            if let Some(path) = self.customers_file {
                builder = builder.customers_file(path);
            }
            builder.build()
        })
        .await
        .map_err(join_error)??;

        Ok(AsyncShopMetrics::new(metrics, deadline))
    }
}

// ---------------------------------------------------------------------------
// AsyncShopMetrics
// ---------------------------------------------------------------------------

/// Async wrapper around [`ShopMetrics`].
///
/// The engine sits behind a [`Mutex`] because its DuckDB connection is not
/// `Sync`; pipelines are read-only, so the lock only serializes access to the
/// connection handle.
pub struct AsyncShopMetrics {
    inner: Arc<Mutex<ShopMetrics>>,
    deadline: Duration,
}

impl AsyncShopMetrics {
    /// Create a new builder for configuring the async engine.
    pub fn builder() -> AsyncShopMetricsBuilder {
        AsyncShopMetricsBuilder::default()
    }

    /// Wrap an existing engine with the given per-call deadline.
    pub fn new(metrics: ShopMetrics, deadline: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(metrics)),
            deadline,
        }
    }

    /// The per-call deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run a sync engine operation on the blocking thread pool.
    ///
    /// Either the closure's full result is returned or an error is; a call
    /// that exceeds the deadline yields [`MetricsError::StoreUnavailable`].
    /// The deadline starts once the call holds the engine, so time spent
    /// queued behind other calls is not charged to it.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ShopMetrics) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let metrics = self.inner.clone();
        let (started_tx, started_rx) = oneshot::channel();
        let mut task = tokio::task::spawn_blocking(move || {
            let guard = metrics
                .lock()
                .map_err(|_| MetricsError::StoreUnavailable("engine lock poisoned".into()))?;
            let _ = started_tx.send(());
            f(&guard)
        });

        // The sender only drops unsent when the task failed before running `f`.
        if started_rx.await.is_err() {
            return (&mut task).await.map_err(join_error)?;
        }

        match tokio::time::timeout(self.deadline, &mut task).await {
            Ok(joined) => joined.map_err(join_error)?,
            Err(_) => {
                warn!(deadline = ?self.deadline, "Metrics call exceeded its deadline");
                Err(MetricsError::StoreUnavailable(format!(
                    "query exceeded deadline of {:?}",
                    self.deadline
                )))
            }
        }
    }

    /// Run one metric by name with a raw `timeFrame` value.
    pub async fn metric(
        &self,
        metric: Metric,
        time_frame: Option<&str>,
    ) -> Result<serde_json::Value> {
        let time_frame = time_frame.map(|s| s.to_string());
        self.run(move |m| m.run_metric(metric, time_frame.as_deref()))
            .await
    }

    /// Execute a raw SQL query asynchronously.
    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |m| m.sql(&query, &params)).await
    }

    /// Drop loaded collections so the next query re-reads the exports.
    pub async fn reload(&self) -> Result<()> {
        self.run(|m| {
            m.reload();
            Ok(())
        })
        .await
    }

    /// Return the names of the collections currently loaded.
    pub async fn collections(&self) -> Result<Vec<String>> {
        self.run(|m| Ok(m.collections())).await
    }
}

fn join_error(e: JoinError) -> MetricsError {
    MetricsError::StoreUnavailable(format!("Task join error: {e}"))
}
