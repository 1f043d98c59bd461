//! Sales pipelines: per-bucket order totals and their bucket-over-bucket growth.

use std::collections::BTreeMap;

use crate::bucket::Granularity;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{GrowthRow, Order, SalesRow};
use crate::queries::records::RecordQuery;

// ---------------------------------------------------------------------------
// SalesQuery
// ---------------------------------------------------------------------------

/// Query interface for sales metrics backed by the `orders` collection.
///
/// Quarterly granularity is not offered here and falls back to monthly.
pub struct SalesQuery<'a> {
    conn: &'a Connection,
}

impl<'a> SalesQuery<'a> {
    /// Create a new `SalesQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Total sales per bucket, ascending by bucket.
    pub fn over_time(&self, granularity: Granularity) -> Result<Vec<SalesRow>> {
        let orders = RecordQuery::new(self.conn).orders()?;
        Ok(total_sales(&orders, granularity))
    }

    /// Total sales per bucket with percentage growth over the previous bucket.
    pub fn growth_rate(&self, granularity: Granularity) -> Result<Vec<GrowthRow>> {
        let orders = RecordQuery::new(self.conn).orders()?;
        Ok(growth_rates(&total_sales(&orders, granularity)))
    }
}

// ---------------------------------------------------------------------------
// Reductions
// ---------------------------------------------------------------------------

/// Sum coerced order amounts per bucket. Orders whose timestamp does not
/// parse contribute nothing, not even an empty bucket.
pub fn total_sales(orders: &[Order], granularity: Granularity) -> Vec<SalesRow> {
    let granularity = granularity.without_quarterly();
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();

    for order in orders {
        let Some(created) = order.created_at_utc() else {
            continue;
        };
        *sums.entry(granularity.key_for(&created)).or_default() += order.amount();
    }

    sums.into_iter()
        .map(|(bucket, total_sales)| SalesRow { bucket, total_sales })
        .collect()
}

/// Attach growth rates to ascending sales rows.
///
/// Each row is compared with the row before it in the sequence, not with the
/// previous calendar period. The first row, and any row whose predecessor
/// summed to zero or less, gets `0.0`.
pub fn growth_rates(sales: &[SalesRow]) -> Vec<GrowthRow> {
    let mut prev: Option<f64> = None;
    sales
        .iter()
        .map(|row| {
            let growth_rate = match prev {
                Some(p) if p > 0.0 => (row.total_sales - p) / p * 100.0,
                _ => 0.0,
            };
            prev = Some(row.total_sales);
            GrowthRow {
                bucket: row.bucket.clone(),
                total_sales: row.total_sales,
                growth_rate,
            }
        })
        .collect()
}
