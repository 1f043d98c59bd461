//! Query modules for the metrics engine.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and exposes methods
//! returning `Result<Vec<Row>>`. The reductions behind them are plain
//! functions over loaded records and can be used directly.

pub mod customers;
pub mod geography;
pub mod records;
pub mod sales;

pub use customers::CustomerQuery;
pub use geography::GeographyQuery;
pub use records::RecordQuery;
pub use sales::SalesQuery;

use std::fmt;
use std::str::FromStr;

use crate::error::MetricsError;

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// The six metric pipelines, addressable by their route name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    SalesOverTime,
    SalesGrowthRate,
    NewCustomersOverTime,
    RepeatCustomers,
    GeographicalDistribution,
    CustomerLifetimeValue,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::SalesOverTime,
        Metric::SalesGrowthRate,
        Metric::NewCustomersOverTime,
        Metric::RepeatCustomers,
        Metric::GeographicalDistribution,
        Metric::CustomerLifetimeValue,
    ];

    /// Route segment under which the metric is served, e.g. `sales-over-time`.
    pub fn route(&self) -> &'static str {
        match self {
            Metric::SalesOverTime => "sales-over-time",
            Metric::SalesGrowthRate => "sales-growth-rate",
            Metric::NewCustomersOverTime => "new-customers-over-time",
            Metric::RepeatCustomers => "repeat-customers",
            Metric::GeographicalDistribution => "geographical-distribution",
            Metric::CustomerLifetimeValue => "customer-lifetime-value",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}

impl FromStr for Metric {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim_start_matches('/');
        Metric::ALL
            .into_iter()
            .find(|m| m.route() == name)
            .ok_or_else(|| MetricsError::InvalidArgument(format!("Unknown metric: {}", s)))
    }
}
