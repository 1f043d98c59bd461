//! Geographic distribution of customers across cities and time buckets.

use std::collections::{BTreeMap, HashMap};

use crate::bucket::Granularity;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{CityBucket, CityDistribution, Customer};
use crate::queries::records::RecordQuery;

// ---------------------------------------------------------------------------
// GeographyQuery
// ---------------------------------------------------------------------------

/// Query interface for customer geography backed by the `customers` collection.
pub struct GeographyQuery<'a> {
    conn: &'a Connection,
}

impl<'a> GeographyQuery<'a> {
    /// Create a new `GeographyQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// One row per city with its per-bucket customer counts, largest city first.
    pub fn distribution(&self, granularity: Granularity) -> Result<Vec<CityDistribution>> {
        let customers = RecordQuery::new(self.conn).customers()?;
        Ok(city_distribution(&customers, granularity))
    }
}

// ---------------------------------------------------------------------------
// Reductions
// ---------------------------------------------------------------------------

/// Count customers per `(city, bucket)` and pivot into one row per city.
///
/// Rows are ordered by the city's total customer count (descending), then by
/// city name; each city's buckets are ascending. Customers without a city
/// group under `""`; customers with an unparseable signup time are skipped.
pub fn city_distribution(
    customers: &[Customer],
    granularity: Granularity,
) -> Vec<CityDistribution> {
    let granularity = granularity.without_quarterly();
    let mut cities: HashMap<&str, BTreeMap<String, u64>> = HashMap::new();

    for customer in customers {
        let Some(created) = customer.created_at_utc() else {
            continue;
        };
        *cities
            .entry(customer.city_key())
            .or_default()
            .entry(granularity.key_for(&created))
            .or_default() += 1;
    }

    let mut rows: Vec<CityDistribution> = cities
        .into_iter()
        .map(|(city, buckets)| {
            let data: Vec<CityBucket> = buckets
                .into_iter()
                .map(|(bucket, customer_count)| CityBucket { bucket, customer_count })
                .collect();
            CityDistribution {
                city: city.to_string(),
                customer_count: data.iter().map(|b| b.customer_count).sum(),
                data,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.customer_count
            .cmp(&a.customer_count)
            .then_with(|| a.city.cmp(&b.city))
    });
    rows
}
