//! Customer pipelines: acquisition counts, repeat buyers and cohort lifetime value.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::bucket::Granularity;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{Customer, LifetimeValueRow, NewCustomersRow, Order, RepeatCustomersRow};
use crate::queries::records::RecordQuery;

// ---------------------------------------------------------------------------
// CustomerQuery
// ---------------------------------------------------------------------------

/// Query interface for customer metrics.
///
/// New-customer counts read the `customers` collection; repeat customers and
/// lifetime value are derived from `orders` grouped by customer id.
pub struct CustomerQuery<'a> {
    conn: &'a Connection,
}

impl<'a> CustomerQuery<'a> {
    /// Create a new `CustomerQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Customers created per bucket, ascending.
    pub fn new_over_time(&self, granularity: Granularity) -> Result<Vec<NewCustomersRow>> {
        let customers = RecordQuery::new(self.conn).customers()?;
        Ok(new_customers(&customers, granularity))
    }

    /// Customers with more than one order, counted in the bucket of their
    /// most recent order. Supports quarterly granularity.
    pub fn repeat_over_time(&self, granularity: Granularity) -> Result<Vec<RepeatCustomersRow>> {
        let orders = RecordQuery::new(self.conn).orders()?;
        Ok(repeat_customers(&orders, granularity))
    }

    /// Average lifetime spend per acquisition cohort (bucket of first order).
    pub fn lifetime_value(&self, granularity: Granularity) -> Result<Vec<LifetimeValueRow>> {
        let orders = RecordQuery::new(self.conn).orders()?;
        Ok(lifetime_value(&orders, granularity))
    }
}

// ---------------------------------------------------------------------------
// Reductions
// ---------------------------------------------------------------------------

pub fn new_customers(customers: &[Customer], granularity: Granularity) -> Vec<NewCustomersRow> {
    let granularity = granularity.without_quarterly();
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    for customer in customers {
        if let Some(created) = customer.created_at_utc() {
            *counts.entry(granularity.key_for(&created)).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(bucket, new_customers)| NewCustomersRow { bucket, new_customers })
        .collect()
}

#[derive(Default)]
struct OrderHistory {
    order_count: u64,
    last_order: Option<DateTime<Utc>>,
}

/// Two-phase reduction: per-customer order count and latest order, then a
/// count of customers with `order_count > 1` per bucket of that latest order.
///
/// Guest orders never make a repeat customer. Every order counts towards
/// `order_count`, but only parseable timestamps compete for the latest
/// order; a customer with none is dropped.
pub fn repeat_customers(orders: &[Order], granularity: Granularity) -> Vec<RepeatCustomersRow> {
    let mut histories: HashMap<&str, OrderHistory> = HashMap::new();

    for order in orders {
        let Some(customer_id) = order.customer_id.as_deref() else {
            continue;
        };
        let history = histories.entry(customer_id).or_default();
        history.order_count += 1;
        if let Some(created) = order.created_at_utc() {
            history.last_order = history.last_order.max(Some(created));
        }
    }

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for history in histories.values().filter(|h| h.order_count > 1) {
        if let Some(last) = history.last_order {
            *counts.entry(granularity.key_for(&last)).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(bucket, repeat_customers)| RepeatCustomersRow { bucket, repeat_customers })
        .collect()
}

#[derive(Default)]
struct Spend {
    total_spent: f64,
    first_order: Option<DateTime<Utc>>,
}

/// Two-phase reduction: per-customer total spend and first order, then the
/// mean spend of customers sharing a first-order bucket.
///
/// A customer's whole spend lands in their acquisition cohort, including
/// orders placed in later periods or with unparseable timestamps.
///
/// Guest orders are left out entirely rather than pooled into one anonymous
/// customer, matching [`repeat_customers`]. Cohort sums run in customer-id
/// order so identical orders always give bit-identical averages.
pub fn lifetime_value(orders: &[Order], granularity: Granularity) -> Vec<LifetimeValueRow> {
    let granularity = granularity.without_quarterly();
    let mut spend: BTreeMap<&str, Spend> = BTreeMap::new();

    for order in orders {
        let Some(customer_id) = order.customer_id.as_deref() else {
            continue;
        };
        let entry = spend.entry(customer_id).or_default();
        entry.total_spent += order.amount();
        if let Some(created) = order.created_at_utc() {
            entry.first_order = Some(match entry.first_order {
                Some(first) => first.min(created),
                None => created,
            });
        }
    }

    let mut cohorts: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for customer in spend.values() {
        if let Some(first) = customer.first_order {
            let cohort = cohorts.entry(granularity.key_for(&first)).or_default();
            cohort.0 += customer.total_spent;
            cohort.1 += 1;
        }
    }

    cohorts
        .into_iter()
        .map(|(bucket, (sum, members))| LifetimeValueRow {
            bucket,
            avg_lifetime_value: sum / members as f64,
        })
        .collect()
}
