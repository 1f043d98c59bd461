use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SalesRow — summed order totals for one bucket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRow {
    pub bucket: String,
    pub total_sales: f64,
}

// ---------------------------------------------------------------------------
// GrowthRow — bucket sales with percentage change vs the previous bucket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRow {
    pub bucket: String,
    pub total_sales: f64,
    pub growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomersRow {
    pub bucket: String,
    pub new_customers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatCustomersRow {
    pub bucket: String,
    pub repeat_customers: u64,
}

// ---------------------------------------------------------------------------
// CityDistribution — one city with its per-bucket customer counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDistribution {
    /// Empty for customers without a default city.
    pub city: String,
    /// Total across every bucket in `data`.
    pub customer_count: u64,
    pub data: Vec<CityBucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityBucket {
    pub bucket: String,
    pub customer_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeValueRow {
    pub bucket: String,
    pub avg_lifetime_value: f64,
}
