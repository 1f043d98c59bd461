use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;
use shopmetrics::Metric;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TimeFrameParams {
    #[serde(rename = "timeFrame")]
    pub time_frame: Option<String>,
}

async fn serve(
    state: &AppState,
    metric: Metric,
    params: TimeFrameParams,
) -> Result<Json<Value>, AppError> {
    let rows = state
        .metrics
        .metric(metric, params.time_frame.as_deref())
        .await?;
    Ok(Json(rows))
}

/// GET /api/sales-over-time?timeFrame=daily|monthly|yearly
pub async fn sales_over_time(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeFrameParams>,
) -> Result<Json<Value>, AppError> {
    serve(&state, Metric::SalesOverTime, params).await
}

/// GET /api/sales-growth-rate?timeFrame=daily|monthly|yearly
pub async fn sales_growth_rate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeFrameParams>,
) -> Result<Json<Value>, AppError> {
    serve(&state, Metric::SalesGrowthRate, params).await
}

/// GET /api/new-customers-over-time?timeFrame=daily|monthly|yearly
pub async fn new_customers_over_time(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeFrameParams>,
) -> Result<Json<Value>, AppError> {
    serve(&state, Metric::NewCustomersOverTime, params).await
}

/// GET /api/repeat-customers?timeFrame=daily|monthly|quarterly|yearly
pub async fn repeat_customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeFrameParams>,
) -> Result<Json<Value>, AppError> {
    serve(&state, Metric::RepeatCustomers, params).await
}

/// GET /api/geographical-distribution?timeFrame=daily|monthly|yearly
pub async fn geographical_distribution(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeFrameParams>,
) -> Result<Json<Value>, AppError> {
    serve(&state, Metric::GeographicalDistribution, params).await
}

/// GET /api/customer-lifetime-value?timeFrame=daily|monthly|yearly
pub async fn customer_lifetime_value(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeFrameParams>,
) -> Result<Json<Value>, AppError> {
    serve(&state, Metric::CustomerLifetimeValue, params).await
}
