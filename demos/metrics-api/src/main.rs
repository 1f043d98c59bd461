mod error;
mod routes;
mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut builder = shopmetrics::AsyncShopMetrics::builder();
    if let Ok(dir) = std::env::var("SHOPMETRICS_DATA_DIR") {
        builder = builder.data_dir(dir);
    }
    let metrics = builder
        .build()
        .await
        .expect("Failed to initialize metrics engine");

    let state = Arc::new(AppState { metrics });

    let api = Router::new()
        .route("/sales-over-time", get(routes::metrics::sales_over_time))
        .route("/sales-growth-rate", get(routes::metrics::sales_growth_rate))
        .route(
            "/new-customers-over-time",
            get(routes::metrics::new_customers_over_time),
        )
        .route("/repeat-customers", get(routes::metrics::repeat_customers))
        .route(
            "/geographical-distribution",
            get(routes::metrics::geographical_distribution),
        )
        .route(
            "/customer-lifetime-value",
            get(routes::metrics::customer_lifetime_value),
        );

    let app = Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3002".to_string());
    let addr = format!("0.0.0.0:{port}");
    info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
