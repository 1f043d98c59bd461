/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// The async metrics engine. Dispatches blocking DuckDB work to a
    /// thread pool and enforces the per-call deadline.
    pub metrics: shopmetrics::AsyncShopMetrics,
}
