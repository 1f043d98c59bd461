#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl MetricsError {
    /// Whether the failure came from the record store rather than the caller.
    ///
    /// Query failures, unreadable export files and exceeded deadlines all
    /// land here; callers may retry these.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            MetricsError::DuckDb(_) | MetricsError::Io(_) | MetricsError::StoreUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MetricsError>;
