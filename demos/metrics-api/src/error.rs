use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// Error type that renders as a JSON `{"message": "..."}` response
/// with an appropriate HTTP status code.
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<shopmetrics::MetricsError> for AppError {
    fn from(e: shopmetrics::MetricsError) -> Self {
        tracing::error!(error = %e, "metrics call failed");
        if e.is_store_unavailable() {
            AppError::service_unavailable(e.to_string())
        } else {
            AppError::internal(e.to_string())
        }
    }
}
