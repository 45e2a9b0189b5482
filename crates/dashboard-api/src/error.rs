//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::aggregation::AggregationError;
use crate::settings::SettingsError;

/// Errors returned to HTTP callers as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required provider configuration is missing
    #[error("{0}")]
    Configuration(String),

    /// Request parameters are missing or invalid
    #[error("{0}")]
    BadRequest(String),

    /// Provider request failed for a point lookup
    #[error("Failed to fetch weather")]
    Upstream,

    /// Aggregation task did not complete
    #[error("Internal error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Configuration(_) | ApiError::Internal(_) | ApiError::Upstream => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<AggregationError> for ApiError {
    fn from(err: AggregationError) -> Self {
        match err {
            AggregationError::MissingApiKey => ApiError::Configuration(err.to_string()),
            AggregationError::Provider(e) => {
                warn!("Point weather request failed: {}", e);
                ApiError::Upstream
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(detail) => error!("Request failed: {}", detail),
            ApiError::Configuration(detail) => error!("Configuration error: {}", detail),
            _ => {}
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors while starting the server
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Provider client error: {0}")]
    Provider(#[from] weather_provider::ProviderError),

    #[error("Boundary source error: {0}")]
    Boundary(#[from] boundary::BoundaryError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] fetch_scheduler::SchedulerError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_provider::ProviderError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Configuration("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_provider_failure_maps_to_upstream() {
        let err: ApiError = AggregationError::Provider(ProviderError::Status { status: 503 }).into();
        assert!(matches!(err, ApiError::Upstream));
        assert_eq!(err.to_string(), "Failed to fetch weather");

        let err: ApiError = AggregationError::MissingApiKey.into();
        assert_eq!(err.to_string(), "API Key not configured");
    }
}
