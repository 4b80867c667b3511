//! Error handling module
//!
//! Provides unified error types and handling for the HTTP surface.

use crate::estimator::EstimatorError;
use crate::profiling::ProfilingError;
use crate::semantic::OverrideError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Estimator(#[from] EstimatorError),

    #[error(transparent)]
    Profiling(#[from] ProfilingError),

    #[error(transparent)]
    Override(#[from] OverrideError),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
                None,
            ),
            AppError::Estimator(e) => {
                let (status, code) = match e {
                    EstimatorError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "ESTIMATOR_TIMEOUT"),
                    EstimatorError::Unavailable(_) => (StatusCode::BAD_GATEWAY, "ESTIMATOR_UNAVAILABLE"),
                    EstimatorError::MalformedResponse(_) => {
                        (StatusCode::BAD_GATEWAY, "ESTIMATOR_MALFORMED_RESPONSE")
                    }
                };
                error!("Estimator error: {}", e);
                (
                    status,
                    code,
                    "Semantic estimation failed".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Profiling(e) => (
                StatusCode::BAD_REQUEST,
                "INVALID_PROFILING_SIGNALS",
                e.to_string(),
                None,
            ),
            AppError::Override(e) => (
                StatusCode::BAD_REQUEST,
                "INVALID_OVERRIDE",
                e.to_string(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: details,
            code: Some(error_code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

/// Helper function to create a not found error
pub fn not_found_error(msg: impl Into<String>) -> AppError {
    AppError::NotFound(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimator_errors_map_to_gateway_statuses() {
        let timeout = AppError::from(EstimatorError::Timeout(100)).into_response();
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let down = AppError::from(EstimatorError::Unavailable("503".to_string())).into_response();
        assert_eq!(down.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_client_errors() {
        assert_eq!(
            not_found_error("batch").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(OverrideError::ScoreOutOfRange(2.0)).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
