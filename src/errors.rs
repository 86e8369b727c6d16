use crate::features::ValidationError;
use crate::scoring::InferenceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// One or more request fields failed validation; each entry names its field.
    Validation(Vec<String>),
    /// Malformed request (not field-level, e.g. a non-object body).
    BadRequest(String),
    /// Preprocessing or classifier call failed on well-formed input.
    ModelInference(InferenceError),
    /// Artifacts are not loaded; predictions are refused until restart.
    ServiceUnavailable(String),
    /// Internal server error.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(issues) => write!(f, "Validation failed: {}", issues.join("; ")),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ModelInference(e) => write!(f, "Model inference error: {}", e),
            AppError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each variant to a status code and an `{"error": ...}` body.
    /// Validation detail goes back to the caller verbatim; inference detail
    /// is logged and only the failed stage is reported.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(issues) => {
                tracing::info!("Request validation failed: {}", issues.join("; "));
                (StatusCode::BAD_REQUEST, issues.join("; "))
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ModelInference(e) => {
                tracing::error!(stage = e.stage.as_str(), error = %e.message, "Model inference failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Model inference failed during {}", e.stage.as_str()),
                )
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Prediction refused, service degraded: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ValidationError> for AppError {
    /// Converts a normalizer `ValidationError` into an `AppError`.
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.issues)
    }
}

impl From<InferenceError> for AppError {
    /// Converts an `InferenceError` into an `AppError`.
    fn from(err: InferenceError) -> Self {
        AppError::ModelInference(err)
    }
}
