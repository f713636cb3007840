//! # Web Trigger Error Types
//!
//! HTTP mapping for failures surfaced by the trigger endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error::DispatchError;

/// Trigger endpoint errors with HTTP status code mappings
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("Lifecycle batch failed: {message}")]
    LifecycleFailed { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::MalformedPayload { .. } => ApiError::MalformedPayload {
                message: error.to_string(),
            },
            DispatchError::LifecycleCall { .. } => ApiError::LifecycleFailed {
                message: error.to_string(),
            },
        }
    }
}

/// Unparseable request bodies
impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::bad_request(format!("request body is not a scheduled event: {error}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_code, message) = match &self {
            ApiError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message.as_str())
            }

            ApiError::MalformedPayload { message } => {
                (StatusCode::BAD_REQUEST, "MALFORMED_PAYLOAD", message.as_str())
            }

            // Upstream provider failure
            ApiError::LifecycleFailed { message } => (
                StatusCode::BAD_GATEWAY,
                "LIFECYCLE_CALL_FAILED",
                message.as_str(),
            ),

            ApiError::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                message.as_str(),
            ),
        };

        let error_response = json!({
            "error": {
                "code": error_code,
                "message": message
            }
        });

        (status_code, Json(error_response)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
