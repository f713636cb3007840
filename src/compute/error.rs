//! # Compute Provider Error Types

use thiserror::Error;

/// Failures talking to the compute provider or resolving its operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("HTTP request failed: {operation}: {message}")]
    Http { operation: String, message: String },

    #[error("Compute API returned {status} for {operation}: {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("Operation {operation} failed: {message}")]
    OperationFailed { operation: String, message: String },

    #[error("Invalid response for {operation}: {message}")]
    InvalidResponse { operation: String, message: String },

    #[error("Invalid {field} {value:?}: {reason}")]
    InvalidTarget {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Credentials unavailable: {message}")]
    Credentials { message: String },
}

impl ComputeError {
    pub fn http(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::Http {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn api(operation: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    pub fn operation_failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidResponse {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_target(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidTarget {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }
}

pub type ComputeResult<T> = std::result::Result<T, ComputeError>;
