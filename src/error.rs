//! # Dispatch Error Types
//!
//! Top-level error taxonomy for a single handler invocation. Every variant here
//! is surfaced through the completion signal; unknown commands are not, see
//! [`UnknownCommandError`].

use thiserror::Error;

use crate::request::LifecycleCommand;

/// Errors that fail an invocation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// Event data was not base64 or did not decode into a lifecycle request
    #[error("Malformed payload: {reason}")]
    MalformedPayload { reason: String },

    /// A start/stop call or its operation wait failed; the whole batch fails
    #[error("Lifecycle call failed: could not {command} instance(s): {reason}")]
    LifecycleCall {
        command: LifecycleCommand,
        reason: String,
    },
}

impl DispatchError {
    pub fn malformed_payload(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    pub fn lifecycle_call(command: LifecycleCommand, reason: impl Into<String>) -> Self {
        Self::LifecycleCall {
            command,
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, used in structured logs and HTTP bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedPayload { .. } => "malformed_payload",
            Self::LifecycleCall { .. } => "lifecycle_call",
        }
    }
}

/// A `command` value outside the closed set of lifecycle verbs.
///
/// Non-fatal: the dispatcher logs it at warn level and completes successfully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown command: {command:?}")]
pub struct UnknownCommandError {
    pub command: String,
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_call_message_does_not_itemize() {
        let err = DispatchError::lifecycle_call(LifecycleCommand::Stop, "operation failed");
        assert_eq!(
            err.to_string(),
            "Lifecycle call failed: could not stop instance(s): operation failed"
        );
        assert_eq!(err.kind(), "lifecycle_call");
    }

    #[test]
    fn test_unknown_command_display() {
        let err = UnknownCommandError {
            command: "reboot".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown command: \"reboot\"");
    }
}
