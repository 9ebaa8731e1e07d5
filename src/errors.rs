//! Error types for the wait command layer

use settle_wait_conditions::SerializationError;
use thiserror::Error;

/// Errors surfaced to the driver when a wait command fails
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    /// The condition payload could not be decoded
    #[error("Condition decode failed: {0}")]
    Serialization(#[from] SerializationError),

    /// The command envelope is malformed or names an unknown command
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// The condition did not hold before the deadline
    #[error("Condition {condition} not met after {timeout_ms}ms")]
    Timeout { condition: String, timeout_ms: u64 },

    /// The payload is not a JSON string map
    #[error("JSON error: {0}")]
    Json(String),
}

impl DriverError {
    /// Check if the command can be retried as-is
    pub fn is_retryable(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            DriverError::Serialization(_) | DriverError::InvalidCommand(_) => 2,
            DriverError::Json(_) => 2,
            DriverError::Timeout { .. } => 1,
        }
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(err: serde_json::Error) -> Self {
        DriverError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retryable() {
        let err = DriverError::Timeout {
            condition: "NoPendingFrameCondition".into(),
            timeout_ms: 250,
        };
        assert!(err.is_retryable());
        assert_eq!(err.severity(), 1);
        assert_eq!(
            err.to_string(),
            "Condition NoPendingFrameCondition not met after 250ms"
        );
    }

    #[test]
    fn test_decode_errors_are_not_retryable() {
        let err = DriverError::from(SerializationError::new("Unsupported wait condition Bogus"));
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), 2);
        assert!(err.to_string().contains("Bogus"));
    }
}
