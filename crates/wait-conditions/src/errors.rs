//! Error types for condition decoding

use thiserror::Error;

/// Raised when a serialized condition cannot be decoded.
#[derive(Debug, Error, Clone, Default, PartialEq, Eq)]
#[error("SerializationError: {}", describe(.message))]
pub struct SerializationError {
    message: Option<String>,
}

fn describe(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("<no message>")
}

impl SerializationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("invalid condition JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_message() {
        let err = SerializationError::new("Unsupported wait condition Bogus");
        assert_eq!(
            err.to_string(),
            "SerializationError: Unsupported wait condition Bogus"
        );
        assert_eq!(err.message(), Some("Unsupported wait condition Bogus"));
    }

    #[test]
    fn test_display_without_message() {
        let err = SerializationError::default();
        assert_eq!(err.message(), None);
        assert_eq!(err.to_string(), "SerializationError: <no message>");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SerializationError::from(json_err);
        assert!(err.message().unwrap().starts_with("invalid condition JSON"));
    }
}
