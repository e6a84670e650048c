//! Error types for the adaptive learning engine
//!
//! Validation failures are raised before any state is touched, so callers can
//! correct their input and retry. Numeric invariant breaches are not errors:
//! they abort, because a corrupted Q-value would poison every later decision.

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed context, decision or outcome fields
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Action selection or prediction asked to choose among nothing
    #[error("No candidate actions supplied")]
    EmptyActionSet,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A lock was poisoned by a panicking writer
    #[error("Engine state lock poisoned: {0}")]
    LockPoisoned(String),

    /// Unknown event name
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("Engine error: {0}")]
    Generic(String),
}

impl EngineError {
    /// Build a validation error for a named field
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// True for errors the caller can fix by correcting input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Validation { .. } | EngineError::EmptyActionSet | EngineError::UnknownEvent(_)
        )
    }
}

impl<T> From<std::sync::PoisonError<T>> for EngineError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        EngineError::LockPoisoned(err.to_string())
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Convert anyhow errors to EngineError
impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        EngineError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = EngineError::validation("complexity", "must be within 1..=10, got 11");
        assert!(err.to_string().contains("complexity"));
        assert!(err.to_string().contains("11"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_poison_and_config_are_not_recoverable() {
        let err = EngineError::ConfigError("learning_rate must be in (0, 1]".to_string());
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("learning_rate"));

        let err = EngineError::LockPoisoned("state".to_string());
        assert!(!err.is_recoverable());
    }
}
