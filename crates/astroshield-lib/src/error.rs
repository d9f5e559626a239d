use thiserror::Error;

use crate::schema::ValidationFailure;

/// Convenient result alias for the AstroShield library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Client-supplied payload violated one or more schema rules.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// A verification, encryption or analysis provider failed.
    #[error("{provider} provider failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// A handler produced a record that violates its own response schema.
    #[error("{endpoint} response failed schema validation: {failure}")]
    InvalidResponse {
        endpoint: &'static str,
        failure: ValidationFailure,
    },

    /// Wrapper for JSON serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a provider failure.
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }

    /// Coarse failure class used in log events: `validation` or `internal`.
    pub fn failure_class(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            _ => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Violation;

    #[test]
    fn test_validation_error_display() {
        let err: Error = ValidationFailure::single(Violation::min_length("value", 1)).into();
        assert_eq!(err.to_string(), "validation failed: value: min length 1");
        assert_eq!(err.failure_class(), "validation");
    }

    #[test]
    fn test_provider_error_is_internal() {
        let err = Error::provider("encryptor", "backend unreachable");
        assert_eq!(err.to_string(), "encryptor provider failed: backend unreachable");
        assert_eq!(err.failure_class(), "internal");
    }
}
