//! Error types for language-model adapters.

use thiserror::Error;

/// Errors that can occur during a model completion call.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Configuration error (missing key, bad URL, etc.)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The call exceeded its configured timeout.
    #[error("model call timed out after {0} seconds")]
    Timeout(u64),

    /// The API returned an error or an unparseable body.
    #[error("completion failed: {0}")]
    CompletionFailed(String),

    /// The API returned a structurally valid but empty completion.
    #[error("empty completion")]
    Empty,
}

impl ModelError {
    /// Whether the failure is transient and worth retrying later.
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::Network(_) | ModelError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ModelError::Network("reset".into()).is_transient());
        assert!(ModelError::Timeout(30).is_transient());
        assert!(!ModelError::Configuration("no key".into()).is_transient());
        assert!(!ModelError::Empty.is_transient());
    }

    #[test]
    fn test_display() {
        let err = ModelError::Timeout(30);
        assert_eq!(err.to_string(), "model call timed out after 30 seconds");
    }
}
