use thiserror::Error;

/// Engine-level error type.
///
/// Only `Configuration` is fatal, and only when building a custom registry. The other
/// variants are surfaced inside a report rather than aborting a run.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Similarity provider unavailable: {0}")]
    ProviderUnavailable(#[from] ProviderError),

    #[error("Parameter {code} failed: {message}")]
    Parameter { code: String, message: String },

    #[error("Registry configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScoringError {
    pub fn parameter(code: &str, message: impl Into<String>) -> Self {
        ScoringError::Parameter {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised by a model-backed similarity backend.
/// Never escape the provider: every one of them degrades to the lexical fallback.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Timed out after {0}ms")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Backend returned {got} embeddings for {expected} inputs")]
    EmptyEmbedding { expected: usize, got: usize },

    #[error("Model load failed recently; cooling down for {remaining_secs}s")]
    CoolingDown { remaining_secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_message_carries_code() {
        let err = ScoringError::parameter("P2.1", "bullet list unavailable");
        assert_eq!(
            err.to_string(),
            "Parameter P2.1 failed: bullet list unavailable"
        );
    }

    #[test]
    fn test_provider_error_converts_to_scoring_error() {
        let err: ScoringError = ProviderError::Timeout(250).into();
        assert!(matches!(err, ScoringError::ProviderUnavailable(_)));
        assert!(err.to_string().contains("250ms"));
    }
}
