use thiserror::Error;

/// Factory-wide error type
#[derive(Error, Debug)]
pub enum FactoryError {
    /// The requested format was never advertised by `supported_formats()`.
    /// Callers negotiate against that list first, so this indicates a caller bug.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Encoder creation failed [{backend}]: {reason}")]
    EncoderCreation { backend: String, reason: String },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FactoryError {
    /// Shorthand for an `EncoderCreation` error
    pub fn creation(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        FactoryError::EncoderCreation {
            backend: backend.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, FactoryError>;
