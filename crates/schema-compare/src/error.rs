//! Error types for schema-compare

use thiserror::Error;

/// Result type for schema-compare operations.
pub type CompareResult<T> = Result<T, CompareError>;

/// Error type for schema-compare operations.
///
/// Schema differences are never errors: they are reported as
/// [`CompareLog`](crate::CompareLog) records. These variants cover a setup
/// that cannot be compared at all.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The caller's configuration is wrong (unknown table to ignore, invalid ignore rule, ...).
    #[error("Configuration error: {0}")]
    Config(String),
    /// No physical model factory is registered for the requested engine.
    #[error("Unsupported database engine: {0}")]
    UnsupportedEngine(String),
    /// A suppression line could not be decoded.
    #[error("Cannot decode '{line}': {message}")]
    Parse { line: String, message: String },
    /// The logical model is internally inconsistent.
    #[error("Invariant violated: {0}")]
    Invariant(String),
    /// Error reported by a physical model factory.
    #[error("Provider error: {0}")]
    Provider(String),
    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// IO or other error.
    #[error("{0}")]
    Other(String),
}

impl CompareError {
    /// Create a parse error for a suppression line.
    pub fn parse(line: impl Into<String>, message: impl Into<String>) -> Self {
        CompareError::Parse {
            line: line.into(),
            message: message.into(),
        }
    }

    /// Create an invariant error.
    pub fn invariant(message: impl Into<String>) -> Self {
        CompareError::Invariant(message.into())
    }
}
