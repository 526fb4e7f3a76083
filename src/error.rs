use thiserror::Error;

/// Failure taxonomy for the dataset service. Every request-level fault maps
/// to exactly one of these at the HTTP boundary; nothing here aborts the
/// process.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The configured source file does not exist.
    #[error("CSV file not found")]
    NotFound,

    /// Structurally invalid input, with a row-level diagnostic.
    #[error("CSV parsing failed: {0}")]
    Parse(String),

    /// The outgoing payload could not be serialized.
    #[error("response serialization failed: {0}")]
    Serialization(String),

    /// Anything else unexpected.
    #[error("internal server error: {0}")]
    Internal(String),
}
