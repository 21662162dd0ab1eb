//! Error types for the event broker.

use thiserror::Error;

/// Main error type for broker operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("category must not be empty")]
    EmptyCategory,

    #[error("subject id must be positive")]
    InvalidSubjectId,

    #[error("subject name must not be empty")]
    EmptySubjectName,

    #[error("attribute key must not be empty")]
    EmptyAttributeKey,
}

/// Result type for broker operations.
pub type Result<T> = std::result::Result<T, BrokerError>;
