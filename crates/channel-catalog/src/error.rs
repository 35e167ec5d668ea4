//! Error types for the catalog.

use thiserror::Error;

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in catalog operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Entity id absent from the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rating outside [0, 10] or not a finite number
    #[error("Invalid rating: {0}")]
    InvalidRating(String),

    /// Channel would hold both contents and subchannels, or neither
    #[error("Structural violation: {0}")]
    StructuralViolation(String),

    /// Subchannel graph would become (or already is) cyclic
    #[error("Cycle detected: channel {child} already reaches channel {parent}")]
    CycleDetected { parent: u64, child: u64 },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Delimited-text export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn content_not_found(id: u64) -> Self {
        Error::NotFound(format!("content {}", id))
    }

    pub(crate) fn channel_not_found(id: u64) -> Self {
        Error::NotFound(format!("channel {}", id))
    }

    pub(crate) fn group_not_found(id: u64) -> Self {
        Error::NotFound(format!("group {}", id))
    }

    /// Stable machine-readable name of the error condition.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::InvalidRating(_) => "invalid_rating",
            Error::StructuralViolation(_) => "structural_violation",
            Error::CycleDetected { .. } => "cycle_detected",
            Error::InvalidInput(_) => "invalid_input",
            Error::Config(_) => "config",
            Error::Storage(_) => "storage",
            Error::Serialization(_) => "serialization",
            Error::Csv(_) => "csv",
            Error::Io(_) => "io",
        }
    }

    /// Whether this error rejects the caller's input, as opposed to a
    /// failure of the node itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidRating(_)
                | Error::StructuralViolation(_)
                | Error::CycleDetected { .. }
                | Error::InvalidInput(_)
        )
    }
}

impl From<rocksdb::Error> for Error {
    fn from(e: rocksdb::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
