//! Error types for model store operations.
//!
//! Lookups in the store never fail: a path that resolves to nothing yields
//! `None`. The errors here signal broken store configuration, which is a
//! programming error rather than a runtime condition.

use thiserror::Error;

/// Structured error types for model store construction.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store was configured without any page content delimiter
    #[error("Model store requires at least one page content delimiter")]
    MissingDelimiters,

    /// A configured page content delimiter is unusable
    #[error("Invalid page content delimiter '{delimiter}': {reason}")]
    InvalidDelimiter { delimiter: String, reason: String },
}

impl StoreError {
    /// Check if this error is an invariant violation of the store configuration
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            StoreError::MissingDelimiters | StoreError::InvalidDelimiter { .. }
        )
    }

    /// Get the offending delimiter if this is a delimiter error
    pub fn delimiter(&self) -> Option<&str> {
        match self {
            StoreError::InvalidDelimiter { delimiter, .. } => Some(delimiter),
            _ => None,
        }
    }
}

// Conversion from StoreError to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
