//! Error types for the model manager.

use thiserror::Error;

/// Errors that can occur while orchestrating the page model.
///
/// Both variants signal a misuse of the manager rather than a runtime
/// condition: callers must initialize with a resolvable root path first.
#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum ManagerError {
    /// The manager was used before `initialize` succeeded.
    #[error("Model store is undefined. Call initialize first")]
    NotInitialized,

    /// No root model path could be resolved from the configuration.
    #[error("No root model path resolved from '{url}'")]
    NoRootPath {
        /// The root model URL the path was derived from, possibly empty
        url: String,
    },
}

impl ManagerError {
    /// Check if this error is a misuse of the manager.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ManagerError::NotInitialized | ManagerError::NoRootPath { .. }
        )
    }

    /// Check if the manager was not initialized.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, ManagerError::NotInitialized)
    }
}

// Conversion from ManagerError to the main Error type
impl From<ManagerError> for crate::Error {
    fn from(err: ManagerError) -> Self {
        crate::Error::Manager(err)
    }
}
