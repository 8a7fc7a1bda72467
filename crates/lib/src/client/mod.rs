//! Fetch transport for page model fragments.
//!
//! The [`ModelClient`] trait is the seam between the orchestrator and the
//! network. [`HttpModelClient`] is the production implementation; tests and
//! embedders can plug in their own.

mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::Model;

pub use http::HttpModelClient;

/// Loads model fragments by model path.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Fetches the model at `model_path` (for example
    /// `/content/site/en.model.json`).
    async fn fetch(&self, model_path: &str) -> Result<Model, FetchError>;

    /// Host prefixed to every model path, if any.
    fn api_host(&self) -> Option<&str> {
        None
    }
}

/// Errors raised while fetching a model.
///
/// The error is `Clone` so a single failed fetch can be handed to every
/// caller that was waiting on it.
#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The fetch was requested without a model path
    #[error("Fetching model rejected for empty path")]
    InvalidPath,

    /// The server answered with a non-success status
    #[error("Fetching model from {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The request could not be completed
    #[error("Failed to fetch model from {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The response body is not a valid model
    #[error("Failed to decode model from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The fetch this caller was waiting on went away before settling
    #[error("Fetch of {path} was cancelled")]
    Cancelled { path: String },
}

impl FetchError {
    /// Check if the server reported the model as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }

    /// Check if this is a transport level failure.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }

    /// Check if the response could not be decoded.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, FetchError::Decode { .. })
    }

    /// Get the HTTP status if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Conversion from FetchError to the main Error type
impl From<FetchError> for crate::Error {
    fn from(err: FetchError) -> Self {
        crate::Error::Fetch(err)
    }
}
