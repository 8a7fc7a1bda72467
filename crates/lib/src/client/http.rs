//! HTTP implementation of [`ModelClient`] using reqwest.

use async_trait::async_trait;
use tracing::debug;

use super::{FetchError, ModelClient};
use crate::model::Model;

/// Fetches models over HTTP from `<api host><model path>`.
///
/// Without an API host the model path is requested as given, so it must then
/// be an absolute URL.
#[derive(Debug, Clone, Default)]
pub struct HttpModelClient {
    client: reqwest::Client,
    api_host: Option<String>,
}

impl HttpModelClient {
    /// Create a client for the given API host (for example
    /// `http://localhost:4502`).
    pub fn new(api_host: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_host)
    }

    /// Create a client reusing an existing reqwest client.
    pub fn with_client(client: reqwest::Client, api_host: Option<String>) -> Self {
        Self {
            client,
            api_host: api_host.filter(|host| !host.is_empty()),
        }
    }

    fn url(&self, model_path: &str) -> String {
        format!("{}{}", self.api_host.as_deref().unwrap_or_default(), model_path)
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn fetch(&self, model_path: &str) -> Result<Model, FetchError> {
        if model_path.is_empty() {
            return Err(FetchError::InvalidPath);
        }

        let url = self.url(model_path);
        debug!(url, "Fetching model");

        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Transport {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            url,
            reason: e.to_string(),
        })
    }

    fn api_host(&self) -> Option<&str> {
        self.api_host.as_deref()
    }
}
