//! Configuration of the model manager and its data requests.

use serde::Deserialize;

use crate::model::Model;
use crate::path;

/// Initialization settings of a [`super::ModelManager`].
///
/// The root model URL is taken from `path`, then `page_model_root_url`, then
/// the sanitized `current_path`. Field names follow the camelCase keys used by
/// page embeddings:
///
/// ```
/// # use pagemodel::ModelManagerConfig;
/// let config: ModelManagerConfig = serde_json::from_str(
///     r#"{ "pageModelRootUrl": "/content/site/en.model.json", "currentPath": "/content/site/en/about.html" }"#,
/// )?;
/// assert_eq!(config.root_model_url().as_deref(), Some("/content/site/en.model.json"));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelManagerConfig {
    /// Explicit URL or path of the root model
    pub path: Option<String>,
    /// Root model URL advertised by the hosting page
    pub page_model_root_url: Option<String>,
    /// Location currently displayed by the application
    pub current_path: Option<String>,
    /// Prefix the application is deployed under (`/app`), empty if none
    pub context_path: String,
    /// Initial model; when non-empty the root model is not fetched
    pub model: Option<Model>,
}

impl ModelManagerConfig {
    /// Create a configuration for an explicit root model path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Set the initial model.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the current location.
    pub fn with_current_path(mut self, current_path: impl Into<String>) -> Self {
        self.current_path = Some(current_path.into());
        self
    }

    /// Set the context path.
    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    /// Resolves the URL of the root model.
    pub fn root_model_url(&self) -> Option<String> {
        let explicit = self.path.clone().filter(|p| !p.is_empty());
        let advertised = self
            .page_model_root_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| path::internalize(url, &self.context_path));

        explicit
            .or(advertised)
            .or_else(|| self.sanitized_current_path())
    }

    /// The current location reduced to a page path.
    pub fn sanitized_current_path(&self) -> Option<String> {
        self.current_path
            .as_deref()
            .and_then(|current| path::sanitize(current, &self.context_path))
            .filter(|sanitized| !sanitized.is_empty())
    }
}

impl From<&str> for ModelManagerConfig {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ModelManagerConfig {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

/// A request for the model at a path.
///
/// An empty path designates the whole tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataRequest {
    /// Path of the requested model
    pub path: String,
    /// Fetch even if the store already holds the path
    pub force_reload: bool,
}

impl DataRequest {
    /// Request the model at `path`, served from the store when present.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            force_reload: false,
        }
    }

    /// Request the model at `path`, always fetching it.
    pub fn reload(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            force_reload: true,
        }
    }
}

impl From<&str> for DataRequest {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for DataRequest {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}
