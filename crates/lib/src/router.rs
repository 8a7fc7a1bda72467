//! Route driven model loading.
//!
//! When the application navigates, [`ModelRouter::route_model`] derives the
//! model path from the new URL and asks the manager for it, so the page model
//! of the next route is available before it renders. Routes matching one of
//! the configured filters are left alone.

use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::manager::{DataRequest, ModelManager, PageModelEvent};
use crate::model::Model;

/// Errors raised while configuring the router.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route filter is not a valid regular expression
    #[error("Invalid route filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: regex::Error,
    },
}

impl RouterError {
    /// Check if a route filter failed to compile.
    pub fn is_invalid_filter(&self) -> bool {
        matches!(self, RouterError::InvalidFilter { .. })
    }
}

// Conversion from RouterError to the main Error type
impl From<RouterError> for crate::Error {
    fn from(err: RouterError) -> Self {
        crate::Error::Router(err)
    }
}

/// How the router derives model paths from URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum RouterMode {
    /// Routing never loads models
    #[serde(rename = "disabled")]
    Disabled,
    /// The model path is the content path section of the URL
    #[default]
    #[serde(rename = "path")]
    ContentPath,
}

/// Router settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouterConfig {
    pub mode: RouterMode,
    /// Regular expressions of routes that must not load a model
    pub route_filters: Vec<String>,
}

impl RouterConfig {
    /// Parses a comma separated filter list as advertised by hosting pages.
    ///
    /// ```
    /// # use pagemodel::RouterConfig;
    /// let config = RouterConfig::default().with_filter_list("^/admin, /preview$");
    /// assert_eq!(config.route_filters, vec!["^/admin", "/preview$"]);
    /// ```
    pub fn with_filter_list(mut self, filters: &str) -> Self {
        self.route_filters = filters
            .split(',')
            .map(str::trim)
            .filter(|filter| !filter.is_empty())
            .map(str::to_string)
            .collect();
        self
    }
}

/// Returns the model path of a URL: everything before the query, fragment,
/// or first `.` (selectors and extension), whichever comes first.
///
/// ```
/// # use pagemodel::router::model_path;
/// assert_eq!(model_path("/content/site/en.model.json"), "/content/site/en");
/// assert_eq!(model_path("/zyx/abc?date=03.10.2021"), "/zyx/abc");
/// ```
pub fn model_path(url: &str) -> &str {
    let end = url.find(['.', '?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Loads the model of navigated routes through a [`ModelManager`].
#[derive(Debug)]
pub struct ModelRouter {
    manager: Arc<ModelManager>,
    mode: RouterMode,
    filters: Vec<Regex>,
}

impl ModelRouter {
    /// Create a router, compiling the route filters.
    pub fn new(manager: Arc<ModelManager>, config: RouterConfig) -> Result<Self, RouterError> {
        let filters = config
            .route_filters
            .iter()
            .map(|filter| {
                Regex::new(filter).map_err(|source| RouterError::InvalidFilter {
                    filter: filter.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            manager,
            mode: config.mode,
            filters,
        })
    }

    /// Check if routing loads models at all.
    pub fn is_enabled(&self) -> bool {
        self.mode != RouterMode::Disabled
    }

    /// Check if any route filter matches `route`.
    pub fn is_route_excluded(&self, route: &str) -> bool {
        self.filters.iter().any(|filter| filter.is_match(route))
    }

    /// Loads the model for a navigation to `url`.
    ///
    /// Returns `None` without loading when routing is disabled, for the empty
    /// and `/` paths, and for excluded routes. Otherwise the model is
    /// obtained from the manager (from the store when present) and
    /// [`PageModelEvent::RouteChanged`] is emitted.
    pub async fn route_model(&self, url: &str) -> crate::Result<Option<Model>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let path = model_path(url);

        if path.is_empty() || path == "/" || self.is_route_excluded(path) {
            debug!(path, "Route does not load a model");
            return Ok(None);
        }

        let model = self.manager.get_data(DataRequest::new(path)).await?;
        self.manager.emit(PageModelEvent::RouteChanged {
            model: model.clone(),
        });

        Ok(Some(model))
    }
}
