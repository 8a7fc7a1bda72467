//! Orchestration of the page model: initialization, fetching, storing and
//! change notification.
//!
//! The [`ModelManager`] owns one [`ModelStore`], one [`ListenerRegistry`]
//! and the registry of fetches in progress. Every method takes `&self`, so a
//! manager is typically shared as an `Arc<ModelManager>` between the
//! application, the [`crate::EditorClient`] and the [`crate::ModelRouter`].
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use pagemodel::{DataRequest, ModelManager, ModelManagerConfig};
//!
//! # async fn example() -> pagemodel::Result<()> {
//! let manager = ModelManager::http(Some("http://localhost:4502".to_string()));
//!
//! let config = ModelManagerConfig::new("/content/site/en")
//!     .with_current_path("/content/site/en/about.html");
//! let tree = manager.initialize(config).await?;
//! println!("root page: {:?}", tree.path);
//!
//! manager.add_listener(
//!     "/content/site/en/about",
//!     Arc::new(|key: &str| -> pagemodel::Result<()> {
//!         println!("{key} changed");
//!         Ok(())
//!     }),
//! );
//!
//! let fresh = manager
//!     .get_data(DataRequest::reload("/content/site/en/about"))
//!     .await?;
//! # let _ = fresh;
//! # Ok(())
//! # }
//! ```

mod config;
mod errors;
mod inflight;

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tracing::{Instrument, debug, debug_span, info, warn};

pub use config::{DataRequest, ModelManagerConfig};
pub use errors::ManagerError;

use crate::Result;
use crate::client::{FetchError, HttpModelClient, ModelClient};
use crate::listeners::{Listener, ListenerId, ListenerRegistry};
use crate::model::Model;
use crate::path;
use crate::store::ModelStore;
use inflight::{InFlight, Role};

/// Capacity of the page model event channel.
const EVENT_CAPACITY: usize = 64;

/// Notifications about the page model, delivered to every subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum PageModelEvent {
    /// The tree was (re)loaded or edited; carries a copy of the whole tree.
    Loaded { model: Model },
    /// The router loaded the model of a new route.
    RouteChanged { model: Model },
}

#[derive(Debug, Default)]
struct ManagerState {
    store: Option<ModelStore>,
    context_path: String,
}

/// Orchestrates the page model store, its listeners and its fetches.
pub struct ModelManager {
    client: Arc<dyn ModelClient>,
    state: RwLock<ManagerState>,
    listeners: ListenerRegistry,
    inflight: InFlight,
    events: broadcast::Sender<PageModelEvent>,
}

impl ModelManager {
    /// Create a manager fetching models through `client`.
    ///
    /// The manager is unusable until [`Self::initialize`] succeeded.
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            state: RwLock::new(ManagerState::default()),
            listeners: ListenerRegistry::new(),
            inflight: InFlight::new(),
            events,
        }
    }

    /// Create a manager fetching models over HTTP from `api_host`.
    pub fn http(api_host: Option<String>) -> Self {
        Self::new(Arc::new(HttpModelClient::new(api_host)))
    }

    /// The fetch transport in use.
    pub fn client(&self) -> &Arc<dyn ModelClient> {
        &self.client
    }

    /// Initializes the manager and loads the root model.
    ///
    /// Any previous store, listener and fetch in progress is discarded. The
    /// root path is the sanitized root model URL (see
    /// [`ModelManagerConfig::root_model_url`]). A non-empty initial model is
    /// used as-is; otherwise the root model is fetched. When the current path
    /// names a page that is neither the root nor one of its `:children`, that
    /// page is fetched and inserted as well.
    ///
    /// Returns a copy of the whole tree and emits [`PageModelEvent::Loaded`].
    pub async fn initialize(&self, config: impl Into<ModelManagerConfig>) -> Result<Model> {
        let config = config.into();
        self.destroy();

        let root_model_url = config.root_model_url().unwrap_or_default();
        let root_path = path::sanitize(&root_model_url, &config.context_path)
            .filter(|root| !root.is_empty())
            .ok_or_else(|| ManagerError::NoRootPath {
                url: root_model_url.clone(),
            })?;

        let initial = config.model.clone().filter(|model| !model.is_empty());
        let has_initial = initial.is_some();

        {
            let mut state = self.state.write().unwrap();
            state.context_path = config.context_path.clone();
            state.store = Some(ModelStore::new(root_path.clone(), initial));
        }

        info!(root_path, "Model manager initialized");

        if has_initial {
            return self.emit_loaded();
        }

        let root_model = self
            .fetch_data(&root_path)
            .instrument(debug_span!("initialize", root_path))
            .await?;
        self.with_store_mut(|store| store.initialize(root_path.clone(), root_model))?;

        if let Some(current_page) = config.sanitized_current_path() {
            let is_known = self.with_store(|store| {
                current_page == root_path || store.data_map().has_child(&current_page)
            })?;

            if !is_known {
                let page = self.fetch_data(&current_page).await?;
                self.with_store_mut(|store| store.insert_data(&current_page, page, None, false))?;
            }
        }

        self.emit_loaded()
    }

    /// Root path of the loaded tree, `None` before initialization.
    pub fn root_path(&self) -> Option<String> {
        let state = self.state.read().unwrap();
        state.store.as_ref().map(|store| store.root_path().to_string())
    }

    /// Returns the model at the requested path.
    ///
    /// The model is served from the store unless the request forces a
    /// reload or the store does not hold the path, in which case it is
    /// fetched (at most once at a time per path), stored, and the listeners
    /// of the path are notified. An empty path designates the whole tree.
    pub async fn get_data(&self, request: impl Into<DataRequest>) -> Result<Model> {
        let DataRequest { path, force_reload } = request.into();

        let cached = self.with_store(|store| {
            let lookup = (!path.is_empty()).then_some(path.as_str());
            store.get_data(lookup)
        })?;

        if let (false, Some(model)) = (force_reload, cached) {
            return Ok(model);
        }

        let fetch_path = if path.is_empty() {
            self.root_path().ok_or(ManagerError::NotInitialized)?
        } else {
            path
        };

        let model = self.fetch_data(&fetch_path).await?;
        self.store_data(&fetch_path, model.clone())?;
        Ok(model)
    }

    /// Registers a listener for changes at `path`.
    ///
    /// The root page path (and the empty path) map to the root listener set.
    pub fn add_listener(&self, path: &str, listener: Arc<dyn Listener>) -> ListenerId {
        let key = self.adapt_page_path(path);
        debug!(key, "Adding listener");
        self.listeners.add(key, listener)
    }

    /// Removes a listener registered at `path`. Returns false if it was not
    /// registered there.
    pub fn remove_listener(&self, path: &str, id: ListenerId) -> bool {
        let key = self.adapt_page_path(path);
        self.listeners.remove(&key, id)
    }

    /// Invokes the listeners registered at exactly `path`.
    ///
    /// Returns the number of listeners that completed successfully.
    pub fn notify_listeners(&self, path: &str) -> usize {
        let key = self.adapt_page_path(path);
        self.listeners.notify(&key)
    }

    /// Subscribes to page model events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<PageModelEvent> {
        self.events.subscribe()
    }

    /// Runs `f` against the store.
    ///
    /// # Errors
    /// [`ManagerError::NotInitialized`] before initialization.
    pub fn with_store<R>(&self, f: impl FnOnce(&ModelStore) -> R) -> Result<R> {
        let state = self.state.read().unwrap();
        let store = state.store.as_ref().ok_or(ManagerError::NotInitialized)?;
        Ok(f(store))
    }

    pub(crate) fn with_store_mut<R>(&self, f: impl FnOnce(&mut ModelStore) -> R) -> Result<R> {
        let mut state = self.state.write().unwrap();
        let store = state.store.as_mut().ok_or(ManagerError::NotInitialized)?;
        Ok(f(store))
    }

    /// Number of fetches currently in progress.
    pub fn pending_fetches(&self) -> usize {
        self.inflight.len()
    }

    /// Emits [`PageModelEvent::Loaded`] with a copy of the whole tree and
    /// returns that copy.
    pub(crate) fn emit_loaded(&self) -> Result<Model> {
        let model = self.with_store(|store| store.data_map().clone())?;
        self.emit(PageModelEvent::Loaded {
            model: model.clone(),
        });
        Ok(model)
    }

    pub(crate) fn emit(&self, event: PageModelEvent) {
        // Sending only fails when nobody subscribed
        let _ = self.events.send(event);
    }

    /// Computes the listener key of a path.
    fn adapt_page_path(&self, path: &str) -> String {
        let state = self.state.read().unwrap();
        let root_path = state.store.as_ref().map(ModelStore::root_path);
        path::adapt_page_path(path, root_path, &state.context_path)
    }

    /// Fetches the model of `path`, joining a fetch already in progress.
    async fn fetch_data(&self, path: &str) -> std::result::Result<Model, FetchError> {
        match self.inflight.join(path) {
            Role::Follower(rx) => {
                debug!(path, "Joining fetch in progress");
                rx.await.unwrap_or_else(|_| {
                    Err(FetchError::Cancelled {
                        path: path.to_string(),
                    })
                })
            }
            Role::Leader(guard) => {
                let model_path = self.to_model_path(path);
                let result = self
                    .client
                    .fetch(&model_path)
                    .instrument(debug_span!("fetch_model", path, model_path))
                    .await;

                if let Err(e) = &result {
                    warn!(path, "Failed to fetch model: {e}");
                }

                guard.complete(&result);
                result
            }
        }
    }

    /// Stores a fetched fragment and notifies the affected listeners.
    ///
    /// The root page replaces the whole tree, any other page becomes a
    /// `:children` entry and items are inserted at their path. Page changes
    /// are reported to the root listeners as well.
    fn store_data(&self, path: &str, model: Model) -> Result<()> {
        let is_item = path::is_item(path);

        self.with_store_mut(|store| {
            let root_path = store.root_path().to_string();
            if !is_item && path::sanitize(path, "").as_deref() == Some(root_path.as_str()) {
                store.initialize(root_path, model);
            } else {
                store.insert_data(path, model, None, false);
            }
        })?;

        self.notify_listeners(path);

        if !is_item && !self.adapt_page_path(path).is_empty() {
            self.listeners.notify("");
        }

        Ok(())
    }

    fn to_model_path(&self, path: &str) -> String {
        let state = self.state.read().unwrap();
        path::model_url(path, &state.context_path)
    }

    /// Discards the store, every listener and every fetch in progress.
    fn destroy(&self) {
        let previous = self.state.write().unwrap().store.take();
        if let Some(store) = previous {
            store.destroy();
        }
        self.listeners.clear();
        self.inflight.clear();
    }
}

impl std::fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("root_path", &self.root_path())
            .field("listeners", &self.listeners)
            .field("pending_fetches", &self.inflight.len())
            .finish()
    }
}
