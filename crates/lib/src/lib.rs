//!
//! Pagemodel: a client-side mirror of a server-provided page model tree.
//! This library keeps the hierarchical content model of a single-page
//! application in memory, addresses nodes by path, and keeps the tree in sync
//! with fetched fragments and in-place editor updates.
//!
//! ## Core Concepts
//!
//! * **Models (`model::Model`)**: One node of the content tree. Reserved wire keys (`:type`, `:items`, `:itemsOrder`, `:path`, `:children`, `:hierarchyType`) are typed fields; every other component property is kept verbatim.
//! * **Paths (`path`)**: Pure helpers for the `/`-separated path dialect. A path containing the content-root marker (`jcr:content`) addresses an *item* inside a page, any other path addresses a *page*.
//! * **Store (`store::ModelStore`)**: The owner of the tree, with path based get/insert/remove/set that keep `:items` and `:itemsOrder` consistent.
//! * **Listeners (`listeners::ListenerRegistry`)**: Callbacks keyed by root-relative path, notified after a mutation of exactly that path.
//! * **Manager (`manager::ModelManager`)**: The orchestrator. It initializes the root model, fetches missing fragments through a `client::ModelClient` (deduplicating concurrent fetches of the same path), stores them and notifies listeners.
//! * **Editor (`editor::EditorClient`)**: Applies in-place editor commands (`replace`, `delete`, `insertBefore`, `insertAfter`) to the managed tree.
//! * **Router (`router::ModelRouter`)**: Maps navigated URLs to model paths and preloads their models.

pub mod client;
pub mod constants;
pub mod editor;
pub mod listeners;
pub mod manager;
pub mod model;
pub mod path;
pub mod router;
pub mod store;

/// Re-export the core types for easier access.
pub use client::{FetchError, HttpModelClient, ModelClient};
pub use editor::{EditorClient, EditorCommand, EditorError};
pub use listeners::{Listener, ListenerId, ListenerRegistry};
pub use manager::{DataRequest, ManagerError, ModelManager, ModelManagerConfig, PageModelEvent};
pub use model::{Model, ModelMap};
pub use router::{ModelRouter, RouterConfig, RouterError, RouterMode};
pub use store::{ModelStore, StoreError};

/// Result type used throughout the Pagemodel library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Pagemodel library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured fetch errors from the client module
    #[error(transparent)]
    Fetch(client::FetchError),

    /// Structured manager errors from the manager module
    #[error(transparent)]
    Manager(manager::ManagerError),

    /// Structured editor errors from the editor module
    #[error(transparent)]
    Editor(editor::EditorError),

    /// Structured router errors from the router module
    #[error(transparent)]
    Router(router::RouterError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "store",
            Error::Fetch(_) => "client",
            Error::Manager(_) => "manager",
            Error::Editor(_) => "editor",
            Error::Router(_) => "router",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Fetch(fetch_err) => fetch_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error signals a broken invariant (a programming error).
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_invariant_violation(),
            Error::Manager(manager_err) => manager_err.is_invariant_violation(),
            _ => false,
        }
    }

    /// Check if this error comes from fetching a model.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }

    /// Check if this error was caused by malformed input.
    pub fn is_malformed_input(&self) -> bool {
        match self {
            Error::Editor(_) | Error::Serialize(_) => true,
            Error::Router(router_err) => router_err.is_invalid_filter(),
            _ => false,
        }
    }
}
