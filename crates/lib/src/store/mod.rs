//! In-memory store of the page model tree.
//!
//! The [`ModelStore`] owns one tree rooted at the root page and provides path
//! based CRUD over it. Pages are reached through the root or its `:children`
//! mapping (keyed by absolute page path); items are reached by walking the
//! `:items` of their page (see [`traversal`]).
//!
//! Reads hand out copies by default so callers can not break the tree's
//! invariants. [`ModelStore::get_data_mut`] is the explicit escape hatch for
//! in-place edits.
//!
//! # Usage
//!
//! ```
//! use pagemodel::{Model, ModelStore};
//! use serde_json::json;
//!
//! let root = Model::try_from(json!({
//!     ":path": "/content/site",
//!     ":items": { "root": { ":itemsOrder": ["a"], ":items": { "a": {} } } },
//! }))?;
//! let mut store = ModelStore::new("/content/site", Some(root));
//!
//! let text = Model::try_from(json!({ ":type": "text" }))?;
//! store.insert_data("/content/site/jcr:content/root/b", text.clone(), Some("a"), true);
//!
//! assert_eq!(store.get_data(Some("/content/site/jcr:content/root/b")), Some(text));
//! let root_item = store.get_data(Some("/content/site/jcr:content/root")).unwrap();
//! assert_eq!(root_item.items_order, Some(vec!["b".to_string(), "a".to_string()]));
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod errors;
pub(crate) mod traversal;

use serde_json::Value;
use tracing::{debug, warn};

pub use errors::StoreError;

use crate::constants::JCR_CONTENT;
use crate::model::{Model, ModelMap};
use crate::path::{self, PageContentPaths};
use traversal::{descend, descend_mut, find_item};

/// Identifies a page node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageKey {
    Root,
    Child(String),
}

/// Identifies any node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeLocation {
    Page(PageKey),
    Item {
        page: PageKey,
        parent_keys: Vec<String>,
        key: String,
    },
}

/// Owner of the page model tree.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root_path: String,
    data: Model,
    delimiters: Vec<String>,
}

impl ModelStore {
    /// Creates a store for the given root path, using the default content-root
    /// marker as the only page content delimiter.
    pub fn new(root_path: impl Into<String>, data: Option<Model>) -> Self {
        Self {
            root_path: root_path.into(),
            data: data.unwrap_or_default(),
            delimiters: vec![JCR_CONTENT.to_string()],
        }
    }

    /// Creates a store with an explicit list of page content delimiters.
    ///
    /// # Errors
    /// Returns [`StoreError::MissingDelimiters`] for an empty list and
    /// [`StoreError::InvalidDelimiter`] for an empty or multi-segment entry.
    pub fn with_delimiters<I, S>(
        root_path: impl Into<String>,
        data: Option<Model>,
        delimiters: I,
    ) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let delimiters: Vec<String> = delimiters.into_iter().map(Into::into).collect();

        if delimiters.is_empty() {
            return Err(StoreError::MissingDelimiters);
        }

        for delimiter in &delimiters {
            if delimiter.is_empty() || delimiter.contains(path::SEPARATOR) {
                return Err(StoreError::InvalidDelimiter {
                    delimiter: delimiter.clone(),
                    reason: "delimiters must be a single non-empty path segment".to_string(),
                });
            }
        }

        Ok(Self {
            root_path: root_path.into(),
            data: data.unwrap_or_default(),
            delimiters,
        })
    }

    /// Replaces the root path and the whole tree.
    pub fn initialize(&mut self, root_path: impl Into<String>, data: Model) {
        self.root_path = root_path.into();
        self.data = data;
        debug!(root_path = %self.root_path, "Model store initialized");
    }

    /// Root path of the tree.
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// The whole tree, borrowed.
    pub fn data_map(&self) -> &Model {
        &self.data
    }

    /// Page content delimiters in use.
    pub fn delimiters(&self) -> &[String] {
        &self.delimiters
    }

    /// Returns a copy of the node at `path`.
    ///
    /// `None` as path, the root path, and the root path followed by the
    /// content-root marker all return the whole tree. Any path that does not
    /// resolve returns `None`.
    pub fn get_data(&self, path: Option<&str>) -> Option<Model> {
        self.get_data_ref(path).cloned()
    }

    /// Borrows the node at `path`. Same resolution rules as [`Self::get_data`].
    pub fn get_data_ref(&self, path: Option<&str>) -> Option<&Model> {
        let location = self.locate(path)?;
        self.resolve(&location)
    }

    /// Mutably borrows the live node at `path`.
    ///
    /// Edits through the returned reference are visible to every later read.
    pub fn get_data_mut(&mut self, path: Option<&str>) -> Option<&mut Model> {
        let location = self.locate(path)?;
        self.resolve_mut(&location)
    }

    /// Stores `data` at `path`.
    ///
    /// A page path stores the data under the root's `:children`. An item
    /// path stores it in the `:items` of the resolved parent and, when the
    /// parent has an `:itemsOrder`, places the name next to `sibling_name`
    /// (before it when `insert_before`) or at the end when the sibling is
    /// unknown. A parent without `:itemsOrder` gets none invented.
    ///
    /// Empty paths, unknown pages, missing intermediate items and parents
    /// without `:items` are logged and ignored: an item is only ever stored at
    /// the path it was inserted at.
    pub fn insert_data(
        &mut self,
        path: &str,
        data: Model,
        sibling_name: Option<&str>,
        insert_before: bool,
    ) {
        if path.is_empty() {
            warn!("No path provided for inserted data");
            return;
        }

        if !path::is_item(path) {
            self.data
                .children
                .get_or_insert_with(ModelMap::new)
                .insert(path.to_string(), data);
            debug!(path, "Page data inserted");
            return;
        }

        let PageContentPaths {
            page_path,
            item_path: Some(item_path),
        } = path::split_page_content_paths(path)
        else {
            warn!(path, "Item path has no content path");
            return;
        };

        let Some(page_key) = self.page_key(&page_path) else {
            warn!(path, page_path, "Page not found, item not inserted");
            return;
        };

        let Some(lookup) = self
            .page(&page_key)
            .map(|page| find_item(page, &item_path, &self.delimiters))
        else {
            return;
        };

        let Some(item_name) = lookup.insertable_name().map(str::to_string) else {
            warn!(
                path,
                missing = lookup.residual.as_str(),
                "Parent of item not found, item not inserted"
            );
            return;
        };
        let parent_keys = lookup.parent_keys;

        let Some(parent) = self
            .page_mut(&page_key)
            .and_then(|page| descend_mut(page, &parent_keys))
        else {
            return;
        };

        let Model {
            items, items_order, ..
        } = parent;

        let Some(items) = items.as_mut() else {
            warn!(path, "Parent node has no items, item not inserted");
            return;
        };

        items.insert(item_name.clone(), data);

        if let Some(order) = items_order.as_mut() {
            place_in_order(order, &item_name, sibling_name, insert_before);
        }

        debug!(path, "Item data inserted");
    }

    /// Removes the node at `path`.
    ///
    /// A page path removes the entry from the root's `:children` and returns
    /// `None`. An item path removes the item from its parent's `:items` and
    /// `:itemsOrder` and returns the absolute path of the parent: the page
    /// path for items directly under the content root, otherwise
    /// `<page>/jcr:content/<parent>`. Returns `None` and logs a warning when
    /// nothing was found.
    pub fn remove_data(&mut self, path: &str) -> Option<String> {
        if path.is_empty() {
            warn!("No path provided for data removal");
            return None;
        }

        if !path::is_item(path) {
            match self
                .data
                .children
                .as_mut()
                .and_then(|children| children.shift_remove(path))
            {
                Some(_) => debug!(path, "Page data removed"),
                None => warn!(path, "Page for path was not found! Nothing to remove then."),
            }
            return None;
        }

        let split = path::split_page_content_paths(path);
        let item_path = split.item_path.as_deref().unwrap_or_default();

        let Some(page_key) = self.page_key(&split.page_path) else {
            warn!(path, "Item for path was not found! Nothing to remove then.");
            return None;
        };

        let lookup = find_item(self.page(&page_key)?, item_path, &self.delimiters);

        let Some(key) = lookup.key else {
            warn!(path, "Item for path was not found! Nothing to remove then.");
            return None;
        };

        let parent = self
            .page_mut(&page_key)
            .and_then(|page| descend_mut(page, &lookup.parent_keys))?;

        parent.items.as_mut()?.shift_remove(&key);
        if let Some(order) = parent.items_order.as_mut() {
            order.retain(|name| name != &key);
        }

        let page_path = match page_key {
            PageKey::Root => self.root_path.clone(),
            PageKey::Child(page_path) => page_path,
        };

        debug!(path, "Item data removed");

        if lookup.parent_path.is_empty() {
            Some(page_path)
        } else {
            Some(path::item_path(&page_path, &lookup.parent_path))
        }
    }

    /// Replaces the item at `path` with the `value` field of `new_data`.
    ///
    /// Only the parent's `:items` entry is overwritten; `:itemsOrder` is left
    /// untouched. Missing parents, parents without `:items`, and payloads
    /// without a model `value` are logged and ignored.
    pub fn set_data(&mut self, path: &str, new_data: Value) {
        let Some(item_key) = path::node_name(path) else {
            warn!(path, "No item name in path, data not set");
            return;
        };

        let value = match new_data {
            Value::Object(mut wrapper) => wrapper.remove("value"),
            _ => None,
        };

        let Some(value) = value else {
            warn!(path, "No value provided, data not set");
            return;
        };

        let item = match Model::try_from(value) {
            Ok(item) => item,
            Err(e) => {
                warn!(path, "Value is not a model, data not set: {e}");
                return;
            }
        };

        let parent_path = path::parent_node_path(path);

        let Some(parent) = self.get_data_mut(parent_path) else {
            warn!(path, "Parent of item was not found, data not set");
            return;
        };

        match parent.items.as_mut() {
            Some(items) => {
                items.insert(item_key.to_string(), item);
                debug!(path, "Item data replaced");
            }
            None => warn!(path, "Parent node has no items, data not set"),
        }
    }

    /// Releases the tree. The store can not be used afterwards.
    pub fn destroy(self) {
        debug!(root_path = %self.root_path, "Model store destroyed");
    }

    fn locate(&self, path: Option<&str>) -> Option<NodeLocation> {
        let Some(path) = path else {
            return Some(NodeLocation::Page(PageKey::Root));
        };

        if path == self.root_path || self.is_content_root_of(path, &self.root_path) {
            return Some(NodeLocation::Page(PageKey::Root));
        }

        let split = path::split_page_content_paths(path);

        let Some(item_path) = split.item_path.filter(|item_path| !item_path.is_empty()) else {
            let page_path = self.strip_content_root(&split.page_path);
            return self.page_key(page_path).map(NodeLocation::Page);
        };

        let page = self.page_key(&split.page_path)?;
        let lookup = find_item(self.page(&page)?, &item_path, &self.delimiters);

        Some(NodeLocation::Item {
            page,
            parent_keys: lookup.parent_keys,
            key: lookup.key?,
        })
    }

    fn resolve(&self, location: &NodeLocation) -> Option<&Model> {
        match location {
            NodeLocation::Page(page) => self.page(page),
            NodeLocation::Item {
                page,
                parent_keys,
                key,
            } => descend(self.page(page)?, parent_keys)?.item(key),
        }
    }

    fn resolve_mut(&mut self, location: &NodeLocation) -> Option<&mut Model> {
        match location {
            NodeLocation::Page(page) => self.page_mut(page),
            NodeLocation::Item {
                page,
                parent_keys,
                key,
            } => descend_mut(self.page_mut(page)?, parent_keys)?.item_mut(key),
        }
    }

    fn page_key(&self, page_path: &str) -> Option<PageKey> {
        if page_path.is_empty()
            || page_path == self.root_path
            || self.data.path.as_deref() == Some(page_path)
        {
            return Some(PageKey::Root);
        }

        self.data
            .has_child(page_path)
            .then(|| PageKey::Child(page_path.to_string()))
    }

    fn page(&self, key: &PageKey) -> Option<&Model> {
        match key {
            PageKey::Root => Some(&self.data),
            PageKey::Child(page_path) => self.data.child(page_path),
        }
    }

    fn page_mut(&mut self, key: &PageKey) -> Option<&mut Model> {
        match key {
            PageKey::Root => Some(&mut self.data),
            PageKey::Child(page_path) => self.data.children.as_mut()?.get_mut(page_path),
        }
    }

    /// True if `path` is `page_path` followed by one content-root delimiter.
    fn is_content_root_of(&self, path: &str, page_path: &str) -> bool {
        path.strip_prefix(page_path)
            .and_then(|rest| rest.strip_prefix(path::SEPARATOR))
            .is_some_and(|rest| self.delimiters.iter().any(|delimiter| delimiter == rest))
    }

    /// Maps `<page>/<delimiter>` to `<page>`.
    fn strip_content_root<'a>(&self, page_path: &'a str) -> &'a str {
        for delimiter in &self.delimiters {
            if let Some(page) = page_path
                .strip_suffix(delimiter.as_str())
                .and_then(|rest| rest.strip_suffix(path::SEPARATOR))
            {
                return page;
            }
        }
        page_path
    }
}

/// Places `name` in `order` relative to `sibling`.
///
/// With a sibling, any earlier occurrence of the name is dropped before it
/// is spliced in next to the sibling, or appended if the sibling is unknown.
/// Without one, the name is appended unless already listed.
fn place_in_order(order: &mut Vec<String>, name: &str, sibling: Option<&str>, insert_before: bool) {
    match sibling {
        Some(sibling) if sibling != name => {
            order.retain(|existing| existing != name);
            match order.iter().position(|existing| existing == sibling) {
                Some(index) => {
                    let at = if insert_before { index } else { index + 1 };
                    order.insert(at, name.to_string());
                }
                None => order.push(name.to_string()),
            }
        }
        _ => {
            if !order.iter().any(|existing| existing == name) {
                order.push(name.to_string());
            }
        }
    }
}
