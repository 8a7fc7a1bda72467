//! The page model node type.
//!
//! A [`Model`] is one node of the content tree delivered by the server. The
//! reserved keys of the wire format (`:type`, `:items`, `:itemsOrder`, `:path`,
//! `:children`, `:hierarchyType`) are mapped onto typed fields, while every
//! other component property is kept verbatim in [`Model::properties`].
//!
//! # Usage
//!
//! ```
//! use pagemodel::Model;
//! use serde_json::json;
//!
//! let page = Model::try_from(json!({
//!     ":path": "/content/site/en",
//!     ":type": "site/components/page",
//!     ":itemsOrder": ["root"],
//!     ":items": { "root": { ":type": "core/container" } },
//!     "title": "English",
//! }))?;
//!
//! assert_eq!(page.path.as_deref(), Some("/content/site/en"));
//! assert_eq!(page.item("root").and_then(|root| root.resource_type.as_deref()), Some("core/container"));
//! assert_eq!(page.property("title"), Some(&json!("English")));
//! # Ok::<(), serde_json::Error>(())
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Hierarchy type value marking a page node.
pub const HIERARCHY_TYPE_PAGE: &str = "page";

/// Child nodes keyed by item name or page path, in wire order.
pub type ModelMap = IndexMap<String, Model>;

/// A node of the page model tree.
///
/// Page nodes carry `:path` and may carry `:children` (child pages keyed by
/// their absolute path). Both pages and items may carry `:items` and
/// `:itemsOrder`; the order list defines sibling order, not the map order.
///
/// The distinction between "absent" and "empty" is preserved for `:items`,
/// `:itemsOrder` and `:children` since the store only inserts into an
/// existing `:items` mapping and never invents an order list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Resource type (`:type`)
    #[serde(rename = ":type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Canonical page path (`:path`), only set on page roots
    #[serde(rename = ":path", default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Hierarchy type (`:hierarchyType`)
    #[serde(
        rename = ":hierarchyType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hierarchy_type: Option<String>,

    /// Child items (`:items`)
    #[serde(rename = ":items", default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ModelMap>,

    /// Sibling order of the child items (`:itemsOrder`)
    #[serde(
        rename = ":itemsOrder",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub items_order: Option<Vec<String>>,

    /// Child pages keyed by absolute page path (`:children`)
    #[serde(rename = ":children", default, skip_serializing_if = "Option::is_none")]
    pub children: Option<ModelMap>,

    /// Every non-reserved property of the component
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Model {
    /// Creates an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the node holds no reserved key and no property.
    pub fn is_empty(&self) -> bool {
        self.resource_type.is_none()
            && self.path.is_none()
            && self.hierarchy_type.is_none()
            && self.items.is_none()
            && self.items_order.is_none()
            && self.children.is_none()
            && self.properties.is_empty()
    }

    /// Returns true if the node declares itself a page.
    pub fn is_page(&self) -> bool {
        self.hierarchy_type.as_deref() == Some(HIERARCHY_TYPE_PAGE)
    }

    /// Gets a direct child item by name.
    pub fn item(&self, name: &str) -> Option<&Model> {
        self.items.as_ref()?.get(name)
    }

    /// Gets a mutable reference to a direct child item by name.
    pub fn item_mut(&mut self, name: &str) -> Option<&mut Model> {
        self.items.as_mut()?.get_mut(name)
    }

    /// Gets a child page by its absolute path.
    pub fn child(&self, page_path: &str) -> Option<&Model> {
        self.children.as_ref()?.get(page_path)
    }

    /// Returns true if `page_path` is a key of `:children`.
    pub fn has_child(&self, page_path: &str) -> bool {
        self.child(page_path).is_some()
    }

    /// Item names in sibling order.
    ///
    /// Falls back to the mapping order when no `:itemsOrder` is present.
    pub fn ordered_item_names(&self) -> Vec<&str> {
        match (&self.items_order, &self.items) {
            (Some(order), _) => order.iter().map(String::as_str).collect(),
            (None, Some(items)) => items.keys().map(String::as_str).collect(),
            (None, None) => Vec::new(),
        }
    }

    /// Gets a non-reserved property.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Sets a non-reserved property, returning the previous value.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(key.into(), value.into())
    }

    /// Converts the node back into its wire representation.
    pub fn to_value(&self) -> Value {
        // A struct of strings, maps and JSON values always serializes.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl TryFrom<Value> for Model {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

impl From<Model> for Value {
    fn from(model: Model) -> Self {
        model.to_value()
    }
}
