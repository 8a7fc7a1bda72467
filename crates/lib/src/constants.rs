//! Constants used throughout the page model library.
//!
//! This module provides central definitions for the reserved wire keys of the
//! page model JSON format and the reserved path segments used for addressing.

/// Resource type of a node.
pub const TYPE_PROP: &str = ":type";

/// Child items of a node, keyed by item name.
pub const ITEMS_PROP: &str = ":items";

/// Ordered item names of a node.
pub const ITEMS_ORDER_PROP: &str = ":itemsOrder";

/// Canonical path of a page node.
pub const PATH_PROP: &str = ":path";

/// Child pages of a page node, keyed by absolute page path.
pub const CHILDREN_PROP: &str = ":children";

/// Hierarchy type of a node (`page` for pages).
pub const HIERARCHY_TYPE_PROP: &str = ":hierarchyType";

/// Reserved path segment separating a page path from its item subtree.
pub const JCR_CONTENT: &str = "jcr:content";

/// Selector added to page paths to request their JSON model.
pub const DEFAULT_MODEL_SELECTOR: &str = "model";

/// Extension of model requests.
pub const DEFAULT_MODEL_EXTENSION: &str = "json";
