//! Item lookup inside a page node.
//!
//! Items are addressed by their content path relative to the page content
//! root (`root/container/text`). Item keys may span several segments and an
//! item may embed a nested page fragment, in which case the content path
//! crosses another content-root marker (`xf/jcr:content/root/text`). The walk
//! consumes one matching key per level, swallows any marker that follows it,
//! and descends into the matching child.

use crate::model::Model;
use crate::path::{join, leading_matches, subpath, trim_strings};

/// Outcome of walking a page's items for a content path.
///
/// On a hit `key` is set and `parent_keys` addresses the node owning the
/// item. On a miss `parent_keys` addresses the deepest node the walk
/// consumed and `residual` holds the part of the path it could not consume.
/// A new item belongs under that node only when the residual is a single
/// segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ItemLookup {
    /// Item keys leading from the page node down to the parent node
    pub parent_keys: Vec<String>,
    /// Content path of the parent relative to the page content root,
    /// including any nested content-root markers; empty for the page itself
    pub parent_path: String,
    /// Key of the item inside the parent's `:items`, when found
    pub key: Option<String>,
    /// Unconsumed content path below the parent; equals `key` on a hit
    pub residual: String,
}

impl ItemLookup {
    fn miss(parent_keys: Vec<String>, parent_path: String, residual: &str) -> Self {
        Self {
            parent_keys,
            parent_path,
            key: None,
            residual: residual.to_string(),
        }
    }

    /// Name a new item takes under the parent: the found key, or the
    /// residual when it is a single segment.
    pub fn insertable_name(&self) -> Option<&str> {
        match &self.key {
            Some(key) => Some(key),
            None => (!self.residual.is_empty() && !self.residual.contains('/'))
                .then_some(self.residual.as_str()),
        }
    }
}

/// Walks the items of `page` looking for `content_path`.
pub(crate) fn find_item<S: AsRef<str>>(page: &Model, content_path: &str, delimiters: &[S]) -> ItemLookup {
    walk(page, content_path, delimiters, Vec::new(), String::new())
}

fn walk<S: AsRef<str>>(
    node: &Model,
    content_path: &str,
    delimiters: &[S],
    parent_keys: Vec<String>,
    parent_path: String,
) -> ItemLookup {
    let Some(items) = &node.items else {
        return ItemLookup::miss(parent_keys, parent_path, content_path);
    };

    for (key, child) in items {
        if key == content_path {
            return ItemLookup {
                parent_keys,
                parent_path,
                key: Some(key.clone()),
                residual: key.clone(),
            };
        }

        let residual = subpath(content_path, key);
        if residual == content_path {
            // key is not a segment prefix of the path
            continue;
        }

        let nested_markers = leading_matches(&residual, delimiters);
        let residual = trim_strings(&residual, delimiters);

        let mut child_keys = parent_keys.clone();
        child_keys.push(key.clone());
        let child_path = join([parent_path.as_str(), key.as_str(), nested_markers.as_str()]);

        return walk(child, &residual, delimiters, child_keys, child_path);
    }

    ItemLookup::miss(parent_keys, parent_path, content_path)
}

/// Follows a chain of item keys from `node`.
pub(crate) fn descend<'a>(node: &'a Model, keys: &[String]) -> Option<&'a Model> {
    keys.iter().try_fold(node, |current, key| current.item(key))
}

/// Follows a chain of item keys from `node`, mutably.
pub(crate) fn descend_mut<'a>(node: &'a mut Model, keys: &[String]) -> Option<&'a mut Model> {
    keys.iter().try_fold(node, |current, key| current.item_mut(key))
}
