//! Path addressing for the page model tree.
//!
//! Paths use `/` as separator. A path containing the content-root marker
//! segment ([`JCR_CONTENT`]) addresses an *item* inside a page; any other path
//! addresses a *page*:
//!
//! ```text
//! /content/site/en                         page
//! /content/site/en/jcr:content/root/text   item "root/text" of page /content/site/en
//! ```
//!
//! Every function here is pure and total: empty input yields an empty string
//! or `None`, never a panic.
//!
//! # Usage
//!
//! ```
//! use pagemodel::path::{self, PageContentPaths};
//!
//! let split = path::split_page_content_paths("/content/site/en/jcr:content/root/text");
//! assert_eq!(split, PageContentPaths {
//!     page_path: "/content/site/en".to_string(),
//!     item_path: Some("root/text".to_string()),
//! });
//!
//! assert!(path::is_item("/content/site/en/jcr:content/root"));
//! assert!(!path::is_item("/content/site/en"));
//! assert_eq!(path::node_name("/content/site/en/"), Some("en"));
//! ```

pub mod url;

pub use url::{
    adapt_page_path, add_extension, add_selector, context_path, convert_to_model_url,
    externalize, internalize, model_url, sanitize,
};

use crate::constants::JCR_CONTENT;

/// Path separator.
pub const SEPARATOR: char = '/';

/// A path split at the first content-root marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContentPaths {
    /// Path of the page owning the addressed node
    pub page_path: String,
    /// Path of the item relative to the page content root, `None` for pages
    pub item_path: Option<String>,
}

impl PageContentPaths {
    /// Returns true if the split path addresses an item.
    pub fn is_item(&self) -> bool {
        self.item_path.is_some()
    }
}

/// Collapses runs of separators into a single one.
///
/// ```
/// # use pagemodel::path::normalize;
/// assert_eq!(normalize("//content///site/"), "/content/site/");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut previous_was_separator = false;

    for c in path.chars() {
        let is_separator = c == SEPARATOR;
        if !(is_separator && previous_was_separator) {
            normalized.push(c);
        }
        previous_was_separator = is_separator;
    }

    normalized
}

/// Joins segments with the separator, skipping empty ones, then normalizes.
///
/// ```
/// # use pagemodel::path::join;
/// assert_eq!(join(["/content", "", "site/", "/en"]), "/content/site/en");
/// ```
pub fn join<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = segments
        .into_iter()
        .filter(|segment| !segment.as_ref().is_empty())
        .map(|segment| segment.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("/");

    normalize(&joined)
}

/// Adds a leading separator if missing.
pub fn make_absolute(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else if path.starts_with(SEPARATOR) {
        path.to_string()
    } else {
        format!("{SEPARATOR}{path}")
    }
}

/// Removes one leading separator if present.
pub fn make_relative(path: &str) -> String {
    path.strip_prefix(SEPARATOR).unwrap_or(path).to_string()
}

/// Returns the last non-empty segment of a path.
///
/// ```
/// # use pagemodel::path::node_name;
/// assert_eq!(node_name("/content//site/en"), Some("en"));
/// assert_eq!(node_name("///"), None);
/// ```
pub fn node_name(path: &str) -> Option<&str> {
    path.split(SEPARATOR).rfind(|segment| !segment.is_empty())
}

/// Returns everything before the last separator.
///
/// `None` when the path has no separator, ends with a separator, or the
/// parent would be empty.
///
/// ```
/// # use pagemodel::path::parent_node_path;
/// assert_eq!(parent_node_path("/content/site/en"), Some("/content/site"));
/// assert_eq!(parent_node_path("/content"), None);
/// assert_eq!(parent_node_path("/content/site/"), None);
/// ```
pub fn parent_node_path(path: &str) -> Option<&str> {
    let index = path.rfind(SEPARATOR)?;
    if index + 1 >= path.len() || index == 0 {
        return None;
    }
    Some(&path[..index])
}

/// Removes `root` from the head of `target`, segment by segment.
///
/// Returns the relative remainder when every segment of `root` matches the
/// head of `target`, and `target` unchanged otherwise.
///
/// ```
/// # use pagemodel::path::subpath;
/// assert_eq!(subpath("/content/site/en", "/content/site"), "en");
/// assert_eq!(subpath("root/child", "root"), "child");
/// assert_eq!(subpath("root/child", "other"), "root/child");
/// ```
pub fn subpath(target: &str, root: &str) -> String {
    if target.is_empty() {
        return String::new();
    }

    let relative_target = make_relative(target);
    let relative_root = make_relative(root);
    let target_segments: Vec<&str> = relative_target.split(SEPARATOR).collect();
    let root_segments: Vec<&str> = relative_root.split(SEPARATOR).collect();

    if target_segments.len() < root_segments.len() {
        return target.to_string();
    }

    let matches_prefix = root_segments
        .iter()
        .zip(&target_segments)
        .all(|(root_segment, target_segment)| root_segment == target_segment);

    if matches_prefix {
        target_segments[root_segments.len()..].join("/")
    } else {
        target.to_string()
    }
}

/// Splits a path at the first `/<content-root-marker>/` occurrence.
pub fn split_page_content_paths(path: &str) -> PageContentPaths {
    let delimiter = format!("/{JCR_CONTENT}/");

    match path.split_once(&delimiter) {
        Some((page_path, item_path)) => PageContentPaths {
            page_path: page_path.to_string(),
            item_path: Some(item_path.to_string()),
        },
        None => PageContentPaths {
            page_path: path.to_string(),
            item_path: None,
        },
    }
}

/// Returns true if the path addresses an item, i.e. it contains the
/// content-root marker with a non-empty page part before it and a non-empty
/// item part after it.
pub fn is_item(path: &str) -> bool {
    let delimiter = format!("/{JCR_CONTENT}/");

    path.match_indices(&delimiter)
        .any(|(index, _)| index > 0 && index + delimiter.len() < path.len())
}

/// Strips every occurrence of the given strings from both ends of a path.
///
/// Leading matches also drop the separator that follows them, trailing
/// matches the separator that precedes them. Used to swallow nested
/// content-root markers while walking items.
///
/// ```
/// # use pagemodel::path::trim_strings;
/// assert_eq!(trim_strings("jcr:content/root/jcr:content", &["jcr:content"]), "root");
/// ```
pub fn trim_strings<S: AsRef<str>>(path: &str, strings: &[S]) -> String {
    let mut trimmed = path.to_string();

    for string in strings {
        let string = string.as_ref();
        if string.is_empty() {
            continue;
        }

        while let Some(rest) = trimmed.strip_prefix(string) {
            trimmed = make_relative(rest);
        }

        while let Some(rest) = trimmed.strip_suffix(string) {
            trimmed = rest.strip_suffix(SEPARATOR).unwrap_or(rest).to_string();
        }
    }

    trimmed
}

/// Returns the leading occurrences of the given strings, joined as a
/// relative path.
///
/// ```
/// # use pagemodel::path::leading_matches;
/// assert_eq!(leading_matches("jcr:content/root", &["jcr:content"]), "jcr:content");
/// assert_eq!(leading_matches("root/jcr:content", &["jcr:content"]), "");
/// ```
pub fn leading_matches<S: AsRef<str>>(path: &str, strings: &[S]) -> String {
    let mut remaining = path.to_string();
    let mut matched = String::new();

    for string in strings {
        let string = string.as_ref();
        if string.is_empty() {
            continue;
        }

        while let Some(rest) = remaining.strip_prefix(string) {
            remaining = make_relative(rest);
            matched.push(SEPARATOR);
            matched.push_str(string);
        }
    }

    make_relative(&matched)
}

/// Builds the absolute path of an item from its page path and content path.
pub fn item_path(page_path: &str, content_path: &str) -> String {
    join([page_path, JCR_CONTENT, content_path])
}
