//! URL helpers for turning browser locations into model paths and back.
//!
//! The context path is the prefix an application is deployed under (for
//! example `/app` in `/app/content/site/en.html`). It is always passed in
//! explicitly; see [`context_path`] to derive it from a location.

use std::sync::LazyLock;

use regex::Regex;

use super::{SEPARATOR, make_absolute, normalize};
use crate::constants::{DEFAULT_MODEL_EXTENSION, DEFAULT_MODEL_SELECTOR};

static CONTEXT_PATH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:content|apps|libs|etc|etc\.clientlibs|conf|mnt/overlay)/")
        .expect("context path pattern is valid")
});

static EXTENSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([/a-zA-Z0-9:_-]*)\.?([a-zA-Z0-9._-]*)/?([a-zA-Z0-9/._-]*)\??([a-zA-Z0-9=&]*)$")
        .expect("extension pattern is valid")
});

static HTML_EXTENSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.htm(l)?").expect("html pattern is valid"));

static HTML_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.htm(l)?$").expect("html suffix pattern is valid"));

/// Returns the context path of a location: everything before the first
/// well-known repository root segment (`/content/`, `/apps/`, ...).
///
/// ```
/// # use pagemodel::path::context_path;
/// assert_eq!(context_path("/app/content/site/en.html"), "/app");
/// assert_eq!(context_path("/content/site/en.html"), "");
/// ```
pub fn context_path(location: &str) -> &str {
    match CONTEXT_PATH_REGEX.find(location) {
        Some(found) if found.start() > 0 => &location[..found.start()],
        _ => "",
    }
}

/// Removes the context path from the head of a URL.
pub fn internalize(url: &str, context_path: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    if context_path.is_empty() {
        return url.to_string();
    }

    match url
        .strip_prefix(context_path)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
    {
        Some(rest) => format!("{SEPARATOR}{rest}"),
        None => url.to_string(),
    }
}

/// Prepends the context path to a URL unless already present.
pub fn externalize(url: &str, context_path: &str) -> String {
    if url.starts_with(context_path) {
        url.to_string()
    } else {
        format!("{context_path}{url}")
    }
}

/// Reduces a URL to a canonical repository path.
///
/// Drops the scheme and host (including protocol-relative `//host/...`
/// URLs), query and fragment, the context path, and every selector and
/// extension, then collapses repeated separators.
///
/// ```
/// # use pagemodel::path::sanitize;
/// assert_eq!(sanitize("https://host/app/content/site/en.model.json?x=1", "/app").as_deref(), Some("/content/site/en"));
/// assert_eq!(sanitize("", ""), None);
/// ```
pub fn sanitize(path: &str, context_path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }

    let pathname = if path.starts_with("//") {
        ::url::Url::parse(&format!("http:{path}"))
            .map(|parsed| parsed.path().to_string())
            .ok()?
    } else {
        match ::url::Url::parse(path) {
            Ok(parsed) if parsed.has_host() => parsed.path().to_string(),
            _ => path
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    };

    let mut sanitized = internalize(&pathname, context_path);

    if let Some(selector_index) = sanitized.find('.') {
        sanitized.truncate(selector_index);
    }

    Some(normalize(&sanitized))
}

/// Computes the listener key of a path: the internalized path, or the empty
/// string when it designates the root page.
///
/// ```
/// # use pagemodel::path::adapt_page_path;
/// assert_eq!(adapt_page_path("/content/site", Some("/content/site"), ""), "");
/// assert_eq!(adapt_page_path("/content/site/jcr:content/root", Some("/content/site"), ""), "/content/site/jcr:content/root");
/// ```
pub fn adapt_page_path(path: &str, root_path: Option<&str>, context_path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let local_path = internalize(path, context_path);

    let Some(root_path) = root_path.filter(|root| !root.is_empty()) else {
        return local_path;
    };

    if sanitize(root_path, context_path).as_deref() == Some(local_path.as_str()) {
        String::new()
    } else {
        local_path
    }
}

/// Inserts a selector before the first `.` of a path, or appends it.
///
/// ```
/// # use pagemodel::path::add_selector;
/// assert_eq!(add_selector("/content/site/en.html", "model"), "/content/site/en.model.html");
/// assert_eq!(add_selector("/content/site/en", "model"), "/content/site/en.model");
/// ```
pub fn add_selector(path: &str, selector: &str) -> String {
    if selector.is_empty() {
        return path.to_string();
    }

    let selector = if selector.starts_with('.') {
        selector.to_string()
    } else {
        format!(".{selector}")
    };

    if path.is_empty() || path.contains(&selector) {
        return path.to_string();
    }

    match path.find('.') {
        Some(index) if index > 0 => format!("{}{}{}", &path[..index], selector, &path[index..]),
        _ => format!("{path}{selector}"),
    }
}

/// Sets the extension of a path, replacing `.htm`/`.html`, keeping any
/// suffix and query parameters.
///
/// ```
/// # use pagemodel::path::add_extension;
/// assert_eq!(add_extension("/content/site/en.model", "json"), "/content/site/en.model.json");
/// assert_eq!(add_extension("/content/site/en.model.html", "json"), "/content/site/en.model.json");
/// ```
pub fn add_extension(path: &str, extension: &str) -> String {
    if extension.is_empty() {
        return path.to_string();
    }

    let extension = if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    };

    if path.is_empty() || path.contains(&extension) {
        return path.to_string();
    }

    let mut extension_path = path.to_string();
    let mut queue = String::new();

    if let Some(captures) = EXTENSION_REGEX.captures(path) {
        let group = |index: usize| captures.get(index).map_or("", |m| m.as_str());

        if !group(3).is_empty() {
            queue = format!("/{}", group(3));
        }
        if !group(4).is_empty() {
            queue.push('?');
            queue.push_str(group(4));
        }

        let selectors = HTML_EXTENSION_REGEX.replace(group(2), extension.as_str());
        extension_path = format!("{}.{}{}", group(1), selectors, queue);
    }

    if extension_path.contains(&extension) {
        extension_path
    } else {
        format!("{extension_path}{extension}{queue}").replace("..", ".")
    }
}

/// Replaces a trailing `.htm`/`.html` with the model JSON extension.
///
/// ```
/// # use pagemodel::path::convert_to_model_url;
/// assert_eq!(convert_to_model_url("/content/site/en.html"), "/content/site/en.model.json");
/// ```
pub fn convert_to_model_url(url: &str) -> String {
    let replacement = format!(".{DEFAULT_MODEL_SELECTOR}.{DEFAULT_MODEL_EXTENSION}");
    HTML_SUFFIX_REGEX
        .replace(url, regex::NoExpand(&replacement))
        .into_owned()
}

/// Builds the absolute URL the model of `path` is fetched from.
///
/// ```
/// # use pagemodel::path::model_url;
/// assert_eq!(model_url("/content/site/en", ""), "/content/site/en.model.json");
/// assert_eq!(model_url("/content/site/en", "/app"), "/app/content/site/en.model.json");
/// ```
pub fn model_url(path: &str, context_path: &str) -> String {
    let url = add_selector(path, DEFAULT_MODEL_SELECTOR);
    let url = add_extension(&url, DEFAULT_MODEL_EXTENSION);
    make_absolute(&externalize(&url, context_path))
}
