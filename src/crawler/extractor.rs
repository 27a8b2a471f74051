//! Search result link extraction
//!
//! Turns one fetched search page into the raw article links it lists,
//! following the site's [`ContentLocator`]:
//! - HTML pages (direct and rendered): anchors whose class attribute contains
//!   the locator string, optionally inside a container `<div>`
//! - JSON endpoints: the object between the first `{` and the last `}`,
//!   walked down a key path to a list of items or an HTML fragment
//!
//! Zero matches is an empty list, not an error. Errors mean the page did not
//! have the shape the profile describes.

use crate::sites::{ContentLocator, JsonItems, SiteProfile};
use crate::url::apply_domain_prefix;
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

/// Extracts article links from a search result page
///
/// # Arguments
///
/// * `content` - Response body (HTML, rendered DOM, or JSON/JSONP)
/// * `profile` - The site's profile
/// * `request_url` - URL the content came from; its origin prefixes
///   path-only links when the profile asks for it
///
/// # Example
///
/// ```
/// use press_trawl::crawler::extract_urls;
/// use press_trawl::SiteRegistry;
/// use url::Url;
///
/// let registry = SiteRegistry::builtin();
/// let cnn = registry.profile("CNN").unwrap();
/// let body = r#"__cb({"result":[{"url":"https://x/1"},{"bad":"item"}]})"#;
/// let request = Url::parse("https://search.api.cnn.io/content?q=x").unwrap();
///
/// let urls = extract_urls(body, cnn, &request).unwrap();
/// assert_eq!(urls, vec!["https://x/1".to_string()]);
/// ```
pub fn extract_urls(
    content: &str,
    profile: &SiteProfile,
    request_url: &Url,
) -> Result<Vec<String>, ExtractError> {
    let hrefs = match &profile.locator {
        ContentLocator::AnchorClass(class) => {
            let document = Html::parse_document(content);
            anchors_in_document(&document, profile.pre_container.as_deref(), class)?
        }
        ContentLocator::Json { path, items } => links_from_json(content, path, items)?,
    };

    Ok(apply_domain_prefix(hrefs, request_url, profile.has_domain_prefix))
}

fn class_contains(element: &ElementRef<'_>, needle: &str) -> bool {
    element
        .value()
        .attr("class")
        .map(|class| class.contains(needle))
        .unwrap_or(false)
}

fn matching_hrefs<'a>(
    anchors: impl Iterator<Item = ElementRef<'a>>,
    anchor_class: &str,
) -> Vec<String> {
    anchors
        .filter(|a| anchor_class.is_empty() || class_contains(a, anchor_class))
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

fn anchors_in_document(
    document: &Html,
    pre_container: Option<&str>,
    anchor_class: &str,
) -> Result<Vec<String>, ExtractError> {
    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return Ok(Vec::new());
    };

    match pre_container {
        Some(container_class) => {
            let Ok(div_selector) = Selector::parse("div") else {
                return Ok(Vec::new());
            };
            let container = document
                .select(&div_selector)
                .find(|div| class_contains(div, container_class))
                .ok_or_else(|| ExtractError::MissingContainer(container_class.to_string()))?;
            Ok(matching_hrefs(container.select(&anchor_selector), anchor_class))
        }
        None => Ok(matching_hrefs(document.select(&anchor_selector), anchor_class)),
    }
}

/// Slices out the outermost `{...}`, dropping any JSONP callback wrapper
///
/// Braces inside the callback name or trailing script would defeat this; the
/// endpoints we read do not emit any.
fn json_object(content: &str) -> Result<&str, ExtractError> {
    let start = content.find('{').ok_or(ExtractError::MissingJsonObject)?;
    let end = content.rfind('}').ok_or(ExtractError::MissingJsonObject)?;
    if end < start {
        return Err(ExtractError::MissingJsonObject);
    }
    Ok(&content[start..=end])
}

fn links_from_json(
    content: &str,
    path: &[String],
    items: &JsonItems,
) -> Result<Vec<String>, ExtractError> {
    let root: Value = serde_json::from_str(json_object(content)?)?;

    let mut node = &root;
    for key in path {
        node = node
            .get(key.as_str())
            .ok_or_else(|| ExtractError::MissingKey(key.clone()))?;
    }
    let last_key = path.last().cloned().unwrap_or_default();

    match items {
        JsonItems::Field(field) => as_array(node, &last_key)?
            .iter()
            .map(|item| {
                item.get(field.as_str())
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| ExtractError::MissingField(field.clone()))
            })
            .collect(),
        JsonItems::FieldIfPresent(field) => Ok(as_array(node, &last_key)?
            .iter()
            .filter_map(|item| item.get(field.as_str()).and_then(Value::as_str))
            .map(str::to_string)
            .collect()),
        JsonItems::HtmlAnchors(anchor_class) => {
            let fragment = match node {
                Value::String(html) => html.clone(),
                Value::Array(parts) => parts.iter().filter_map(Value::as_str).collect(),
                _ => {
                    return Err(ExtractError::UnexpectedShape {
                        key: last_key,
                        expected: "an HTML string",
                    })
                }
            };
            let document = Html::parse_fragment(&fragment);
            anchors_in_document(&document, None, anchor_class)
        }
    }
}

fn as_array<'v>(node: &'v Value, key: &str) -> Result<&'v Vec<Value>, ExtractError> {
    node.as_array().ok_or_else(|| ExtractError::UnexpectedShape {
        key: key.to_string(),
        expected: "an array",
    })
}
