//! URL handling module for Press-Trawl
//!
//! Search pages hand back article links in two forms: absolute URLs, or
//! path-only links that must be anchored to the search endpoint's origin.

mod domain;

pub use domain::origin_of;

use url::Url;

/// Anchors raw hrefs to the request origin when the site emits path-only links
///
/// When `has_domain_prefix` is true the hrefs are already absolute and are
/// returned unchanged. Otherwise each href is prefixed with the scheme and
/// host of `request_url`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use press_trawl::url::apply_domain_prefix;
///
/// let request = Url::parse("https://www.example.com/search?q=x").unwrap();
/// let urls = apply_domain_prefix(vec!["/2023/story".to_string()], &request, false);
/// assert_eq!(urls, vec!["https://www.example.com/2023/story".to_string()]);
/// ```
pub fn apply_domain_prefix(hrefs: Vec<String>, request_url: &Url, has_domain_prefix: bool) -> Vec<String> {
    if has_domain_prefix {
        return hrefs;
    }

    let Some(origin) = origin_of(request_url) else {
        return hrefs;
    };

    hrefs
        .into_iter()
        .map(|href| {
            if href.starts_with('/') {
                format!("{}{}", origin, href)
            } else {
                format!("{}/{}", origin, href)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_links_pass_through() {
        let request = Url::parse("https://example.com/search").unwrap();
        let hrefs = vec!["https://other.com/a".to_string(), "/b".to_string()];
        assert_eq!(apply_domain_prefix(hrefs.clone(), &request, true), hrefs);
    }

    #[test]
    fn test_relative_links_get_origin() {
        let request = Url::parse("http://127.0.0.1:9000/api?q=1").unwrap();
        let hrefs = vec!["/news/1".to_string(), "news/2".to_string()];
        assert_eq!(
            apply_domain_prefix(hrefs, &request, false),
            vec![
                "http://127.0.0.1:9000/news/1".to_string(),
                "http://127.0.0.1:9000/news/2".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let request = Url::parse("https://example.com/").unwrap();
        assert!(apply_domain_prefix(vec![], &request, false).is_empty());
    }
}
