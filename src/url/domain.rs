use url::Url;

/// Returns `scheme://host[:port]` for a URL
///
/// Search endpoints that hand back path-only links are resolved against this
/// origin. Returns None for opaque origins (e.g. `data:` URLs).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use press_trawl::url::origin_of;
///
/// let url = Url::parse("https://nypost.com/search/gun/page/2/").unwrap();
/// assert_eq!(origin_of(&url), Some("https://nypost.com".to_string()));
/// ```
pub fn origin_of(url: &Url) -> Option<String> {
    let origin = url.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}
