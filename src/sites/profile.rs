use crate::config::SiteEntry;
use crate::sites::{TimeFilter, UrlTemplate};
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a site's search results are obtained and read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Plain HTTP GET, links scraped from the returned HTML
    Direct,

    /// Plain HTTP GET of a (JSONP-wrapped) JSON endpoint
    Api,

    /// Page loaded in a headless browser, links scraped from the rendered DOM
    Rendered,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Api => "api",
            Self::Rendered => "rendered",
        }
    }

    /// Returns true if fetching needs a browser session
    pub fn needs_browser(&self) -> bool {
        matches!(self, Self::Rendered)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Where article links live inside a search result page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLocator {
    /// `<a>` elements whose class attribute contains this substring
    AnchorClass(String),

    /// A list (or HTML fragment) reached by descending through `path`
    Json { path: Vec<String>, items: JsonItems },
}

/// How to turn the value at the end of a JSON path into links
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonItems {
    /// Every item must carry this string field; a missing field fails the page
    Field(String),

    /// Items carrying this string field contribute a link; others are skipped
    FieldIfPresent(String),

    /// The value is an HTML fragment; scrape anchors with this class substring
    HtmlAnchors(String),
}

/// Everything needed to search one publisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    /// Registry key, e.g. `CNN` or `nypost`
    pub id: String,

    pub strategy: Strategy,

    /// Joins the words of a multi-word keyword, e.g. `+` or `%20`
    pub keyword_joiner: String,

    pub url_template: UrlTemplate,

    pub locator: ContentLocator,

    /// False when the site emits path-only links that need the search origin
    pub has_domain_prefix: bool,

    /// Class substring of the `<div>` that scopes anchor selection
    pub pre_container: Option<String>,
}

impl SiteProfile {
    /// A site scraped from its plain HTML search page
    pub fn direct(id: &str, joiner: &str, template: &str, anchor_class: &str) -> Self {
        Self::new(
            id,
            Strategy::Direct,
            joiner,
            template,
            ContentLocator::AnchorClass(anchor_class.to_string()),
        )
    }

    /// A site whose search page only renders inside a browser
    pub fn rendered(id: &str, joiner: &str, template: &str, anchor_class: &str) -> Self {
        Self::new(
            id,
            Strategy::Rendered,
            joiner,
            template,
            ContentLocator::AnchorClass(anchor_class.to_string()),
        )
    }

    /// A site searched through a JSON endpoint
    pub fn api(id: &str, joiner: &str, template: &str, path: &[&str], items: JsonItems) -> Self {
        Self::new(
            id,
            Strategy::Api,
            joiner,
            template,
            ContentLocator::Json {
                path: path.iter().map(|k| k.to_string()).collect(),
                items,
            },
        )
    }

    fn new(id: &str, strategy: Strategy, joiner: &str, template: &str, locator: ContentLocator) -> Self {
        Self {
            id: id.to_string(),
            strategy,
            keyword_joiner: joiner.to_string(),
            url_template: UrlTemplate::new(template),
            locator,
            has_domain_prefix: true,
            pre_container: None,
        }
    }

    /// Narrows anchor selection to a container `<div>`
    pub fn within(mut self, container_class: &str) -> Self {
        self.pre_container = Some(container_class.to_string());
        self
    }

    /// Marks the site as emitting path-only article links
    pub fn relative_links(mut self) -> Self {
        self.has_domain_prefix = false;
        self
    }

    /// Joins the whitespace-separated words of `keyword` with the site's joiner
    ///
    /// # Examples
    ///
    /// ```
    /// use press_trawl::SiteRegistry;
    ///
    /// let registry = SiteRegistry::builtin();
    /// let fox = registry.profile("foxnews").unwrap();
    /// assert_eq!(fox.encode_keyword("gun  policy"), "gun%20policy");
    /// ```
    pub fn encode_keyword(&self, keyword: &str) -> String {
        keyword
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(&self.keyword_joiner)
    }

    /// The search URL for one page of results
    pub fn search_url(&self, page: u32, encoded_keyword: &str, filter: &TimeFilter) -> String {
        self.url_template.render(page, encoded_keyword, filter)
    }

    /// Checks that the profile is internally consistent
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidSite {
            site: self.id.clone(),
            message,
        };

        if self.id.trim().is_empty() {
            return Err(ConfigError::Validation("site id cannot be empty".to_string()));
        }

        if self.keyword_joiner.is_empty() {
            return Err(invalid("keyword joiner cannot be empty".to_string()));
        }

        let template = self.url_template.as_str();
        if !(template.starts_with("http://") || template.starts_with("https://")) {
            return Err(invalid(format!("template must be an http(s) URL, got '{}'", template)));
        }

        let unknown = self.url_template.unknown_placeholders();
        if !unknown.is_empty() {
            return Err(invalid(format!("unknown template placeholders: {}", unknown.join(", "))));
        }

        match (&self.strategy, &self.locator) {
            (Strategy::Direct | Strategy::Rendered, ContentLocator::AnchorClass(_)) => {}
            (Strategy::Api, ContentLocator::Json { path, .. }) => {
                if path.iter().any(|k| k.is_empty()) {
                    return Err(invalid("JSON path keys cannot be empty".to_string()));
                }
            }
            (strategy, _) => {
                return Err(invalid(format!(
                    "content locator does not fit the {} strategy",
                    strategy
                )));
            }
        }

        Ok(())
    }
}

impl TryFrom<&SiteEntry> for SiteProfile {
    type Error = ConfigError;

    fn try_from(entry: &SiteEntry) -> Result<Self, Self::Error> {
        let invalid = |message: &str| ConfigError::InvalidSite {
            site: entry.id.clone(),
            message: message.to_string(),
        };

        let locator = match entry.strategy {
            Strategy::Direct | Strategy::Rendered => ContentLocator::AnchorClass(
                entry
                    .anchor_class
                    .clone()
                    .ok_or_else(|| invalid("anchor-class is required for HTML strategies"))?,
            ),
            Strategy::Api => {
                let items = if entry.json_html {
                    JsonItems::HtmlAnchors(
                        entry
                            .anchor_class
                            .clone()
                            .ok_or_else(|| invalid("json-html needs anchor-class"))?,
                    )
                } else {
                    let field = entry
                        .json_field
                        .clone()
                        .ok_or_else(|| invalid("json-field is required for the api strategy"))?;
                    if entry.json_field_required {
                        JsonItems::Field(field)
                    } else {
                        JsonItems::FieldIfPresent(field)
                    }
                };
                ContentLocator::Json {
                    path: entry.json_path.clone(),
                    items,
                }
            }
        };

        let profile = Self {
            id: entry.id.clone(),
            strategy: entry.strategy,
            keyword_joiner: entry.joiner.clone(),
            url_template: UrlTemplate::new(entry.template.clone()),
            locator,
            has_domain_prefix: entry.has_domain_prefix,
            pre_container: entry.pre_container.clone(),
        };
        profile.validate()?;
        Ok(profile)
    }
}
