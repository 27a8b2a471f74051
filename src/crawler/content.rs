//! Article content extraction
//!
//! This module pulls the fields an [`ArticleRecord`](crate::storage::ArticleRecord)
//! needs out of an article page. Title and body go through extrablatt's
//! newspaper extractor, which scores candidate nodes and leaves navigation
//! and footer text behind:
//! - Title: `og:title`, then extrablatt's title, then the first `<h1>`
//! - Body: extrablatt's article text, or the paragraphs inside `<article>`
//! - Publish date: metadata tags, `<time datetime>`, JSON-LD, or a
//!   `/YYYY/MM/DD/` segment in the URL path
//!
//! Missing fields come back as `None`; normalization to `N/A` happens when
//! the record is built.

use chrono::{DateTime, NaiveDate};
use extrablatt::select::document::Document;
use extrablatt::{DefaultExtractor, Extractor, Language};
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

/// Fields extracted from one article page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleContent {
    pub title: Option<String>,
    pub body_text: Option<String>,
    pub published: Option<NaiveDate>,
}

/// Turns an article page into its title, body and publish date
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, html: &str, url: &Url) -> ArticleContent;
}

/// Meta tags that carry a publish timestamp, most specific first
const DATE_META_SELECTORS: &[&str] = &[
    r#"meta[property="article:published_time"]"#,
    r#"meta[name="article:published_time"]"#,
    r#"meta[property="og:published_time"]"#,
    r#"meta[name="pubdate"]"#,
    r#"meta[name="publishdate"]"#,
    r#"meta[name="date"]"#,
    r#"meta[itemprop="datePublished"]"#,
];

/// Extractor for ordinary server-rendered news pages
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlContentExtractor;

impl ContentExtractor for HtmlContentExtractor {
    fn extract(&self, html: &str, url: &Url) -> ArticleContent {
        let document = Html::parse_document(html);
        let newspaper = Document::from(html);
        ArticleContent {
            title: extract_title(&document, &newspaper),
            body_text: extract_body(&document, &newspaper),
            published: extract_date(&document).or_else(|| date_from_path(url)),
        }
    }
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

fn first_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses whitespace per paragraph and separates paragraphs by a blank line
fn join_paragraphs<'a>(paragraphs: impl Iterator<Item = &'a str>) -> Option<String> {
    let found: Vec<String> = paragraphs
        .map(collapse_whitespace)
        .filter(|text| !text.is_empty())
        .collect();
    if found.is_empty() {
        None
    } else {
        Some(found.join("\n\n"))
    }
}

fn extract_title(document: &Html, newspaper: &Document) -> Option<String> {
    first_attr(document, r#"meta[property="og:title"]"#, "content")
        .or_else(|| {
            DefaultExtractor
                .title(newspaper)
                .map(|title| collapse_whitespace(&title))
                .filter(|title| !title.is_empty())
        })
        .or_else(|| first_text(document, "h1"))
}

fn extract_body(document: &Html, newspaper: &Document) -> Option<String> {
    DefaultExtractor
        .text(newspaper, Language::English)
        .and_then(|text| join_paragraphs(text.lines()))
        .or_else(|| article_paragraphs(document))
}

fn article_paragraphs(document: &Html) -> Option<String> {
    let selector = Selector::parse("article p").ok()?;
    let texts: Vec<String> = document
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .collect();
    join_paragraphs(texts.iter().map(String::as_str))
}

fn extract_date(document: &Html) -> Option<NaiveDate> {
    DATE_META_SELECTORS
        .iter()
        .filter_map(|css| first_attr(document, css, "content"))
        .find_map(|value| parse_date(&value))
        .or_else(|| {
            first_attr(document, r#"[itemprop="datePublished"]"#, "datetime")
                .and_then(|value| parse_date(&value))
        })
        .or_else(|| first_attr(document, "time[datetime]", "datetime").and_then(|v| parse_date(&v)))
        .or_else(|| date_from_json_ld(document))
}

fn date_from_json_ld(document: &Html) -> Option<NaiveDate> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
    document
        .select(&selector)
        .filter_map(|script| serde_json::from_str::<Value>(&script.text().collect::<String>()).ok())
        .find_map(|value| find_date_published(&value))
}

/// Searches a JSON-LD value (including `@graph` arrays) for `datePublished`
fn find_date_published(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Object(map) => map
            .get("datePublished")
            .and_then(Value::as_str)
            .and_then(parse_date)
            .or_else(|| map.values().find_map(find_date_published)),
        Value::Array(items) => items.iter().find_map(find_date_published),
        _ => None,
    }
}

/// Looks for consecutive `YYYY/MM/DD` path segments
fn date_from_path(url: &Url) -> Option<NaiveDate> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    segments.windows(3).find_map(|window| {
        let [year, month, day] = window else {
            return None;
        };
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return None;
        }
        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
    })
}

/// Parses the timestamp formats news sites put in their metadata
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.date_naive());
    }
    if let Some(prefix) = value.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }
    value
        .get(..8)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y%m%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_article() {
        let html = r#"
            <html><head>
                <title>Site | Headline</title>
                <meta property="og:title" content="The Headline">
                <meta property="article:published_time" content="2021-04-05T10:00:00-04:00">
            </head><body>
                <nav><p>Subscribe now for unlimited access</p></nav>
                <article>
                    <h1>Headline</h1>
                    <p>The council voted on the new   policy after a long debate in the chamber.</p>
                    <p>It will take effect at the start of next year, officials said on Monday.</p>
                </article>
                <footer><p>Copyright and all rights reserved</p></footer>
            </body></html>
        "#;
        let content = HtmlContentExtractor.extract(html, &url("https://t.test/a"));
        assert_eq!(content.title.as_deref(), Some("The Headline"));
        let body = content.body_text.unwrap();
        assert!(body.contains("The council voted on the new policy"));
        assert!(body.contains("officials said on Monday."));
        assert!(!body.contains("Subscribe now"));
        assert!(!body.contains("Copyright"));
        assert_eq!(content.published, Some(ymd(2021, 4, 5)));
    }

    #[test]
    fn test_title_falls_back_to_heading() {
        let content = HtmlContentExtractor.extract(
            "<html><body><h1> Only   Heading </h1></body></html>",
            &url("https://t.test/a"),
        );
        assert_eq!(content.title.as_deref(), Some("Only Heading"));
    }

    #[test]
    fn test_short_article_keeps_its_paragraphs() {
        let content = HtmlContentExtractor.extract(
            "<html><body><article><p>Loose text</p><p> </p></article></body></html>",
            &url("https://t.test/a"),
        );
        assert!(content.body_text.unwrap().contains("Loose text"));
    }

    #[test]
    fn test_empty_page() {
        let content = HtmlContentExtractor.extract("<html></html>", &url("https://t.test/a"));
        assert_eq!(content, ArticleContent::default());
    }

    #[test]
    fn test_date_from_time_element() {
        let html = r#"<body><time datetime="2020-12-31">Dec 31</time></body>"#;
        let content = HtmlContentExtractor.extract(html, &url("https://t.test/a"));
        assert_eq!(content.published, Some(ymd(2020, 12, 31)));
    }

    #[test]
    fn test_date_from_json_ld_graph() {
        let html = r#"
            <script type="application/ld+json">
            {"@context":"https://schema.org","@graph":[
                {"@type":"WebSite"},
                {"@type":"NewsArticle","datePublished":"2019-07-08T12:00:00Z"}
            ]}
            </script>
        "#;
        let content = HtmlContentExtractor.extract(html, &url("https://t.test/a"));
        assert_eq!(content.published, Some(ymd(2019, 7, 8)));
    }

    #[test]
    fn test_date_from_url_path() {
        let content = HtmlContentExtractor.extract(
            "<html></html>",
            &url("https://nypost.com/2021/03/09/some-story/"),
        );
        assert_eq!(content.published, Some(ymd(2021, 3, 9)));
    }

    #[test]
    fn test_invalid_path_date_ignored() {
        let content =
            HtmlContentExtractor.extract("<html></html>", &url("https://t.test/2021/13/40/x"));
        assert_eq!(content.published, None);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2021-01-02"), Some(ymd(2021, 1, 2)));
        assert_eq!(parse_date("2021-01-02T23:59:00+05:00"), Some(ymd(2021, 1, 2)));
        assert_eq!(parse_date("2021-01-02 08:00:00"), Some(ymd(2021, 1, 2)));
        assert_eq!(parse_date("20210102"), Some(ymd(2021, 1, 2)));
        assert_eq!(parse_date("Tue, 1 Jul 2003 10:52:37 +0200"), Some(ymd(2003, 7, 1)));
        assert_eq!(parse_date("yesterday"), None);
    }
}
