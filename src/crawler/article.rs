//! Article processing: download one article and build its record

use crate::crawler::content::ContentExtractor;
use crate::crawler::fetcher::Fetcher;
use crate::sites::Strategy;
use crate::storage::ArticleRecord;
use crate::ParseError;
use url::Url;

/// Downloads articles and turns them into normalized records
///
/// Articles are always fetched over plain HTTP, whatever strategy the
/// site's search page needs.
pub struct ArticleProcessor<'a> {
    fetcher: &'a dyn Fetcher,
    extractor: &'a dyn ContentExtractor,
}

impl<'a> ArticleProcessor<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, extractor: &'a dyn ContentExtractor) -> Self {
        Self { fetcher, extractor }
    }

    /// Fetches `url` and extracts title, body and publish date
    ///
    /// # Returns
    ///
    /// * `Ok(ArticleRecord)` - Record with `N/A` in place of missing fields
    /// * `Err(ParseError)` - The URL was invalid, the download failed, or the
    ///   server returned an empty document
    pub async fn process(&self, url: &str) -> Result<ArticleRecord, ParseError> {
        let parsed = Url::parse(url).map_err(|source| ParseError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let html = self.fetcher.fetch(url, Strategy::Direct).await?;
        if html.trim().is_empty() {
            return Err(ParseError::Content {
                url: url.to_string(),
                message: "empty document".to_string(),
            });
        }

        let content = self.extractor.extract(&html, &parsed);
        Ok(ArticleRecord::normalized(
            url,
            content.title.as_deref(),
            content.body_text.as_deref(),
            content.published,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::content::HtmlContentExtractor;
    use crate::crawler::testing::ScriptedFetcher;
    use crate::storage::NOT_AVAILABLE;
    use crate::FetchError;

    #[tokio::test]
    async fn test_process_builds_record() {
        let fetcher = ScriptedFetcher::new(vec![Ok(r#"
            <html><head><title>Tariffs rise</title></head>
            <body><article><p>Prices went up.</p></article></body></html>
        "#
        .to_string())]);
        let processor = ArticleProcessor::new(&fetcher, &HtmlContentExtractor);

        let record = processor
            .process("https://nypost.com/2022/05/01/tariffs/")
            .await
            .unwrap();

        assert_eq!(record.url, "https://nypost.com/2022/05/01/tariffs/");
        assert_eq!(record.title, "Tariffs rise");
        assert_eq!(record.body_text, "Prices went up.");
        assert_eq!(record.published_time, "2022-05-01");
    }

    #[tokio::test]
    async fn test_process_normalizes_missing_fields() {
        let fetcher = ScriptedFetcher::new(vec![Ok("<html><body></body></html>".to_string())]);
        let processor = ArticleProcessor::new(&fetcher, &HtmlContentExtractor);

        let record = processor.process("https://t.test/story").await.unwrap();

        assert_eq!(record.title, NOT_AVAILABLE);
        assert_eq!(record.body_text, NOT_AVAILABLE);
        assert_eq!(record.published_time, NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn test_process_surfaces_fetch_failure() {
        let fetcher = ScriptedFetcher::new(vec![Err(FetchError::Status {
            url: "https://t.test/story".to_string(),
            status: 404,
        })]);
        let processor = ArticleProcessor::new(&fetcher, &HtmlContentExtractor);

        let result = processor.process("https://t.test/story").await;
        assert!(matches!(result, Err(ParseError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_process_rejects_invalid_url_without_fetching() {
        let fetcher = ScriptedFetcher::new(Vec::new());
        let processor = ArticleProcessor::new(&fetcher, &HtmlContentExtractor);

        let result = processor.process("/relative/only").await;
        assert!(matches!(result, Err(ParseError::InvalidUrl { .. })));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_process_rejects_blank_document() {
        let fetcher = ScriptedFetcher::new(vec![Ok("   ".to_string())]);
        let processor = ArticleProcessor::new(&fetcher, &HtmlContentExtractor);

        let result = processor.process("https://t.test/story").await;
        assert!(matches!(result, Err(ParseError::Content { .. })));
    }
}
