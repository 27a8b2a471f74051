//! HTTP fetcher implementation
//!
//! This module handles all plain HTTP requests for the crawler, including:
//! - The `Fetcher` trait every request goes through
//! - Building HTTP clients with the configured user agent, timeout,
//!   cookie jar and redirect limit
//! - Error classification (timeout, non-2xx status, transport)
//! - Routing `rendered` requests to the browser fetcher
//!
//! Fetchers never retry. Retry budgets belong to the caller.

use crate::config::HttpConfig;
use crate::crawler::browser::BrowserFetcher;
use crate::sites::Strategy;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Retrieves raw page content
///
/// Implementations must be cheap to share behind an `Arc`; one fetcher is
/// created per (site, keyword) run and never shared between runs.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the response body (or rendered DOM)
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to load
    /// * `strategy` - `rendered` loads the page in a browser; the others use HTTP
    async fn fetch(&self, url: &str, strategy: Strategy) -> Result<String, FetchError>;
}

/// Builds an HTTP client with the crawler's settings
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use press_trawl::config::HttpConfig;
/// use press_trawl::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP GET fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an existing client, e.g. one with a shorter timeout for tests
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Single GET; non-2xx responses are errors
    pub async fn get(&self, url: &str) -> Result<String, FetchError> {
        Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, _strategy: Strategy) -> Result<String, FetchError> {
        self.get(url).await
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Routes each request by strategy: browser for `rendered`, HTTP otherwise
pub struct StrategyFetcher {
    http: HttpFetcher,
    browser: BrowserFetcher,
}

impl StrategyFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
            browser: BrowserFetcher::new(config),
        })
    }
}

#[async_trait]
impl Fetcher for StrategyFetcher {
    async fn fetch(&self, url: &str, strategy: Strategy) -> Result<String, FetchError> {
        if strategy.needs_browser() {
            self.browser.fetch(url, strategy).await
        } else {
            self.http.get(url).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&HttpConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_get_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let body = fetcher
            .fetch(&format!("{}/search", server.uri()), Strategy::Direct)
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let result = fetcher.get(&format!("{}/x", server.uri())).await;
        assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let fetcher = HttpFetcher::with_client(client);
        let result = fetcher.get(&format!("{}/slow", server.uri())).await;
        assert!(matches!(result, Err(FetchError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let result = fetcher.get("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
