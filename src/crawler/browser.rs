//! Headless-browser fetcher for script-rendered search pages
//!
//! Every fetch launches its own browser, loads one page, serializes the DOM
//! and tears the browser down again, whether or not the load succeeded.

use crate::config::HttpConfig;
use crate::crawler::fetcher::Fetcher;
use crate::sites::Strategy;
use crate::FetchError;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;

/// Loads pages in a short-lived headless Chromium
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    user_agent: String,
    timeout: Duration,
}

impl BrowserFetcher {
    pub fn new(config: &HttpConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.browser_timeout_secs),
        }
    }

    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let browser_error = |message: String| FetchError::Browser {
            url: url.to_string(),
            message,
        };

        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.timeout)
            .arg("--ignore-certificate-errors")
            .arg("--incognito")
            .arg(format!("--user-agent={}", self.user_agent))
            .build()
            .map_err(browser_error)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| browser_error(e.to_string()))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let loaded = tokio::time::timeout(self.timeout, load_page(&browser, url)).await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Browser close failed for {}: {}", url, e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Browser process wait failed for {}: {}", url, e);
        }
        if let Err(e) = events.await {
            tracing::debug!("Browser event task ended abnormally: {}", e);
        }

        match loaded {
            Ok(Ok(html)) => Ok(html),
            Ok(Err(e)) => Err(browser_error(e.to_string())),
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

async fn load_page(browser: &Browser, url: &str) -> Result<String, chromiumoxide::error::CdpError> {
    let page = browser.new_page(url).await?;
    page.wait_for_navigation().await?;
    let html = page.content().await?;
    page.close().await?;
    Ok(html)
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, _strategy: Strategy) -> Result<String, FetchError> {
        tracing::debug!("Rendering {} in headless browser", url);
        self.render(url).await
    }
}
