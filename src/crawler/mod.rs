//! Crawler module for search paging and article harvesting
//!
//! This module contains the core crawling logic, including:
//! - Fetching over HTTP or through a headless browser
//! - Extracting article links from search result pages
//! - Paging through results with bounded retries
//! - Extracting and normalizing article content
//! - Running sessions and batches

mod article;
mod browser;
mod content;
mod coordinator;
mod extractor;
mod fetcher;
mod pagination;
mod request;
mod session;

#[cfg(test)]
mod testing;

pub use article::ArticleProcessor;
pub use browser::BrowserFetcher;
pub use content::{parse_date, ArticleContent, ContentExtractor, HtmlContentExtractor};
pub use coordinator::{run_crawl, Coordinator, FetcherFactory};
pub use extractor::extract_urls;
pub use fetcher::{build_http_client, Fetcher, HttpFetcher, StrategyFetcher};
pub use pagination::{Discovery, PaginationController};
pub use request::CrawlRequest;
pub use session::CrawlSession;
