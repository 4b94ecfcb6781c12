//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with timeouts and user agent
//! - GET requests for index and detail pages
//! - Error classification into `FetchFailed`
//!
//! The orchestrator only sees the `PageFetcher` trait, so tests can drive it
//! with fakes that count calls or delay responses.

use crate::config::CrawlerConfig;
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Source of HTML documents
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns the response body
    ///
    /// Any failure (network, timeout, non-2xx status) is a
    /// `HarvestError::FetchFailed` carrying the URL.
    async fn fetch(&self, url: &Url) -> Result<String, HarvestError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent and timeouts)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use auto_harvest::config::CrawlerConfig;
/// use auto_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed fetcher sharing one connection pool across all tasks
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, HarvestError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_failed(url, classify_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(url, format!("HTTP {}", status.as_u16())));
        }

        response
            .text()
            .await
            .map_err(|e| fetch_failed(url, format!("failed to read body: {}", classify_error(&e))))
    }
}

fn fetch_failed(url: &Url, reason: String) -> HarvestError {
    HarvestError::FetchFailed {
        url: url.to_string(),
        reason,
    }
}

/// Classifies a reqwest error into a short reason
fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else {
        error.to_string()
    }
}
