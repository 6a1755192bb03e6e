//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with timeouts
//! - GET requests returning the raw page body
//! - Classifying transport failures and non-2xx responses
//!
//! There are no retries. Every failure is terminal for the page it occurred on.

use crate::config::CrawlerConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Network failure for a single page
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timeout for {url}")]
    Timeout { url: String },

    #[error("connection failed for {url}: {cause}")]
    Connect { url: String, cause: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("network error for {url}: {cause}")]
    Network { url: String, cause: String },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Status { url, .. }
            | Self::Network { url, .. } => url,
        }
    }

    /// Classifies a reqwest error the same way for every page
    fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            Self::Timeout { url }
        } else if error.is_connect() {
            Self::Connect {
                url,
                cause: error.to_string(),
            }
        } else {
            Self::Network {
                url,
                cause: error.to_string(),
            }
        }
    }
}

/// Issues a single GET and hands back the raw document body
///
/// The coordinator is generic over this trait so the fan-out and join can be
/// driven by something other than a live HTTP client.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// No custom headers, cookies or authentication are sent.
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::config::CrawlerConfig;
/// use catalog_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL and returns its body
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx | body text |
/// | Any other status | `FetchError::Status` |
/// | Timeout | `FetchError::Timeout` |
/// | Connection refused, DNS, TLS | `FetchError::Connect` |
/// | Body read failure, other transport errors | `FetchError::Network` |
pub async fn fetch_url(client: &Client, url: &Url) -> Result<String, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))
}
