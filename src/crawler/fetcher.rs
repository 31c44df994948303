//! HTTP fetcher implementation
//!
//! The fetch workers only depend on the [`Fetch`] trait: a URL goes in, the
//! raw document bytes (or an error) come out. [`HttpFetcher`] is the reqwest
//! implementation used by the binary; tests plug in their own.

use crate::config::UserAgentConfig;
use crate::{Result, TrawlError};
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;

/// Capability for downloading a document
///
/// Any error is treated by the caller as a lost URL; implementations should
/// not retry on their own.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use wiki_trawler::config::UserAgentConfig;
/// use wiki_trawler::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "WikiTrawler".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches documents over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client identifying itself per `config`
    pub fn new(config: &UserAgentConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    /// Sends a GET request and returns the body of a successful response
    ///
    /// Transport failures map to [`TrawlError::Http`], non-2xx responses to
    /// [`TrawlError::HttpStatus`].
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| TrawlError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| TrawlError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(body.to_vec())
    }
}
