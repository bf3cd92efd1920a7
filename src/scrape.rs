//! HTTP client for load-test metrics endpoints
//!
//! Each running test exposes `http://<host>:<port>/metrics`; this
//! module performs one bounded-timeout fetch of that document. Fetch
//! failures (refused, timed out, non-2xx) are all surfaced as
//! [`ScrapeError`] and handled by the polling loop, never escalated.

use crate::types::Port;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single scrape attempt
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Connection-level failure, including timeouts
    #[error("metrics fetch failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("metrics endpoint returned status {0}")]
    Status(reqwest::StatusCode),
}

impl ScrapeError {
    /// Whether this failure was the request timing out
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

/// Client bound to one metrics host, shared by all collectors
#[derive(Debug, Clone)]
pub struct ScrapeClient {
    client: reqwest::Client,
    host: String,
}

impl ScrapeClient {
    /// Create a client for endpoints on `host`, with a per-request
    /// timeout
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            host: host.into(),
        })
    }

    /// The URL scraped for a given port
    #[must_use]
    pub fn endpoint_url(&self, port: Port) -> String {
        format!("http://{}:{}/metrics", self.host, port)
    }

    /// Fetch one exposition document
    pub async fn fetch(&self, port: Port) -> Result<String, ScrapeError> {
        let response = self.client.get(self.endpoint_url(port)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status));
        }

        Ok(response.text().await?)
    }
}
