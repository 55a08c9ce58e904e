//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent
//! - GET requests bounded by a per-request timeout
//! - Aborting in-flight requests when the owning stage is cancelled
//! - Error classification

use crate::config::FetchConfig;
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// The per-request timeout is enforced by [`PageFetcher`], not by the
/// client, so that it also covers reading the body.
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with a per-request timeout under a cancellable scope
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?, config.timeout()))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches `url` with a GET request
    ///
    /// The request gets its own timeout, nested inside `scope`: when `scope`
    /// is cancelled the in-flight request is dropped and
    /// `FetchError::Cancelled` is returned. Any HTTP status counts as a
    /// response; the caller decides what an error page means.
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Timeout elapsed | `Timeout` |
    /// | Connection refused / DNS | `Connect` |
    /// | Malformed URL | `Build` |
    /// | Other transport failure | `Request` |
    /// | Body unreadable | `Body` |
    /// | Scope cancelled | `Cancelled` |
    ///
    /// Only `Timeout`, `Connect` and `Request` are worth retrying
    /// (`FetchError::is_transient`); a truncated body fails at once.
    pub async fn fetch(
        &self,
        url: &str,
        scope: &CancellationToken,
    ) -> Result<FetchedPage, FetchError> {
        let request = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| classify_error(url, e))?;

            let status_code = response.status().as_u16();
            if response.url().as_str().trim_end_matches('/') != url.trim_end_matches('/') {
                tracing::debug!(url, final_url = %response.url(), "followed redirect");
            }

            let body = response.text().await.map_err(|source| FetchError::Body {
                url: url.to_string(),
                source,
            })?;

            Ok::<_, FetchError>(FetchedPage {
                status_code,
                body,
            })
        };

        tokio::select! {
            biased;
            _ = scope.cancelled() => Err(FetchError::Cancelled {
                url: url.to_string(),
            }),
            result = tokio::time::timeout(self.timeout, request) => match result {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::Timeout {
                    url: url.to_string(),
                    after: self.timeout,
                }),
            },
        }
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if error.is_timeout() {
        FetchError::Timeout {
            url,
            after: Duration::ZERO,
        }
    } else if error.is_builder() {
        FetchError::Build { url, source: error }
    } else if error.is_connect() {
        FetchError::Connect { url, source: error }
    } else {
        FetchError::Request { url, source: error }
    }
}
