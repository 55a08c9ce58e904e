//! Detail stage: resolves each link into a detail record

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{extract_title, PageSelectors};
use crate::crawler::retry::RetryPolicy;
use crate::crawler::signal::StageSignal;
use crate::model::{Detail, Link};
use crate::FetchError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Fetches a detail page and reads its title
pub struct DetailResolver {
    fetcher: PageFetcher,
    selectors: Arc<PageSelectors>,
    retry: RetryPolicy,
}

impl DetailResolver {
    /// Creates a resolver that fetches each page exactly once
    pub fn new(fetcher: PageFetcher, selectors: Arc<PageSelectors>) -> Self {
        Self {
            fetcher,
            selectors,
            retry: RetryPolicy::no_retry(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn resolve(
        &self,
        link: &Link,
        scope: &CancellationToken,
    ) -> Result<Detail, FetchError> {
        let fetcher = &self.fetcher;
        let fetched = self
            .retry
            .run_while(
                scope,
                || fetcher.fetch(link.url(), scope),
                FetchError::is_transient,
                |attempt, error: &FetchError| {
                    if !error.is_cancelled() {
                        tracing::warn!(url = link.url(), attempt, error = %error, "detail fetch failed");
                    }
                },
            )
            .await?;

        let title = extract_title(&fetched.body, &self.selectors);
        Ok(Detail::from_link(link, title))
    }
}

/// Runs the detail stage until the link stream closes, the end-of-listing
/// link arrives, an error occurs, or `scope` is cancelled
///
/// The end-of-listing link marks the empty page that ended the walk; it is
/// not an item, so it is not fetched and produces no detail. The stage stops
/// on it without waiting for the stream to close. A run therefore yields one
/// detail per listed item, not one per received link.
///
/// `details` is dropped when this returns, closing the detail stream on
/// every exit path; links still buffered in `links` are discarded. A fatal
/// fetch error fires `signal`.
pub async fn run_detail(
    resolver: DetailResolver,
    mut links: mpsc::Receiver<Link>,
    details: mpsc::Sender<Detail>,
    signal: StageSignal,
    scope: CancellationToken,
) {
    loop {
        let link = tokio::select! {
            received = links.recv() => match received {
                Some(link) => link,
                None => {
                    tracing::info!("link stream closed");
                    break;
                }
            },
            _ = scope.cancelled() => {
                tracing::debug!("detail cancelled");
                break;
            }
        };

        if let Link::EndOfListing { page, .. } = &link {
            tracing::info!(page, "end of listing reached");
            break;
        }

        let detail = match resolver.resolve(&link, &scope).await {
            Ok(detail) => detail,
            Err(error) if error.is_cancelled() => {
                tracing::debug!("detail cancelled");
                break;
            }
            Err(error) => {
                tracing::error!(from = %signal.stage(), error = %error, "problem");
                signal.fail(error.into());
                break;
            }
        };

        tokio::select! {
            sent = details.send(detail) => {
                if sent.is_err() {
                    tracing::debug!("detail stream closed by consumer");
                    break;
                }
            }
            _ = scope.cancelled() => {
                tracing::debug!("detail cancelled");
                break;
            }
        }
    }
}
