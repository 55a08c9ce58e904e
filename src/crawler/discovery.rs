//! Discovery stage: walks listing pages 1, 2, 3, ... and emits links
//!
//! [`ListingWalker`] is the page sequence: each call yields the links of one
//! listing page, and the walk ends after the first page with no items
//! (which yields a single end-of-listing link). [`run_discovery`] drives a
//! walker and feeds its links into the pipeline.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{extract_item_hrefs, PageSelectors};
use crate::crawler::retry::RetryPolicy;
use crate::crawler::signal::StageSignal;
use crate::model::Link;
use crate::url::SiteRoot;
use crate::FetchError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Lazy sequence of listing pages for one crawl run
pub struct ListingWalker {
    site: SiteRoot,
    fetcher: PageFetcher,
    selectors: Arc<PageSelectors>,
    retry: RetryPolicy,
    next_page: u32,
    max_pages: Option<u32>,
    finished: bool,
}

impl ListingWalker {
    pub fn new(
        site: SiteRoot,
        fetcher: PageFetcher,
        selectors: Arc<PageSelectors>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            site,
            fetcher,
            selectors,
            retry,
            next_page: 1,
            max_pages: None,
            finished: false,
        }
    }

    /// Stops the walk after `max_pages` listing pages (0 = no limit)
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = (max_pages > 0).then_some(max_pages);
        self
    }

    /// The page the next call will fetch
    pub fn next_page_number(&self) -> u32 {
        self.next_page
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fetches the next listing page and returns its links
    ///
    /// Returns `Ok(None)` once the walk is over. A page with items yields one
    /// `Link::Item` per item in document order; the first page without items
    /// yields a single `Link::EndOfListing` and finishes the walk. An error
    /// also finishes the walk.
    pub async fn next_links(
        &mut self,
        scope: &CancellationToken,
    ) -> Result<Option<Vec<Link>>, FetchError> {
        if self.finished {
            return Ok(None);
        }

        if let Some(max_pages) = self.max_pages {
            if self.next_page > max_pages {
                tracing::info!(max_pages, "page limit reached");
                self.finished = true;
                return Ok(None);
            }
        }

        let page = self.next_page;
        let url = self.site.page_url(page);
        tracing::info!(page, url = %url, "target page");

        let fetcher = &self.fetcher;
        let fetched = self
            .retry
            .run_while(
                scope,
                || fetcher.fetch(&url, scope),
                FetchError::is_transient,
                |attempt, error: &FetchError| {
                    if !error.is_cancelled() {
                        tracing::warn!(page, attempt, error = %error, "listing fetch failed");
                    }
                },
            )
            .await;

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(error) => {
                self.finished = true;
                return Err(error);
            }
        };

        let hrefs = extract_item_hrefs(&fetched.body, &self.selectors);
        tracing::debug!(
            page,
            status = fetched.status_code,
            items = hrefs.len(),
            "listing page parsed"
        );

        if hrefs.is_empty() {
            self.finished = true;
            return Ok(Some(vec![Link::end_of_listing(url, page)]));
        }

        let links = hrefs
            .into_iter()
            .enumerate()
            .filter_map(|(index, href)| {
                let resolved = href.as_deref().and_then(|href| self.site.resolve(href));
                if resolved.is_none() {
                    tracing::warn!(page, item = index + 1, href = ?href, "skipping item without usable link");
                }
                resolved
            })
            .map(|resolved| Link::item(resolved, page))
            .collect();

        self.next_page += 1;
        Ok(Some(links))
    }
}

/// Runs the discovery stage until the listing ends, an error occurs, or
/// `scope` is cancelled
///
/// `links` is dropped when this returns, which closes the link stream on
/// every exit path. A fatal fetch error fires `signal`; cancellation and a
/// consumer that went away end the stage quietly.
pub async fn run_discovery(
    mut walker: ListingWalker,
    links: mpsc::Sender<Link>,
    signal: StageSignal,
    scope: CancellationToken,
) {
    loop {
        let page_links = match walker.next_links(&scope).await {
            Ok(Some(page_links)) => page_links,
            Ok(None) => {
                tracing::info!("listing walk complete");
                break;
            }
            Err(error) if error.is_cancelled() => {
                tracing::debug!("discovery cancelled");
                break;
            }
            Err(error) => {
                tracing::error!(from = %signal.stage(), error = %error, "problem");
                signal.fail(error.into());
                break;
            }
        };

        for link in page_links {
            tokio::select! {
                sent = links.send(link) => {
                    if sent.is_err() {
                        tracing::debug!("link stream closed by consumer");
                        return;
                    }
                }
                _ = scope.cancelled() => {
                    tracing::debug!("discovery cancelled");
                    return;
                }
            }
        }
    }
}
