//! Crawler module for the two-stage listing pipeline
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with per-request timeouts and retry
//! - HTML extraction of listing items and detail titles
//! - The discovery and detail stages and their failure signals
//! - Overall pipeline coordination

mod coordinator;
mod detail;
mod discovery;
mod fetcher;
mod parser;
mod retry;
mod signal;

pub use coordinator::{run_crawl, Coordinator};
pub use detail::{run_detail, DetailResolver};
pub use discovery::{run_discovery, ListingWalker};
pub use fetcher::{build_http_client, FetchedPage, PageFetcher};
pub use parser::{extract_item_hrefs, extract_title, PageSelectors};
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
pub use signal::{Stage, StageSignal};

use crate::config::Config;
use crate::output::{CrawlStats, DetailSink};
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and build the HTTP client
/// 2. Start the discovery stage on listing page 1
/// 3. Start the detail stage on the link stream
/// 4. Hand every detail to `sink` in listing order
/// 5. Join both stages and report how the run ended
///
/// # Returns
///
/// * `Ok(CrawlStats)` - The listing was walked to its end
/// * `Err(CrawlError)` - A stage failed, or the configuration was invalid
pub async fn crawl<S>(config: Config, sink: &mut S) -> Result<CrawlStats, CrawlError>
where
    S: DetailSink + ?Sized,
{
    run_crawl(config, sink).await
}
