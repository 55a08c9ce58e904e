//! Crawler coordinator - wires the stages together and drives a run
//!
//! The coordinator:
//! - Builds the discovery and detail stages and the channels between them
//! - Spawns both stages under child scopes of one shutdown token
//! - Hands every detail to the output sink in pipeline order
//! - Watches both stage failure signals and decides how the run ends
//! - Joins both stages before returning, on every exit path

use crate::config::{validate, Config};
use crate::crawler::detail::{run_detail, DetailResolver};
use crate::crawler::discovery::{run_discovery, ListingWalker};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::PageSelectors;
use crate::crawler::retry::RetryPolicy;
use crate::crawler::signal::{Stage, StageSignal};
use crate::output::{CrawlStats, DetailSink, OutputError};
use crate::url::SiteRoot;
use crate::CrawlError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Why the coordinator stopped waiting on the stages
enum Exit {
    /// The detail stream closed
    Complete,
    /// A stage fired its failure signal
    StageFailed(Stage),
    /// The shutdown token was cancelled from outside
    Interrupted,
    /// The sink rejected a detail
    Output(OutputError),
}

/// Main pipeline coordinator
pub struct Coordinator {
    config: Config,
    site: SiteRoot,
    fetcher: PageFetcher,
    selectors: Arc<PageSelectors>,
    shutdown: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - Invalid configuration or HTTP client setup failure
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        validate(&config)?;

        let site = SiteRoot::from_config(&config.site)?;
        let fetcher = PageFetcher::from_config(&config.fetch)?;
        let selectors = Arc::new(PageSelectors::from_config(&config.selectors)?);

        Ok(Self {
            config,
            site,
            fetcher,
            selectors,
            shutdown: CancellationToken::new(),
        })
    }

    /// Token that stops the whole run when cancelled
    ///
    /// Both stage scopes are children of this token, so cancelling it aborts
    /// in-flight requests and pending retry delays.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs the pipeline to completion
    ///
    /// Returns statistics when the listing was walked to its end and every
    /// link was resolved. Returns `CrawlError::StageFailed` naming the stage
    /// when either stage hit a fatal error, and `CrawlError::Interrupted`
    /// when the shutdown token was cancelled from outside. Details produced
    /// before a failure are still handed to `sink`.
    pub async fn run<S>(self, sink: &mut S) -> Result<CrawlStats, CrawlError>
    where
        S: DetailSink + ?Sized,
    {
        let capacity = self.config.pipeline.channel_capacity;
        let (link_tx, link_rx) = mpsc::channel(capacity);
        let (detail_tx, mut detail_rx) = mpsc::channel(capacity);

        let discovery_signal = StageSignal::new(Stage::Discovery);
        let detail_signal = StageSignal::new(Stage::Detail);

        let walker = ListingWalker::new(
            self.site.clone(),
            self.fetcher.clone(),
            Arc::clone(&self.selectors),
            RetryPolicy::from_config(&self.config.retry),
        )
        .with_max_pages(self.config.pipeline.max_pages);

        let mut resolver = DetailResolver::new(self.fetcher.clone(), Arc::clone(&self.selectors));
        if self.config.retry.retry_detail {
            resolver = resolver.with_retry(RetryPolicy::from_config(&self.config.retry));
        }

        let discovery = tokio::spawn(
            run_discovery(
                walker,
                link_tx,
                discovery_signal.clone(),
                self.shutdown.child_token(),
            )
            .instrument(tracing::info_span!("stage", name = %Stage::Discovery)),
        );
        let detail = tokio::spawn(
            run_detail(
                resolver,
                link_rx,
                detail_tx,
                detail_signal.clone(),
                self.shutdown.child_token(),
            )
            .instrument(tracing::info_span!("stage", name = %Stage::Detail)),
        );

        let mut stats = CrawlStats::start();

        let exit = loop {
            tokio::select! {
                biased;
                received = detail_rx.recv() => match received {
                    Some(detail) => {
                        stats.record(&detail);
                        if let Err(e) = sink.accept(&detail) {
                            break Exit::Output(e);
                        }
                    }
                    None => break Exit::Complete,
                },
                _ = discovery_signal.failed() => break Exit::StageFailed(Stage::Discovery),
                _ = detail_signal.failed() => break Exit::StageFailed(Stage::Detail),
                _ = self.shutdown.cancelled() => break Exit::Interrupted,
            }
        };

        // Stop whichever stage is still running before joining
        let interrupted = self.shutdown.is_cancelled();
        self.shutdown.cancel();

        let panicked = join_stages([(Stage::Discovery, discovery), (Stage::Detail, detail)]).await;

        let detail_failed_first = matches!(exit, Exit::StageFailed(Stage::Detail));

        // Details already sent before the stages stopped are still results
        let mut output_error = match exit {
            Exit::Output(e) => Some(e),
            _ => None,
        };
        if output_error.is_none() {
            while let Some(detail) = detail_rx.recv().await {
                stats.record(&detail);
                if let Err(e) = sink.accept(&detail) {
                    output_error = Some(e);
                    break;
                }
            }
        }

        let signals = if detail_failed_first {
            [&detail_signal, &discovery_signal]
        } else {
            [&discovery_signal, &detail_signal]
        };
        let failure = signals
            .into_iter()
            .find_map(|signal| {
                signal.take_reason().map(|source| CrawlError::StageFailed {
                    stage: signal.stage(),
                    source: Box::new(source),
                })
            })
            .or_else(|| panicked.map(|stage| CrawlError::StagePanicked { stage }));

        if let Some(failure) = failure {
            tracing::error!(
                from = %failure.stage().map_or("pipeline", |stage| stage.as_str()),
                reason = %failure,
                details = stats.details,
                "exit crawler application"
            );
            return Err(failure);
        }

        if let Some(e) = output_error {
            tracing::error!(from = "output", reason = %e, "exit crawler application");
            return Err(e.into());
        }

        if interrupted {
            tracing::warn!(from = "main", reason = "interrupted", "exit crawler application");
            return Err(CrawlError::Interrupted);
        }

        let stats = stats.finish();
        tracing::info!(
            from = "main",
            reason = "complete",
            details = stats.details,
            "exit crawler application"
        );
        Ok(stats)
    }
}

/// Waits for every stage task; returns the first stage that panicked
async fn join_stages(handles: [(Stage, JoinHandle<()>); 2]) -> Option<Stage> {
    let mut panicked = None;
    for (stage, handle) in handles {
        if let Err(e) = handle.await {
            tracing::error!(stage = %stage, error = %e, "stage task did not finish cleanly");
            panicked.get_or_insert(stage);
        }
    }
    panicked
}

/// Runs a complete crawl with the given configuration
pub async fn run_crawl<S>(config: Config, sink: &mut S) -> Result<CrawlStats, CrawlError>
where
    S: DetailSink + ?Sized,
{
    Coordinator::new(config)?.run(sink).await
}
