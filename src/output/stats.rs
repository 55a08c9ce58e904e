//! Statistics for a crawl run

use crate::model::Detail;
use std::time::{Duration, Instant};

/// Counters for a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// Number of details produced
    pub details: u64,

    /// Highest listing page a detail came from
    pub last_page: u32,

    /// Wall time of the run
    pub elapsed: Duration,

    started: Instant,
}

impl CrawlStats {
    pub fn start() -> Self {
        Self {
            details: 0,
            last_page: 0,
            elapsed: Duration::ZERO,
            started: Instant::now(),
        }
    }

    pub fn record(&mut self, detail: &Detail) {
        self.details += 1;
        self.last_page = self.last_page.max(detail.page);
    }

    pub fn finish(mut self) -> Self {
        self.elapsed = self.started.elapsed();
        self
    }

    /// Details per second over the whole run
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.details as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints a one-block summary to stderr
pub fn print_statistics(stats: &CrawlStats) {
    eprintln!("=== Crawl Summary ===");
    eprintln!("  Details:    {}", stats.details);
    eprintln!("  Last page:  {}", stats.last_page);
    eprintln!("  Elapsed:    {:.2?}", stats.elapsed);
    eprintln!("  Rate:       {:.2} details/sec", stats.rate());
}
