//! Output module for Pagewalk
//!
//! Every `Detail` the pipeline produces is handed to a [`DetailSink`] by the
//! coordinator. This module provides:
//! - `LogSink`: emits each detail as a structured log event
//! - `JsonLinesSink`: writes each detail as one JSON object per line
//! - `CrawlStats`: counters for a finished run

mod stats;
mod traits;

pub use stats::{print_statistics, CrawlStats};
pub use traits::{DetailSink, OutputError, OutputResult};

use crate::model::Detail;
use std::io::Write;

/// Sink that reports each detail through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DetailSink for LogSink {
    fn accept(&mut self, detail: &Detail) -> OutputResult<()> {
        tracing::info!(
            page = detail.page,
            title = %detail.title,
            url = %detail.url,
            "complete"
        );
        Ok(())
    }
}

/// Sink that writes one JSON object per line
///
/// Each line is flushed as soon as it is written so downstream consumers
/// see details while the crawl is still running.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DetailSink for JsonLinesSink<W> {
    fn accept(&mut self, detail: &Detail) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, detail)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
