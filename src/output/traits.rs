//! Output sink trait and errors

use crate::model::Detail;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize detail: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives every detail the pipeline produces, in pipeline order
pub trait DetailSink {
    fn accept(&mut self, detail: &Detail) -> OutputResult<()>;
}

/// Collects details in memory
impl DetailSink for Vec<Detail> {
    fn accept(&mut self, detail: &Detail) -> OutputResult<()> {
        self.push(detail.clone());
        Ok(())
    }
}
