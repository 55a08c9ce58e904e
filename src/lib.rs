//! Pagewalk: a two-stage listing crawler
//!
//! This crate walks a paginated listing site, emits one link per listed item,
//! and resolves every link into a detail record. Discovery and detail
//! fetching run as two concurrent stages joined by a bounded channel.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Pagewalk operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: crawler::Stage,
        #[source]
        source: Box<CrawlError>,
    },

    #[error("{stage} stage panicked")]
    StagePanicked { stage: crawler::Stage },

    #[error("Crawl interrupted")]
    Interrupted,

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

impl CrawlError {
    /// Returns the stage that failed, if this error came from a stage
    pub fn stage(&self) -> Option<crawler::Stage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Errors produced while fetching a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url} after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("Connection failed for {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("Failed to build request for {url}: {source}")]
    Build { url: String, source: reqwest::Error },

    #[error("HTTP error for {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("Request to {url} cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    /// Returns true for failures worth another attempt
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connect { .. } | Self::Request { .. }
        )
    }

    /// Returns true when the request was abandoned because its scope was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The URL the failed request targeted
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. }
            | Self::Connect { url, .. }
            | Self::Build { url, .. }
            | Self::Request { url, .. }
            | Self::Body { url, .. }
            | Self::Cancelled { url } => url,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Pagewalk operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Stage};
pub use model::{Detail, Link};
