//! Configuration module for Pagewalk
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a missing file section falls back to the
//! stock listing site and selectors.
//!
//! # Example
//!
//! ```no_run
//! use pagewalk::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagewalk.toml")).unwrap();
//! println!("Walking listing at: {}", config.site.root_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, PipelineConfig, RetryConfig, SelectorConfig, SiteConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, config_hash, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
