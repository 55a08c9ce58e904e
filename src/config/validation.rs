use crate::config::types::{Config, FetchConfig, PipelineConfig, RetryConfig, SelectorConfig, SiteConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_selector_config(&config.selectors)?;
    validate_fetch_config(&config.fetch)?;
    validate_retry_config(&config.retry)?;
    validate_pipeline_config(&config.pipeline)?;
    Ok(())
}

/// Validates the listing site location
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let root = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url: {}", e)))?;

    if root.scheme() != "http" && root.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url must use http or https, got '{}'",
            root.scheme()
        )));
    }

    if root.query().is_some() || root.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url must not carry a query or fragment: {}",
            config.root_url
        )));
    }

    if config.page_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "page-prefix cannot be empty".to_string(),
        ));
    }

    if config.page_prefix.contains(|c: char| matches!(c, '/' | '?' | '#')) {
        return Err(ConfigError::Validation(format!(
            "page-prefix must be a single path segment, got '{}'",
            config.page_prefix
        )));
    }

    Ok(())
}

/// Validates that every selector parses
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, selector) in [
        ("item", &config.item),
        ("item-link", &config.item_link),
        ("title", &config.title),
    ] {
        Selector::parse(selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("{} = '{}': {:?}", name, selector, e))
        })?;
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout-ms must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.channel_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "channel-capacity must be >= 1, got {}",
            config.channel_capacity
        )));
    }

    Ok(())
}
