use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Pagewalk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Listing site location
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root of the listing; page 1 is fetched from here
    #[serde(rename = "root-url", default = "default_root_url")]
    pub root_url: String,

    /// Path segment prefix for pages after the first (`{root}/{prefix}{n}`)
    #[serde(rename = "page-prefix", default = "default_page_prefix")]
    pub page_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            page_prefix: default_page_prefix(),
        }
    }
}

/// CSS selectors used to read listing and detail pages
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Selects one node per listed item
    #[serde(default = "default_item_selector")]
    pub item: String,

    /// Selects the anchor inside an item node
    #[serde(rename = "item-link", default = "default_item_link_selector")]
    pub item_link: String,

    /// Selects the title on a detail page
    #[serde(default = "default_title_selector")]
    pub title: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item: default_item_selector(),
            item_link: default_item_link_selector(),
            title: default_title_selector(),
        }
    }
}

/// HTTP request behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// Retry behavior for listing page fetches
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per request, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause between attempts (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Also retry detail page fetches. Off by default: a failed detail
    /// fetch ends the crawl on the first error.
    #[serde(rename = "retry-detail", default)]
    pub retry_detail: bool,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            retry_detail: false,
        }
    }
}

/// Stage wiring
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Capacity of the link and detail channels
    #[serde(rename = "channel-capacity", default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Stop discovery after this many listing pages (0 = no limit)
    #[serde(rename = "max-pages", default)]
    pub max_pages: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            max_pages: 0,
        }
    }
}

fn default_root_url() -> String {
    "https://pjt3591oo.github.io".to_string()
}

fn default_page_prefix() -> String {
    "page".to_string()
}

fn default_item_selector() -> String {
    "div.p h3".to_string()
}

fn default_item_link_selector() -> String {
    "a".to_string()
}

fn default_title_selector() -> String {
    "h1.post-title".to_string()
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    concat!("pagewalk/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_channel_capacity() -> usize {
    1
}
