//! URL handling module for Pagewalk
//!
//! This module builds listing page URLs and resolves item hrefs found on
//! those pages into absolute detail page URLs.

mod resolve;

use crate::config::SiteConfig;
use url::Url;

pub use resolve::resolve_href;

/// Root of a paginated listing site
///
/// Page 1 is the root itself; page `n > 1` lives at `{root}/{prefix}{n}`.
#[derive(Debug, Clone)]
pub struct SiteRoot {
    /// Root as configured, used verbatim for page 1
    root: String,

    /// Root with a trailing slash, used as the join base for relative hrefs
    base: Url,

    page_prefix: String,
}

impl SiteRoot {
    /// Creates a site root from a URL string and page prefix
    ///
    /// # Examples
    ///
    /// ```
    /// use pagewalk::url::SiteRoot;
    ///
    /// let site = SiteRoot::new("https://example.com", "page").unwrap();
    /// assert_eq!(site.page_url(1), "https://example.com");
    /// assert_eq!(site.page_url(3), "https://example.com/page3");
    /// ```
    pub fn new(root_url: &str, page_prefix: &str) -> Result<Self, url::ParseError> {
        let trimmed = root_url.trim_end_matches('/');
        let base = Url::parse(&format!("{}/", trimmed))?;

        Ok(Self {
            root: root_url.to_string(),
            base,
            page_prefix: page_prefix.to_string(),
        })
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self, url::ParseError> {
        Self::new(&config.root_url, &config.page_prefix)
    }

    /// Returns the URL of listing page `page` (1-based)
    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            self.root.clone()
        } else {
            format!(
                "{}/{}{}",
                self.root.trim_end_matches('/'),
                self.page_prefix,
                page
            )
        }
    }

    /// Resolves an item href against this root
    pub fn resolve(&self, href: &str) -> Option<String> {
        resolve_href(&self.base, href)
    }
}
