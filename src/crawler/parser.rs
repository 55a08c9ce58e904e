//! HTML extraction for listing and detail pages
//!
//! Documents are parsed and dropped inside these synchronous functions, so no
//! parsed tree is ever held across an await point.

use crate::config::SelectorConfig;
use crate::CrawlError;
use scraper::{ElementRef, Html, Selector};

/// Compiled selectors for listing and detail pages
#[derive(Debug, Clone)]
pub struct PageSelectors {
    item: Selector,
    item_link: Selector,
    title: Selector,
}

impl PageSelectors {
    pub fn new(item: &str, item_link: &str, title: &str) -> Result<Self, CrawlError> {
        Ok(Self {
            item: compile(item)?,
            item_link: compile(item_link)?,
            title: compile(title)?,
        })
    }

    pub fn from_config(config: &SelectorConfig) -> Result<Self, CrawlError> {
        Self::new(&config.item, &config.item_link, &config.title)
    }
}

fn compile(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector).map_err(|e| CrawlError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Extracts the href of every listing item, in document order
///
/// The result has one entry per item node. An entry is `None` when the item
/// has no anchor or the anchor has no `href`. An empty result means the page
/// lists no items.
///
/// # Example
///
/// ```
/// use pagewalk::crawler::{extract_item_hrefs, PageSelectors};
///
/// let selectors = PageSelectors::new("div.p h3", "a", "h1.post-title").unwrap();
/// let html = r#"<div class="p"><h3><a href="/one">One</a></h3></div>"#;
/// assert_eq!(extract_item_hrefs(html, &selectors), vec![Some("/one".to_string())]);
/// ```
pub fn extract_item_hrefs(html: &str, selectors: &PageSelectors) -> Vec<Option<String>> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.item)
        .map(|item| item_href(item, &selectors.item_link))
        .collect()
}

fn item_href(item: ElementRef<'_>, link: &Selector) -> Option<String> {
    item.select(link)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
}

/// Extracts the detail page title
///
/// Text of every node matching the title selector is concatenated and
/// trimmed. A page without a title yields an empty string.
pub fn extract_title(html: &str, selectors: &PageSelectors) -> String {
    let document = Html::parse_document(html);

    document
        .select(&selectors.title)
        .flat_map(|element| element.text())
        .collect::<String>()
        .trim()
        .to_string()
}
