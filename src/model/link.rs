use std::fmt;

/// A link produced by the discovery stage
///
/// Discovery emits `Item` for every entry found on a listing page. The first
/// listing page with no entries yields a single `EndOfListing` carrying that
/// page's own URL; nothing follows it on the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// An item found on listing page `page`
    Item { url: String, page: u32 },

    /// The empty listing page that ended the walk
    EndOfListing { url: String, page: u32 },
}

impl Link {
    pub fn item(url: impl Into<String>, page: u32) -> Self {
        Self::Item {
            url: url.into(),
            page,
        }
    }

    pub fn end_of_listing(url: impl Into<String>, page: u32) -> Self {
        Self::EndOfListing {
            url: url.into(),
            page,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Item { url, .. } | Self::EndOfListing { url, .. } => url,
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            Self::Item { page, .. } | Self::EndOfListing { page, .. } => *page,
        }
    }

    /// Returns false for the end-of-listing marker
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Item { .. })
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item { url, page } => write!(f, "item {} (page {})", url, page),
            Self::EndOfListing { url, page } => {
                write!(f, "end of listing {} (page {})", url, page)
            }
        }
    }
}
