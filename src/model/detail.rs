use crate::model::Link;
use serde::Serialize;

/// The resolved record for one `Link`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detail {
    /// URL of the fetched detail page
    pub url: String,

    /// Listing page the link was found on
    pub page: u32,

    /// Title text read from the detail page (empty if absent)
    pub title: String,
}

impl Detail {
    pub fn from_link(link: &Link, title: impl Into<String>) -> Self {
        Self {
            url: link.url().to_string(),
            page: link.page(),
            title: title.into(),
        }
    }
}
