use url::Url;

/// Resolves an item href to an absolute URL
///
/// Hrefs on a listing page are paths relative to the site root, so a leading
/// `/` is appended to the root's own path rather than replacing it. Other
/// relative hrefs are joined against the root; absolute http(s) URLs pass
/// through unchanged.
///
/// Returns None if the href should be skipped:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel:, data: schemes
/// - anything that does not resolve to an http(s) URL
///
/// # Examples
///
/// ```
/// use pagewalk::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// assert_eq!(
///     resolve_href(&base, "/posts/1"),
///     Some("https://example.com/posts/1".to_string())
/// );
/// ```
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Root-relative, but not protocol-relative
    let joined = if href.starts_with('/') && !href.starts_with("//") {
        base.join(href.trim_start_matches('/'))
    } else {
        base.join(href)
    };

    match joined {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
