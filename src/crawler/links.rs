//! Link extraction for the home and listing pages
//!
//! Links are found by a (container, anchor) selector pair, e.g. `li.shirts`
//! + `a`. Extraction is pure; resolving the hrefs against the site's base URL
//! is a separate step so the raw hrefs can be inspected on their own.

use scraper::{Html, Selector};
use url::Url;

/// A container selector scoping an anchor selector
#[derive(Debug, Clone)]
pub struct SelectorPair {
    selector: Selector,
    css: String,
}

impl SelectorPair {
    /// Compiles `"{container} {anchor}"` into one descendant selector
    pub fn new(container: &str, anchor: &str) -> Result<Self, String> {
        let css = format!("{} {}", container.trim(), anchor.trim());
        let selector = Selector::parse(&css).map_err(|e| format!("'{}': {}", css, e))?;
        Ok(Self { selector, css })
    }

    /// The combined CSS text, for log and error messages
    pub fn as_css(&self) -> &str {
        &self.css
    }
}

/// Returns the `href` of every anchor matching the pair, in document order
///
/// Anchors without an `href` are skipped. Nothing matching is not an error:
/// the result is simply empty.
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::crawler::{extract_links, SelectorPair};
/// use scraper::Html;
///
/// let html = Html::parse_document(r#"<ul class="products"><li><a href="shirt.php?id=101">A</a></li></ul>"#);
/// let pair = SelectorPair::new("ul.products", "a").unwrap();
/// assert_eq!(extract_links(&html, &pair), vec!["shirt.php?id=101".to_string()]);
/// ```
pub fn extract_links(document: &Html, pair: &SelectorPair) -> Vec<String> {
    document
        .select(&pair.selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}

/// Returns the first matching `href`, if any
pub fn extract_first_link(document: &Html, pair: &SelectorPair) -> Option<String> {
    document
        .select(&pair.selector)
        .find_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
}

/// Hrefs with these prefixes never name a catalog page
const NON_PAGE_PREFIXES: [&str; 5] = ["#", "javascript:", "mailto:", "tel:", "data:"];

/// Joins an href onto the base URL, giving an absolute page URL
///
/// Yields `None` for an empty href, one in [`NON_PAGE_PREFIXES`], one that
/// fails to join, or one that lands outside http/https. The fragment is
/// dropped so `shirt.php?id=1#reviews` and `shirt.php?id=1` are one page.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || NON_PAGE_PREFIXES.iter().any(|prefix| href.starts_with(prefix)) {
        return None;
    }

    let mut page = base_url.join(href).ok()?;
    if !matches!(page.scheme(), "http" | "https") {
        return None;
    }
    page.set_fragment(None);
    Some(page)
}

/// Resolves every href, dropping unusable ones and repeats
///
/// Order is preserved and the first occurrence of a URL wins, so the result
/// can serve directly as a set of distinct targets.
pub fn resolve_links(hrefs: &[String], base_url: &Url) -> Vec<Url> {
    let mut resolved: Vec<Url> = Vec::with_capacity(hrefs.len());

    for href in hrefs {
        match resolve_link(href, base_url) {
            Some(url) if resolved.contains(&url) => {
                tracing::debug!("Skipping repeated link {}", url);
            }
            Some(url) => resolved.push(url),
            None => tracing::debug!("Skipping unusable href '{}'", href),
        }
    }

    resolved
}
