//! Product page scraping
//!
//! A product page carries a details region (heading + price) and a picture
//! region (image). Missing fields are not errors: text fields come back empty
//! and the image URL comes back absent.

use crate::config::SelectorConfig;
use chrono::{DateTime, Local};
use scraper::{Html, Selector};
use url::Url;

/// One scraped product
///
/// Created once per successfully fetched product page and never modified
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    /// Heading text with the price prefix removed
    pub title: String,

    /// Price text exactly as displayed
    pub price: String,

    /// Image `src` as found on the page, absolute or site-relative
    pub image_url: Option<String>,

    /// Absolute URL of the product page
    pub url: Url,

    /// When the page was scraped
    pub scraped_at: DateTime<Local>,
}

/// Compiled selectors for product pages
#[derive(Debug, Clone)]
pub struct ProductSelectors {
    title: Selector,
    price: Selector,
    image: Selector,
    title_prefix_len: usize,
}

impl ProductSelectors {
    /// Compiles the details/picture scoped selectors from configuration
    pub fn from_config(config: &SelectorConfig) -> Result<Self, String> {
        Ok(Self {
            title: scoped(&config.details, &config.title)?,
            price: scoped(&config.details, &config.price)?,
            image: scoped(&config.picture, &config.image)?,
            title_prefix_len: config.title_prefix_len,
        })
    }
}

fn scoped(container: &str, inner: &str) -> Result<Selector, String> {
    let css = format!("{} {}", container.trim(), inner.trim());
    Selector::parse(&css).map_err(|e| format!("'{}': {}", css, e))
}

/// Scrapes one product record from a product page body
///
/// Text of every element matching a selector is concatenated, so a page with
/// two price spans yields both texts run together.
pub fn scrape_product(url: &Url, body: &str, selectors: &ProductSelectors) -> ProductRecord {
    let document = Html::parse_document(body);

    let heading = collect_text(&document, &selectors.title);
    let price = collect_text(&document, &selectors.price);
    let image_url = document
        .select(&selectors.image)
        .next()
        .and_then(|element| element.value().attr("src"))
        .map(|src| src.to_string());

    ProductRecord {
        title: strip_title_prefix(&heading, selectors.title_prefix_len),
        price,
        image_url,
        url: url.clone(),
        scraped_at: Local::now(),
    }
}

fn collect_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .flat_map(|element| element.text())
        .collect()
}

/// Drops the first `len` characters of a heading
///
/// The catalog headings repeat the price in front of the name (`"$29 Classic
/// Tee"`), so a fixed-width cut recovers the name. A price of another width
/// will cut the wrong number of characters.
pub fn strip_title_prefix(heading: &str, len: usize) -> String {
    heading.chars().skip(len).collect()
}
