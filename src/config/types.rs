use crate::ConfigError;
use serde::Deserialize;
use url::Url;

/// Main configuration structure for Catalog-Crawler
///
/// Every section is optional; the defaults reproduce a crawl of the
/// shirts4mike catalog into `./data`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Home page of the catalog; listing and product hrefs resolve against it
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://shirts4mike.com".to_string(),
        }
    }
}

impl SiteConfig {
    /// Parses the base URL and makes its path end in `/`
    ///
    /// Relative hrefs then resolve underneath the configured path, so
    /// `http://host/shop` + `shirts.php` gives `http://host/shop/shirts.php`.
    pub fn base(&self) -> Result<Url, ConfigError> {
        let mut url = Url::parse(self.base_url.trim())
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", self.base_url, e)))?;

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_fragment(None);

        Ok(url)
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of product pages fetched at the same time
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Upper bound on a single fetch, connect included (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on establishing a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// CSS selectors describing the catalog markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Navigation item holding the listing link on the home page
    #[serde(rename = "listing-container")]
    pub listing_container: String,

    #[serde(rename = "listing-anchor")]
    pub listing_anchor: String,

    /// List holding the product links on the listing page
    #[serde(rename = "product-container")]
    pub product_container: String,

    #[serde(rename = "product-anchor")]
    pub product_anchor: String,

    /// Region of a product page holding title and price
    pub details: String,

    pub title: String,

    pub price: String,

    /// Region of a product page holding the product image
    pub picture: String,

    pub image: String,

    /// Number of leading characters dropped from the heading text
    #[serde(rename = "title-prefix-len")]
    pub title_prefix_len: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_container: "li.shirts".to_string(),
            listing_anchor: "a".to_string(),
            product_container: "ul.products".to_string(),
            product_anchor: "a".to_string(),
            details: "div.shirt-details".to_string(),
            title: "h1".to_string(),
            price: "span.price".to_string(),
            picture: "div.shirt-picture".to_string(),
            image: "img".to_string(),
            title_prefix_len: 4,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the dated CSV exports
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Append-only error log
    #[serde(rename = "error-log")]
    pub error_log: String,

    /// Write `YYYY-MM-DD.csv` instead of `YYYY-M-D.csv`
    #[serde(rename = "zero-pad-dates")]
    pub zero_pad_dates: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            error_log: "./scraper-error.log".to_string(),
            zero_pad_dates: false,
        }
    }
}
