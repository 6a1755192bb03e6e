use crate::config::types::{Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig};
use crate::ConfigError;
use scraper::Selector;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_selector_config(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = config.base()?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use the http or https scheme",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates that every selector, alone and in its scoped combination, parses
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    let combinations = [
        ("listing-container", config.listing_container.clone()),
        ("listing-anchor", config.listing_anchor.clone()),
        ("product-container", config.product_container.clone()),
        ("product-anchor", config.product_anchor.clone()),
        ("details", config.details.clone()),
        ("title", config.title.clone()),
        ("price", config.price.clone()),
        ("picture", config.picture.clone()),
        ("image", config.image.clone()),
        (
            "listing-container + listing-anchor",
            format!("{} {}", config.listing_container, config.listing_anchor),
        ),
        (
            "product-container + product-anchor",
            format!("{} {}", config.product_container, config.product_anchor),
        ),
        ("details + title", format!("{} {}", config.details, config.title)),
        ("details + price", format!("{} {}", config.details, config.price)),
        ("picture + image", format!("{} {}", config.picture, config.image)),
    ];

    for (name, css) in &combinations {
        validate_selector(name, css)?;
    }

    Ok(())
}

/// Validates a single CSS selector
fn validate_selector(name: &str, css: &str) -> Result<(), ConfigError> {
    if css.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "{} cannot be empty",
            name
        )));
    }

    Selector::parse(css).map_err(|e| {
        ConfigError::InvalidSelector(format!("{} '{}' does not parse: {}", name, css, e))
    })?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "data-dir cannot be empty".to_string(),
        ));
    }

    if config.error_log.trim().is_empty() {
        return Err(ConfigError::Validation(
            "error-log cannot be empty".to_string(),
        ));
    }

    Ok(())
}
