//! Catalog-Crawler: a one-shot product catalog scraper
//!
//! This crate crawls a fixed-shape catalog site (home page, one listing page,
//! N product pages), fans out the product fetches concurrently, joins on the
//! full set of outcomes and exports the scraped records to a dated CSV file.

pub mod config;
pub mod crawler;
pub mod output;
pub mod report;

use thiserror::Error;

/// Main error type for Catalog-Crawler operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Site unreachable at {stage} stage: {source}")]
    SiteUnreachable {
        stage: crawler::Stage,
        source: crawler::FetchError,
    },

    #[error("Structural mismatch at {stage} stage: {what}")]
    StructuralMismatch { stage: crawler::Stage, what: String },

    #[error("Export failed: {0}")]
    Export(#[from] output::ExportError),

    #[error("Error log unavailable: {0}")]
    LogSink(#[from] report::LogSinkError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl CatalogError {
    /// Returns true if the run failed because the site could not be reached
    pub fn is_site_unreachable(&self) -> bool {
        matches!(self, Self::SiteUnreachable { .. })
    }

    /// Returns true if the run failed because the expected markup was missing
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::StructuralMismatch { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Catalog-Crawler operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlReport, ProductRecord};
