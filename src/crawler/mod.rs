//! Crawler module for the catalog traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeouts and failure classification
//! - Link extraction from the home and listing pages
//! - Product page scraping
//! - The batch of product outcomes and the join over it
//! - Overall crawl coordination

mod batch;
mod coordinator;
mod fetcher;
mod links;
mod product;

pub use batch::{CrawlBatch, Outcome, RecordRejection};
pub use coordinator::{run_crawl, Coordinator, CrawlReport, Stage};
pub use fetcher::{build_http_client, fetch_url, FetchError, HttpFetcher, PageFetcher};
pub use links::{extract_first_link, extract_links, resolve_link, resolve_links, SelectorPair};
pub use product::{scrape_product, strip_title_prefix, ProductRecord, ProductSelectors};
