//! Crawler coordinator - main crawl orchestration logic
//!
//! A run walks a fixed pipeline:
//!
//! `Home → Listing → Enumerate → FanOut → Join → Export`
//!
//! Home and Listing are fetched one after the other and any failure there
//! ends the run before anything is exported. Enumerate fixes the target set
//! of product URLs. FanOut spawns one task per target, bounded by a
//! semaphore, and each task sends exactly one outcome back over a channel.
//! Join drains the channel until every target has an outcome. Export writes
//! the successful records in the order they arrived.

use crate::config::{validate, Config};
use crate::crawler::batch::{CrawlBatch, Outcome};
use crate::crawler::fetcher::{FetchError, HttpFetcher, PageFetcher};
use crate::crawler::links::{extract_first_link, extract_links, resolve_link, resolve_links, SelectorPair};
use crate::crawler::product::{scrape_product, ProductRecord, ProductSelectors};
use crate::output::{date_stamp, export};
use crate::report::{ErrorReporter, ReportKind};
use crate::{CatalogError, ConfigError};
use chrono::{Local, NaiveDate};
use scraper::Html;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use url::Url;

/// Pipeline stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Fetching the home page and finding the listing link
    Home,
    /// Fetching the listing page
    Listing,
    /// Collecting product links into the target set
    Enumerate,
    /// Spawning product fetches
    FanOut,
    /// Waiting for every product outcome
    Join,
    /// Writing the dated export
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Home => "home",
            Self::Listing => "listing",
            Self::Enumerate => "enumerate",
            Self::FanOut => "fan-out",
            Self::Join => "join",
            Self::Export => "export",
        };
        f.write_str(name)
    }
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Size of the target set
    pub target_count: usize,

    /// Scraped records in completion order
    pub records: Vec<ProductRecord>,

    /// Product pages that could not be fetched
    pub failures: Vec<(Url, FetchError)>,

    /// The export file written
    pub export_path: PathBuf,

    /// Wall time of the whole run
    pub elapsed: Duration,
}

/// Main crawler coordinator structure
pub struct Coordinator<F: PageFetcher + 'static = HttpFetcher> {
    config: Arc<Config>,
    base_url: Url,
    fetcher: Arc<F>,
    listing_link: SelectorPair,
    product_links: SelectorPair,
    product_selectors: Arc<ProductSelectors>,
    reporter: ErrorReporter,
    fetch_timeout: Duration,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator fetching over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CatalogError)` - Invalid configuration or HTTP client failure
    pub fn new(config: Config) -> Result<Self, CatalogError> {
        let fetcher = HttpFetcher::from_config(&config.crawler)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: PageFetcher + 'static> Coordinator<F> {
    /// Creates a coordinator around any page fetcher
    pub fn with_fetcher(config: Config, fetcher: F) -> Result<Self, CatalogError> {
        validate(&config)?;

        let base_url = config.site.base()?;
        let selectors = &config.selectors;
        let listing_link = SelectorPair::new(&selectors.listing_container, &selectors.listing_anchor)
            .map_err(ConfigError::InvalidSelector)?;
        let product_links = SelectorPair::new(&selectors.product_container, &selectors.product_anchor)
            .map_err(ConfigError::InvalidSelector)?;
        let product_selectors =
            ProductSelectors::from_config(selectors).map_err(ConfigError::InvalidSelector)?;

        let reporter = ErrorReporter::new(Path::new(&config.output.error_log), base_url.as_str());
        let fetch_timeout = Duration::from_secs(config.crawler.request_timeout_secs);

        Ok(Self {
            config: Arc::new(config),
            base_url,
            fetcher: Arc::new(fetcher),
            listing_link,
            product_links,
            product_selectors: Arc::new(product_selectors),
            reporter,
            fetch_timeout,
        })
    }

    /// Runs the crawl and exports under today's date
    pub async fn run(&self) -> Result<CrawlReport, CatalogError> {
        self.run_dated(Local::now().date_naive()).await
    }

    /// Runs the crawl and exports under the given date
    pub async fn run_dated(&self, date: NaiveDate) -> Result<CrawlReport, CatalogError> {
        let start_time = Instant::now();
        tracing::info!("Starting crawl of {}", self.base_url);

        // Home
        tracing::debug!("Stage: {}", Stage::Home);
        let home_body = self.fetch_stage(Stage::Home, &self.base_url).await?;
        let listing_url = self.resolve_listing_url(&home_body)?;
        tracing::info!("Listing page: {}", listing_url);

        // Listing
        tracing::debug!("Stage: {}", Stage::Listing);
        let listing_body = self.fetch_stage(Stage::Listing, &listing_url).await?;

        // Enumerate
        tracing::debug!("Stage: {}", Stage::Enumerate);
        let mut batch = CrawlBatch::new(self.enumerate_products(&listing_body));
        let target_count = batch.target_len();
        tracing::info!("Found {} product pages", target_count);

        // FanOut
        tracing::debug!("Stage: {}", Stage::FanOut);
        let outcomes = self.fan_out(batch.targets());

        // Join
        tracing::debug!("Stage: {}", Stage::Join);
        self.join(&mut batch, outcomes).await?;
        tracing::info!(
            "Batch complete: {} scraped, {} failed",
            batch.success_count(),
            batch.failure_count()
        );

        // Export
        tracing::debug!("Stage: {}", Stage::Export);
        let (records, failures) = batch.into_parts();
        let export_path = self.export_stage(&records, date)?;

        let elapsed = start_time.elapsed();
        tracing::info!("Crawl completed in {:?}", elapsed);

        Ok(CrawlReport {
            target_count,
            records,
            failures,
            export_path,
            elapsed,
        })
    }

    /// Fetches a page whose failure ends the run
    async fn fetch_stage(&self, stage: Stage, url: &Url) -> Result<String, CatalogError> {
        match fetch_guarded(self.fetcher.as_ref(), url, self.fetch_timeout).await {
            Ok(body) => Ok(body),
            Err(source) => {
                self.reporter.report(
                    ReportKind::SiteUnreachable,
                    &format!("{} page unreachable: {}", stage, source),
                )?;
                Err(CatalogError::SiteUnreachable { stage, source })
            }
        }
    }

    /// Finds the listing link on the home page
    fn resolve_listing_url(&self, home_body: &str) -> Result<Url, CatalogError> {
        let href = {
            let document = Html::parse_document(home_body);
            extract_first_link(&document, &self.listing_link)
        };

        let href = match href {
            Some(href) => href,
            None => {
                return Err(self.structural(
                    Stage::Home,
                    format!("no listing link matches '{}'", self.listing_link.as_css()),
                )?)
            }
        };

        match resolve_link(&href, &self.base_url) {
            Some(url) => Ok(url),
            None => Err(self.structural(
                Stage::Home,
                format!("listing link '{}' is not a page URL", href),
            )?),
        }
    }

    /// Logs a structural mismatch and builds its error
    ///
    /// The outer `Result` carries a failure to write the log itself.
    fn structural(&self, stage: Stage, what: String) -> Result<CatalogError, CatalogError> {
        self.reporter.report(
            ReportKind::StructuralMismatch,
            &format!("{} page markup changed: {}", stage, what),
        )?;
        Ok(CatalogError::StructuralMismatch { stage, what })
    }

    /// Collects the distinct product URLs from the listing page
    fn enumerate_products(&self, listing_body: &str) -> Vec<Url> {
        let hrefs = {
            let document = Html::parse_document(listing_body);
            extract_links(&document, &self.product_links)
        };

        resolve_links(&hrefs, &self.base_url)
    }

    /// Spawns one fetch-and-scrape task per target
    ///
    /// The returned receiver yields one outcome per task in completion order
    /// and closes once every task has finished.
    fn fan_out(&self, targets: &[Url]) -> mpsc::Receiver<Outcome> {
        // Capacity covers every outcome, so no task ever waits to send
        let (tx, rx) = mpsc::channel(targets.len().max(1));
        let permits = self.config.crawler.max_concurrent_fetches as usize;
        let semaphore = Arc::new(Semaphore::new(permits));

        for url in targets {
            let tx = tx.clone();
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let selectors = Arc::clone(&self.product_selectors);
            let timeout = self.fetch_timeout;
            let url = url.clone();

            tokio::spawn(async move {
                let outcome = {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return,
                    };
                    scrape_one(fetcher.as_ref(), &selectors, url, timeout).await
                };
                let _ = tx.send(outcome).await;
            });
        }

        rx
    }

    /// Records outcomes until every target has one
    async fn join(
        &self,
        batch: &mut CrawlBatch,
        mut outcomes: mpsc::Receiver<Outcome>,
    ) -> Result<(), CatalogError> {
        while !batch.is_complete() {
            match outcomes.recv().await {
                Some(outcome) => self.record_outcome(batch, outcome)?,
                None => break,
            }
        }

        // Only a task that died before sending leaves targets pending here
        for url in batch.pending() {
            let error = FetchError::Network {
                url: url.to_string(),
                cause: "fetch task ended without a result".to_string(),
            };
            self.record_outcome(batch, Outcome::Failed { url, error })?;
        }

        Ok(())
    }

    /// Adds one outcome to the batch, logging product failures
    fn record_outcome(&self, batch: &mut CrawlBatch, outcome: Outcome) -> Result<(), CatalogError> {
        let failure = match &outcome {
            Outcome::Scraped(record) => {
                tracing::debug!("Scraped {}", record.url);
                None
            }
            Outcome::Failed { error, .. } => Some(error.to_string()),
        };

        match batch.record(outcome) {
            Ok(complete) => {
                if let Some(message) = failure {
                    self.reporter.report_quiet(
                        ReportKind::SiteUnreachable,
                        &format!("product page skipped: {}", message),
                    )?;
                }
                if complete {
                    tracing::debug!("All {} outcomes recorded", batch.target_len());
                }
            }
            Err(rejection) => tracing::warn!("Ignoring outcome: {:?}", rejection),
        }

        Ok(())
    }

    /// Writes the dated export, logging any local failure
    fn export_stage(&self, records: &[ProductRecord], date: NaiveDate) -> Result<PathBuf, CatalogError> {
        let output = &self.config.output;
        let stamp = date_stamp(date, output.zero_pad_dates);

        match export(records, Path::new(&output.data_dir), &stamp) {
            Ok(path) => Ok(path),
            Err(e) => {
                self.reporter
                    .report(ReportKind::LocalFailure, &format!("export failed: {}", e))?;
                Err(e.into())
            }
        }
    }
}

/// Fetches with an upper bound on the wait, whatever the fetcher does
async fn fetch_guarded<F: PageFetcher + ?Sized>(
    fetcher: &F,
    url: &Url,
    limit: Duration,
) -> Result<String, FetchError> {
    match tokio::time::timeout(limit, fetcher.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: url.to_string(),
        }),
    }
}

/// Fetches and scrapes one product page
async fn scrape_one<F: PageFetcher + ?Sized>(
    fetcher: &F,
    selectors: &ProductSelectors,
    url: Url,
    limit: Duration,
) -> Outcome {
    match fetch_guarded(fetcher, &url, limit).await {
        Ok(body) => Outcome::Scraped(scrape_product(&url, &body, selectors)),
        Err(error) => Outcome::Failed { url, error },
    }
}

/// Runs the main crawl operation over HTTP
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::config::Config;
/// use catalog_crawler::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default()).await?;
/// println!("{} products exported", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, CatalogError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
