//! Catalog-Crawler main entry point
//!
//! This is the command-line interface for the catalog crawler.

use catalog_crawler::config::{load_config_with_hash, validate, Config};
use catalog_crawler::crawler::Coordinator;
use catalog_crawler::output::print_report;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Crawler: a one-shot product catalog scraper
///
/// Crawls the catalog home page, its listing page and every product page,
/// then writes the products to a dated CSV file. Failures are appended to
/// the error log.
#[derive(Parser, Debug)]
#[command(name = "catalog-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A one-shot product catalog scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the catalog home page URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Override the export directory
    #[arg(long, value_name = "DIR")]
    data_dir: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(base_url) = cli.base_url {
        config.site.base_url = base_url;
    }
    if let Some(data_dir) = cli.data_dir {
        config.output.data_dir = data_dir;
    }
    validate(&config)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_crawler=info,warn"),
            1 => EnvFilter::new("catalog_crawler=debug,info"),
            2 => EnvFilter::new("catalog_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let base = config.site.base()?;
    let selectors = &config.selectors;

    println!("=== Catalog-Crawler Dry Run ===\n");

    println!("Site:");
    println!("  Home page: {}", base);

    println!("\nCrawler Configuration:");
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);

    println!("\nSelectors:");
    println!(
        "  Listing link: {} {}",
        selectors.listing_container, selectors.listing_anchor
    );
    println!(
        "  Product links: {} {}",
        selectors.product_container, selectors.product_anchor
    );
    println!("  Title: {} {}", selectors.details, selectors.title);
    println!("  Price: {} {}", selectors.details, selectors.price);
    println!("  Image: {} {}", selectors.picture, selectors.image);
    println!("  Title prefix length: {}", selectors.title_prefix_len);

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);
    println!("  Error log: {}", config.output.error_log);
    println!(
        "  File names: {}",
        if config.output.zero_pad_dates {
            "YYYY-MM-DD.csv"
        } else {
            "YYYY-M-D.csv"
        }
    );

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = Coordinator::new(config)?;

    match coordinator.run().await {
        Ok(report) => {
            if !report.failures.is_empty() {
                tracing::warn!(
                    "{} product pages could not be fetched, see the error log",
                    report.failures.len()
                );
            }
            if !quiet {
                print_report(&report);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
