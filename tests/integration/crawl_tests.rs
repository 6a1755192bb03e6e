//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog and run the full
//! home → listing → products → export cycle over real HTTP.

use catalog_crawler::config::Config;
use catalog_crawler::crawler::{Coordinator, FetchError, Stage};
use catalog_crawler::CatalogError;
use chrono::NaiveDate;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.crawler.max_concurrent_fetches = 4;
    config.crawler.request_timeout_secs = 2;
    config.crawler.connect_timeout_secs = 1;
    config.output.data_dir = dir.path().join("data").to_string_lossy().into_owned();
    config.output.error_log = dir
        .path()
        .join("scraper-error.log")
        .to_string_lossy()
        .into_owned();
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn home_page() -> String {
    r#"<html><head><title>Shirts 4 Mike</title></head><body>
        <ul class="nav">
            <li class="shirts"><a href="shirts.php">Shirts</a></li>
            <li class="contact"><a href="contact.php">Contact</a></li>
        </ul>
    </body></html>"#
        .to_string()
}

fn listing_page(ids: &[u32]) -> String {
    let items: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<li><a href="shirt.php?id={id}"><img src="img/shirts/shirt-{id}.jpg"><p>View Details</p></a></li>"#,
                id = id
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="section shirts page"><ul class="products">{}</ul></div></body></html>"#,
        items
    )
}

fn product_page(id: u32, price: &str, name: &str) -> String {
    format!(
        r#"<html><body>
        <div class="section page">
            <div class="shirt-picture">
                <span><img src="img/shirts/shirt-{id}.jpg" alt="{name}"></span>
            </div>
            <div class="shirt-details">
                <h1><span class="price">{price}</span> {name}</h1>
            </div>
        </div>
        </body></html>"#,
        id = id,
        price = price,
        name = name
    )
}

async fn mount_home_and_listing(server: &MockServer, ids: &[u32]) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(home_page()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shirts.php"))
        .respond_with(html(listing_page(ids)))
        .mount(server)
        .await;
}

async fn mount_product(server: &MockServer, id: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/shirt.php"))
        .and(query_param("id", id.to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
}

fn read_export(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open export");
    reader
        .records()
        .map(|row| row.unwrap().iter().map(str::to_string).collect())
        .collect()
}

fn log_lines(dir: &TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.path().join("scraper-error.log"))
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_full_crawl_exports_every_product() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_home_and_listing(&mock_server, &[101, 102, 103]).await;
    mount_product(&mock_server, 101, html(product_page(101, "$18", "Logo Shirt, Red"))).await;
    mount_product(&mock_server, 102, html(product_page(102, "$20", "Mike the Frog Shirt, Black"))).await;
    mount_product(&mock_server, 103, html(product_page(103, "$20", "Mike the Frog Shirt, Blue"))).await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run_dated(date()).await.expect("Crawl failed");

    assert_eq!(report.target_count, 3);
    assert_eq!(report.records.len(), 3);
    assert!(report.failures.is_empty());
    assert_eq!(report.export_path, dir.path().join("data").join("2024-3-5.csv"));

    let rows = read_export(&report.export_path);
    assert_eq!(rows.len(), 3);

    let red = rows
        .iter()
        .find(|row| row[3].ends_with("/shirt.php?id=101"))
        .expect("Missing product 101");
    assert_eq!(red[0], "Logo Shirt, Red");
    assert_eq!(red[1], "$18");
    assert_eq!(red[2], "img/shirts/shirt-101.jpg");
    assert_eq!(red[3], format!("{}/shirt.php?id=101", mock_server.uri()));
    assert!(!red[4].is_empty());

    // Nothing failed, so no log was written
    assert!(!dir.path().join("scraper-error.log").exists());
}

#[tokio::test]
async fn test_partial_failure_still_exports() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_home_and_listing(&mock_server, &[101, 102, 103]).await;
    mount_product(&mock_server, 101, html(product_page(101, "$18", "Logo Shirt, Red"))).await;
    mount_product(&mock_server, 102, ResponseTemplate::new(500)).await;
    mount_product(&mock_server, 103, html(product_page(103, "$20", "Mike the Frog Shirt, Blue"))).await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run_dated(date()).await.expect("Partial failure must not abort");

    assert_eq!(report.target_count, 3);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].1, FetchError::Status { status: 500, .. }));

    let rows = read_export(&report.export_path);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| !row[3].ends_with("id=102")));

    let lines = log_lines(&dir);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("shirt.php?id=102"));
}

#[tokio::test]
async fn test_slow_product_times_out() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_home_and_listing(&mock_server, &[101, 102]).await;
    mount_product(&mock_server, 101, html(product_page(101, "$18", "Logo Shirt, Red"))).await;
    mount_product(
        &mock_server,
        102,
        html(product_page(102, "$20", "Slow Shirt")).set_delay(Duration::from_secs(10)),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run_dated(date()).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].1, FetchError::Timeout { .. }));
}

#[tokio::test]
async fn test_empty_listing_writes_header_only() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_home_and_listing(&mock_server, &[]).await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run_dated(date()).await.unwrap();

    assert_eq!(report.target_count, 0);
    let content = std::fs::read_to_string(&report.export_path).unwrap();
    assert_eq!(content, "\"Title\",\"Price\",\"ImageURL\",\"URL\",\"Time\"\n");
}

#[tokio::test]
async fn test_home_unreachable_aborts_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let coordinator = Coordinator::new(config).unwrap();
    let error = coordinator.run_dated(date()).await.unwrap_err();

    assert!(matches!(
        error,
        CatalogError::SiteUnreachable {
            stage: Stage::Home,
            ..
        }
    ));
    assert!(!dir.path().join("data").exists());
    assert_eq!(log_lines(&dir).len(), 1);
}

#[tokio::test]
async fn test_listing_unreachable_aborts_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(home_page()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shirts.php"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let coordinator = Coordinator::new(config).unwrap();
    let error = coordinator.run_dated(date()).await.unwrap_err();

    assert!(matches!(
        error,
        CatalogError::SiteUnreachable {
            stage: Stage::Listing,
            ..
        }
    ));
    assert!(!dir.path().join("data").exists());

    let lines = log_lines(&dir);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("listing page unreachable"));
}

#[tokio::test]
async fn test_refused_connection_is_site_unreachable() {
    let dir = TempDir::new().unwrap();

    // Nothing listens on the discard port
    let config = create_test_config("http://127.0.0.1:9", &dir);
    let coordinator = Coordinator::new(config).unwrap();
    let error = coordinator.run_dated(date()).await.unwrap_err();

    assert!(error.is_site_unreachable());
    assert!(!dir.path().join("data").exists());
    assert_eq!(log_lines(&dir).len(), 1);
}

#[tokio::test]
async fn test_same_day_rerun_overwrites_export() {
    let dir = TempDir::new().unwrap();

    let first = MockServer::start().await;
    mount_home_and_listing(&first, &[101, 102]).await;
    mount_product(&first, 101, html(product_page(101, "$18", "Logo Shirt, Red"))).await;
    mount_product(&first, 102, html(product_page(102, "$20", "Mike the Frog Shirt, Black"))).await;

    let coordinator = Coordinator::new(create_test_config(&first.uri(), &dir)).unwrap();
    let first_report = coordinator.run_dated(date()).await.unwrap();
    assert_eq!(read_export(&first_report.export_path).len(), 2);

    let second = MockServer::start().await;
    mount_home_and_listing(&second, &[201]).await;
    mount_product(&second, 201, html(product_page(201, "$25", "Logo Shirt, Green"))).await;

    let coordinator = Coordinator::new(create_test_config(&second.uri(), &dir)).unwrap();
    let second_report = coordinator.run_dated(date()).await.unwrap();

    assert_eq!(first_report.export_path, second_report.export_path);
    let rows = read_export(&second_report.export_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Logo Shirt, Green");
}

#[tokio::test]
async fn test_zero_padded_file_name() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_home_and_listing(&mock_server, &[]).await;

    let mut config = create_test_config(&mock_server.uri(), &dir);
    config.output.zero_pad_dates = true;
    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run_dated(date()).await.unwrap();

    assert_eq!(report.export_path, dir.path().join("data").join("2024-03-05.csv"));
}
