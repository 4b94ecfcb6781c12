//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the marketplace and run the full
//! crawl cycle end-to-end over HTTP.

use auto_harvest::config::{Config, CrawlerConfig, OutputConfig};
use auto_harvest::crawler::{crawl, Coordinator};
use auto_harvest::output::{merge_partitions, read_partition, PartitionWriter};
use auto_harvest::{CrawlPhase, HarvestError};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const INDEX_PATH: &str = "/dostawcze";

/// Matches requests without a query string, i.e. the bare index URL
struct NoQuery;

impl Match for NoQuery {
    fn matches(&self, request: &Request) -> bool {
        request.url.query().is_none()
    }
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, output_dir: &Path, pages: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: format!("{}{}", server.uri(), INDEX_PATH),
            pages,
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
            ..CrawlerConfig::default()
        },
        output: OutputConfig {
            directory: output_dir.to_string_lossy().into_owned(),
            file_prefix: "page".to_string(),
        },
        ..Config::default()
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn landing_page(total_pages: u32) -> String {
    let items: String = (1..=total_pages)
        .map(|p| format!(r#"<li data-testid="pagination-list-item"><a>{}</a></li>"#, p))
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", items)
}

fn index_page(slugs: &[&str]) -> String {
    let cards: String = slugs
        .iter()
        .map(|s| format!(r#"<article><h2><a href="/oferta/{}">{}</a></h2></article>"#, s, s))
        .collect();
    format!("<html><body><main>{}</main></body></html>", cards)
}

fn attr(testid: &str, value: &str) -> String {
    format!(
        r#"<div data-testid="{}"><p>Label</p><p>{}</p></div>"#,
        testid, value
    )
}

fn full_detail(brand: &str) -> String {
    format!(
        r#"<html><body>
        <h1 class="offer-title">{} Sprinter</h1>
        <h3 class="offer-price__number">89 000 PLN</h3>
        {}{}{}
        <div data-testid="content-equipments-section"><ul><li>ABS</li><li>Hak</li></ul></div>
        <div data-testid="content-description-section"><p>Zadbany.</p><p>Bez wkładu.</p></div>
        </body></html>"#,
        brand,
        attr("make", brand),
        attr("color", "Srebrny"),
        attr("year", "2018"),
    )
}

fn sparse_detail() -> String {
    format!(
        r#"<html><body>
        <h1 class="offer-title">Renault Master</h1>
        {}
        <div data-testid="content-description-section">Krótki opis</div>
        </body></html>"#,
        attr("make", "Renault"),
    )
}

async fn mount_landing(server: &MockServer, total_pages: u32) {
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(NoQuery)
        .respond_with(html(landing_page(total_pages)))
        .mount(server)
        .await;
}

async fn mount_index(server: &MockServer, page: u32, slugs: &[&str]) {
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(html(index_page(slugs)))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, slug: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/oferta/{}", slug)))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_landing(&server, 1).await;
    mount_index(&server, 1, &["mercedes-1", "renault-2"]).await;
    mount_detail(&server, "mercedes-1", full_detail("Mercedes-Benz")).await;
    mount_detail(&server, "renault-2", sparse_detail()).await;

    let config = create_test_config(&server, dir.path(), 1);
    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.total_pages, 1);
    assert_eq!(report.pages_written, vec![1]);
    assert_eq!(report.records_written, 2);
    assert_eq!(report.links.len(), 2);
    assert!(report.page_failures.is_empty());

    let records = read_partition(&dir.path().join("page_001.csv")).expect("Failed to read partition");
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.url, format!("{}/oferta/mercedes-1", server.uri()));
    assert_eq!(first.brand.as_deref(), Some("Mercedes-Benz"));
    assert_eq!(first.color.as_deref(), Some("Srebrny"));
    assert_eq!(first.title.as_deref(), Some("Mercedes-Benz Sprinter"));
    assert_eq!(first.equipment, vec!["ABS".to_string(), "Hak".to_string()]);
    assert_eq!(first.description, "Zadbany.\nBez wkładu.");

    let second = &records[1];
    assert_eq!(second.brand.as_deref(), Some("Renault"));
    assert_eq!(second.color, None);
    assert_eq!(second.price, None);
    assert!(second.equipment.is_empty());
    assert_eq!(second.description, "Krótki opis");
}

#[tokio::test]
async fn test_rerun_does_not_refetch_written_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_landing(&server, 2).await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("page", "1"))
        .respond_with(html(index_page(&["a"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("page", "2"))
        .respond_with(html(index_page(&["b"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/oferta/a"))
        .respond_with(html(full_detail("Fiat")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/oferta/b"))
        .respond_with(html(full_detail("Opel")))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path(), 2);
    let first = crawl(config.clone()).await.expect("First crawl failed");
    assert_eq!(first.pages_written.len(), 2);

    let before = std::fs::read(dir.path().join("page_001.csv")).expect("Missing partition");

    let second = crawl(config).await.expect("Second crawl failed");
    assert!(second.pages_written.is_empty());
    let mut skipped = second.pages_skipped.clone();
    skipped.sort_unstable();
    assert_eq!(skipped, vec![1, 2]);

    let after = std::fs::read(dir.path().join("page_001.csv")).expect("Missing partition");
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_missing_pagination_crawls_first_page_only() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(NoQuery)
        .respond_with(html("<html><body>no pagination here</body></html>".to_string()))
        .mount(&server)
        .await;
    mount_index(&server, 1, &["only"]).await;
    mount_detail(&server, "only", full_detail("Iveco")).await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("page", "2"))
        .respond_with(html(index_page(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path(), 5);
    let report = crawl(config).await.expect("Crawl failed");

    assert!(report.pagination_fallback);
    assert_eq!(report.total_pages, 1);
    assert_eq!(report.pages_written, vec![1]);
}

#[tokio::test]
async fn test_unreachable_target_fails_before_writing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("pages");

    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(&server, &output, 3);
    let mut coordinator = Coordinator::new(&config).expect("Failed to create coordinator");
    let err = coordinator.run().await.expect_err("Crawl should fail");

    match err {
        HarvestError::TargetUnreachable { url, reason } => {
            assert_eq!(url, format!("{}{}", server.uri(), INDEX_PATH));
            assert!(reason.contains("503"), "unexpected reason: {}", reason);
        }
        other => panic!("Unexpected error: {}", other),
    }
    assert_eq!(coordinator.phase(), CrawlPhase::Failed);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_failing_detail_keeps_rest_of_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_landing(&server, 1).await;
    mount_index(&server, 1, &["ok-1", "broken", "ok-2"]).await;
    mount_detail(&server, "ok-1", full_detail("Ford")).await;
    mount_detail(&server, "ok-2", full_detail("Citroen")).await;
    Mock::given(method("GET"))
        .and(path("/oferta/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path(), 1);
    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.pages_written, vec![1]);
    assert_eq!(report.records_written, 2);
    assert_eq!(report.links.len(), 3);
    assert_eq!(report.listing_failures.len(), 1);
    assert_eq!(
        report.listing_failures[0].url,
        format!("{}/oferta/broken", server.uri())
    );

    let records = read_partition(&dir.path().join("page_001.csv")).expect("Failed to read partition");
    let brands: Vec<_> = records.iter().map(|r| r.brand.as_deref()).collect();
    assert_eq!(brands, vec![Some("Ford"), Some("Citroen")]);
}

#[tokio::test]
async fn test_failed_index_page_is_retried_on_next_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_landing(&server, 2).await;
    mount_index(&server, 1, &["a"]).await;
    mount_detail(&server, "a", full_detail("Fiat")).await;
    mount_detail(&server, "b", full_detail("Opel")).await;

    // Page 2 fails once, then recovers
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_index(&server, 2, &["b"]).await;

    let config = create_test_config(&server, dir.path(), 2);
    let writer = PartitionWriter::from_config(&config.output);

    let first = crawl(config.clone()).await.expect("First crawl failed");
    assert_eq!(first.pages_written, vec![1]);
    assert_eq!(first.page_failures.len(), 1);
    assert_eq!(first.page_failures[0].page, 2);
    assert!(!writer.exists(2));

    let second = crawl(config).await.expect("Second crawl failed");
    assert_eq!(second.pages_written, vec![2]);
    assert_eq!(second.pages_skipped, vec![1]);
    assert_eq!(writer.list_pages().expect("Failed to list partitions"), vec![1, 2]);
}

#[tokio::test]
async fn test_page_range_clamped_to_probed_total() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_landing(&server, 3).await;
    mount_index(&server, 2, &["b"]).await;
    mount_index(&server, 3, &["c"]).await;
    mount_detail(&server, "b", full_detail("Fiat")).await;
    mount_detail(&server, "c", full_detail("Opel")).await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("page", "1"))
        .respond_with(html(index_page(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, dir.path(), 10);
    config.crawler.start_page = 2;
    let report = crawl(config).await.expect("Crawl failed");

    let plan = report.plan.expect("Plan should be resolved");
    assert_eq!(plan.pages().collect::<Vec<_>>(), vec![2, 3]);
    let mut written = report.pages_written.clone();
    written.sort_unstable();
    assert_eq!(written, vec![2, 3]);
}

#[tokio::test]
async fn test_partitions_written_in_completion_order() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_landing(&server, 2).await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("page", "1"))
        .respond_with(html(index_page(&["slow"])).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;
    mount_index(&server, 2, &["fast"]).await;
    mount_detail(&server, "slow", full_detail("Fiat")).await;
    mount_detail(&server, "fast", full_detail("Opel")).await;

    let config = create_test_config(&server, dir.path(), 2);
    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.pages_written, vec![2, 1]);
}

#[tokio::test]
async fn test_merge_after_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("pages");

    mount_landing(&server, 2).await;
    mount_index(&server, 1, &["a", "b"]).await;
    mount_index(&server, 2, &["c"]).await;
    mount_detail(&server, "a", full_detail("Fiat")).await;
    mount_detail(&server, "b", sparse_detail()).await;
    mount_detail(&server, "c", full_detail("Opel")).await;

    let config = create_test_config(&server, &output, 2);
    crawl(config.clone()).await.expect("Crawl failed");

    let merged_path = dir.path().join("dataset.csv");
    let writer = PartitionWriter::from_config(&config.output);
    let summary = merge_partitions(&writer, &merged_path).expect("Merge failed");
    assert_eq!(summary.partitions, 2);
    assert_eq!(summary.records, 3);

    let merged = read_partition(&merged_path).expect("Failed to read merged file");
    let brands: Vec<_> = merged.iter().map(|r| r.brand.as_deref()).collect();
    assert_eq!(brands, vec![Some("Fiat"), Some("Renault"), Some("Opel")]);
}
