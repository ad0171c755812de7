//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end, checking the link list and error log on disk.

use campus_crawler::config::{
    Config, CrawlerConfig, OutputConfig, RobotsConfig, RobotsFailurePolicy, ScopeConfig,
    UserAgentConfig,
};
use campus_crawler::crawler::{crawl, Coordinator, FailureKind};
use campus_crawler::output::{CrawlSummary, Reporter};
use campus_crawler::StopReason;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration scoped to the mock server's host
fn create_test_config(seed: String, max_pages: usize, dir: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_pages,
            request_timeout_secs: 5,
            request_delay_ms: 10, // Very short for testing
            flush_every: 2,
        },
        scope: ScopeConfig {
            allowed_domain_suffix: "127.0.0.1".to_string(),
            skip_url_patterns: vec!["/login".to_string(), "/logout".to_string()],
            skip_extensions: vec![".pdf".to_string(), ".jpg".to_string()],
        },
        robots: RobotsConfig::default(),
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.edu/contact".to_string(),
            contact_email: "test@example.edu".to_string(),
        },
        output: OutputConfig {
            links_path: dir.path().join("links.txt").display().to_string(),
            error_log_path: dir.path().join("errors.log").display().to_string(),
        },
        seeds: vec![seed],
    }
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>Test</title></head><body>{}</body></html>",
            body
        ),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(body))
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, content: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(content))
        .mount(server)
        .await;
}

/// Mounts the small site graph used by several tests:
///
/// `/` -> `/a`, `/b`; `/a` -> off-domain `/c`, back to `/`; `/b` -> `/d`
async fn mount_site(server: &MockServer) {
    mount_robots(server, "User-agent: *\nAllow: /").await;
    mount_page(server, "/", r#"<a href="/a">A</a> <a href="/b">B</a>"#).await;
    mount_page(
        server,
        "/a",
        r#"<a href="http://other.example.org/c">C</a> <a href="/">Home</a>"#,
    )
    .await;
    mount_page(server, "/b", r#"<a href="/d">D</a>"#).await;
    mount_page(server, "/d", "").await;
}

async fn run(config: Config) -> CrawlSummary {
    Coordinator::new(config, None)
        .expect("Failed to create coordinator")
        .with_reporter(Reporter::new(true))
        .run()
        .await
        .expect("Crawl failed")
}

fn links_path(dir: &TempDir) -> PathBuf {
    dir.path().join("links.txt")
}

fn error_log_path(dir: &TempDir) -> PathBuf {
    dir.path().join("errors.log")
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_cap_stops_breadth_first_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let summary = run(create_test_config(format!("{}/", base_url), 3, &dir)).await;

    assert_eq!(summary.stop_reason, StopReason::MaxPagesReached);
    assert_eq!(summary.saved, 3);
    assert_eq!(summary.frontier_remaining, 1, "/d should still be queued");

    let links = read_lines(&links_path(&dir));
    assert_eq!(
        links,
        vec![
            format!("{}/", base_url),
            format!("{}/a", base_url),
            format!("{}/b", base_url),
        ]
    );
}

#[tokio::test]
async fn test_exhausts_reachable_graph() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let summary = run(create_test_config(format!("{}/", base_url), 100, &dir)).await;

    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.saved, 4);
    assert_eq!(summary.frontier_remaining, 0);

    let links = read_lines(&links_path(&dir));
    assert_eq!(
        links,
        vec![
            format!("{}/", base_url),
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            format!("{}/d", base_url),
        ]
    );

    // Every saved URL stays on the allowed host
    assert!(links.iter().all(|l| l.starts_with(&base_url)));
    assert!(read_lines(&error_log_path(&dir)).is_empty());
}

#[tokio::test]
async fn test_cap_equal_to_graph_size_reports_exhausted() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let summary = run(create_test_config(format!("{}/", base_url), 4, &dir)).await;

    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.saved, 4);
}

#[tokio::test]
async fn test_not_found_is_logged_and_crawl_continues() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/", r#"<a href="/e">E</a> <a href="/f">F</a>"#).await;
    mount_page(&mock_server, "/f", "").await;
    Mock::given(method("GET"))
        .and(path("/e"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let summary = run(create_test_config(format!("{}/", base_url), 100, &dir)).await;

    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.saved, 2);
    assert_eq!(
        summary.statistics.failures.get(&FailureKind::Http),
        Some(&1)
    );

    let links = read_lines(&links_path(&dir));
    assert_eq!(
        links,
        vec![format!("{}/", base_url), format!("{}/f", base_url)]
    );

    let errors = read_lines(&error_log_path(&dir));
    assert_eq!(errors.len(), 1);
    let fields: Vec<&str> = errors[0].split('\t').collect();
    assert_eq!(fields[1], "http");
    assert_eq!(fields[2], "404");
    assert_eq!(fields[3], format!("{}/e", base_url));
}

#[tokio::test]
async fn test_server_errors_do_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/broken">Broken</a> <a href="/ok">OK</a>"#,
    )
    .await;
    mount_page(&mock_server, "/ok", r#"<a href="/deeper">Deeper</a>"#).await;
    mount_page(&mock_server, "/deeper", "").await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let summary = run(create_test_config(format!("{}/", base_url), 100, &dir)).await;

    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.saved, 3);
    assert_eq!(summary.statistics.total_failures(), 1);

    let errors = read_lines(&error_log_path(&dir));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("\t500\t"));
}

#[tokio::test]
async fn test_robots_disallowed_paths_never_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow: /admin").await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/admin">Admin</a> <a href="/admin/users">Users</a> <a href="/public">Public</a>"#,
    )
    .await;
    mount_page(&mock_server, "/public", "").await;

    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let summary = run(create_test_config(format!("{}/", base_url), 100, &dir)).await;

    assert_eq!(summary.saved, 2);
    assert_eq!(summary.statistics.robots_denied, 2);

    let links = read_lines(&links_path(&dir));
    assert!(links.iter().all(|l| !l.contains("/admin")));
}

#[tokio::test]
async fn test_robots_fetched_once_per_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", r#"<a href="/a">A</a> <a href="/b">B</a>"#).await;
    mount_page(&mock_server, "/a", "").await;
    mount_page(&mock_server, "/b", "").await;

    let dir = TempDir::new().unwrap();
    let summary = run(create_test_config(format!("{}/", base_url), 100, &dir)).await;
    assert_eq!(summary.saved, 3);
}

#[tokio::test]
async fn test_robots_unavailable_fail_closed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/", base_url), 100, &dir);
    config.robots.on_fetch_failure = RobotsFailurePolicy::Deny;

    let summary = run(config).await;
    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.saved, 0);
    assert_eq!(summary.statistics.robots_denied, 1);
}

#[tokio::test]
async fn test_redirects_never_leave_scope() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = url::Url::parse(&base_url).unwrap().port().unwrap();

    mount_robots(&mock_server, "User-agent: *\nDisallow: /private").await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/go">Go</a> <a href="/away">Away</a> <a href="/moved">Moved</a>"#,
    )
    .await;

    // In-domain hop to a robots-disallowed path
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/private/secret"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    // Hop to a host outside the allowed suffix (same listener, other name)
    Mock::given(method("GET"))
        .and(path("/away"))
        .respond_with(ResponseTemplate::new(302).insert_header(
            "Location",
            format!("http://localhost:{}/outside", port).as_str(),
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/outside"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    // Allowed hop is followed
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new-home"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new-home"))
        .respond_with(html_page(""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let summary = run(create_test_config(format!("{}/", base_url), 100, &dir)).await;

    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.saved, 2);
    assert_eq!(
        summary.statistics.failures.get(&FailureKind::Redirect),
        Some(&2)
    );

    let links = read_lines(&links_path(&dir));
    assert_eq!(
        links,
        vec![format!("{}/", base_url), format!("{}/moved", base_url)]
    );

    let errors = read_lines(&error_log_path(&dir));
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|line| line.contains("\tredirect\t")));
    assert!(errors[0].ends_with(&format!("{}/go", base_url)));
    assert!(errors[1].ends_with(&format!("{}/away", base_url)));
}

#[tokio::test]
async fn test_no_duplicate_visits() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    // Several spellings of the same pages, plus cycles back to the seed
    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<a href="/x">X</a> <a href="/x#section">X again</a>
               <a href="{}/x">X absolute</a> <a href="/y">Y</a> <a href="/">Self</a>"#,
            base_url
        ),
    )
    .await;
    mount_page(&mock_server, "/x", r#"<a href="/y">Y</a> <a href="/">Home</a>"#).await;
    mount_page(&mock_server, "/y", r#"<a href="/x">X</a>"#).await;

    let dir = TempDir::new().unwrap();
    let summary = run(create_test_config(format!("{}/", base_url), 100, &dir)).await;
    assert_eq!(summary.saved, 3);

    let links = read_lines(&links_path(&dir));
    let unique: HashSet<&String> = links.iter().collect();
    assert_eq!(links.len(), 3);
    assert_eq!(unique.len(), links.len());
}

#[tokio::test]
async fn test_skip_patterns_and_extensions_not_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/login?next=/">Login</a> <a href="/files/report.PDF">Report</a>
           <a href="/photo.jpg">Photo</a> <a href="/news">News</a>"#,
    )
    .await;
    mount_page(&mock_server, "/news", "").await;

    for route in ["/login", "/files/report.PDF", "/photo.jpg"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html_page(""))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let summary = run(create_test_config(format!("{}/", base_url), 100, &dir)).await;

    assert_eq!(summary.saved, 2);
    assert_eq!(summary.statistics.scope_rejections, 3);
}

#[tokio::test]
async fn test_crawl_entry_point() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let summary = crawl(create_test_config(format!("{}/", base_url), 2, &dir))
        .await
        .expect("Crawl failed");

    assert_eq!(summary.stop_reason, StopReason::MaxPagesReached);
    assert_eq!(read_lines(&links_path(&dir)).len(), 2);
}
