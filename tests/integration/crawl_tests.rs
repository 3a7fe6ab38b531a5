//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! seed → fetch → extract → emit → checkpoint cycle end-to-end.

use section_harvest::config::{parse_config, CrawlConfig};
use section_harvest::crawler::run_crawl;
use section_harvest::output::PageRecord;
use section_harvest::state::PageOutcome;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at the mock server and a temp directory
fn create_test_config(base: &str, dir: &Path, max_pages: u64, politeness: &str) -> CrawlConfig {
    let toml = format!(
        r#"
[crawl]
seeds = ["{base}/education/fr/"]
allow-paths = ["/education/fr"]
target-domain = "127.0.0.1"
max-pages = {max_pages}
checkpoint-interval = 1

[politeness]
user-agent = "TestBot/1.0 (+test@example.com)"
rate = 50.0
timeout = 5.0
max-retries = 3
backoff-base = 0.01
jitter = 0.0
{politeness}

[output]
records-path = "{records}"
state-dir = "{state}"
"#,
        records = dir.join("records.jsonl").display(),
        state = dir.join("state").display(),
    );
    parse_config(&toml, None).expect("valid test config")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

fn read_records(config: &CrawlConfig) -> Vec<PageRecord> {
    std::fs::read_to_string(&config.output.records_path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid record line"))
        .collect()
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect()
}

const SEED_PAGE: &str = r#"<html lang="fr"><head><title>Formation</title></head>
<body><main>
  <h1>Formation</h1>
  <p>Bienvenue dans la section formation.</p>
  <a href="/education/fr/programs">Programmes</a>
  <a href="/about">À propos</a>
</main></body></html>"#;

const PROGRAMS_PAGE: &str = r#"<html lang="fr"><head><title>Programmes</title></head>
<body><main>
  <p>Liste des programmes.</p>
  <a href="/education/fr/">Retour</a>
</main></body></html>"#;

#[tokio::test]
async fn test_out_of_scope_link_never_enqueued() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/education/fr"))
        .respond_with(html(SEED_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<html><body><p>About</p></body></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path(), 1, "obey-robots = false");
    let frontier = config.output.frontier_file();

    let stats = run_crawl(config.clone(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stats.processed, 1);

    let records = read_records(&config);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, format!("{}/education/fr", base));
    assert_eq!(records[0].title.as_deref(), Some("Formation"));
    assert_eq!(records[0].lang.as_deref(), Some("fr"));

    assert_eq!(
        read_lines(&frontier),
        vec![format!("{}/education/fr/programs", base)]
    );
}

#[tokio::test]
async fn test_pdf_content_type_marked_visited_without_record() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/education/fr"))
        .respond_with(html(
            r#"<html><body><main><p>Brochures</p>
            <a href="/education/fr/brochure">Télécharger</a></main></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/education/fr/brochure"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path(), 10, "obey-robots = false");

    let stats = run_crawl(config.clone(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.count(PageOutcome::NotHtml), 1);

    let records = read_records(&config);
    assert_eq!(records.len(), 1);
    assert!(records.iter().all(|r| !r.url.ends_with("/brochure")));

    let visited = read_lines(&config.output.visited_file());
    assert!(visited.contains(&format!("{}/education/fr/brochure", base)));
}

#[tokio::test]
async fn test_resume_does_not_duplicate_records() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/education/fr"))
        .respond_with(html(SEED_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/education/fr/programs"))
        .respond_with(html(PROGRAMS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();

    let first = create_test_config(&base, dir.path(), 1, "obey-robots = false");
    run_crawl(first.clone(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(read_records(&first).len(), 1);

    let second = create_test_config(&base, dir.path(), 10, "obey-robots = false");
    let stats = run_crawl(second.clone(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stats.processed, 1);

    let urls: Vec<String> = read_records(&second).into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/education/fr", base),
            format!("{}/education/fr/programs", base),
        ]
    );
    assert!(read_lines(&second.output.frontier_file()).is_empty());
}

#[tokio::test]
async fn test_robots_disallow_respected() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: TestBot\nDisallow: /education/fr/programs\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/education/fr"))
        .respond_with(html(SEED_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/education/fr/programs"))
        .respond_with(html(PROGRAMS_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path(), 10, "");

    let stats = run_crawl(config.clone(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.count(PageOutcome::FetchFailed), 1);

    let visited = read_lines(&config.output.visited_file());
    assert!(visited.contains(&format!("{}/education/fr/programs", base)));
}

#[tokio::test]
async fn test_retry_exhaustion_skips_page() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/education/fr"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, dir.path(), 10, "obey-robots = false");

    let stats = run_crawl(config.clone(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stats.processed, 0);
    assert_eq!(stats.count(PageOutcome::FetchFailed), 1);
    assert!(read_records(&config).is_empty());
    assert_eq!(
        read_lines(&config.output.visited_file()),
        vec![format!("{}/education/fr", base)]
    );
}

#[tokio::test]
async fn test_stop_during_backoff_keeps_url_pending() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/education/fr"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base, dir.path(), 10, "obey-robots = false");
    config.politeness.backoff_base = 60.0;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let stats = run_crawl(config.clone(), cancel).await.unwrap();
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(stats.count(PageOutcome::Interrupted), 1);

    assert_eq!(
        read_lines(&config.output.frontier_file()),
        vec![format!("{}/education/fr", base)]
    );
    assert!(read_lines(&config.output.visited_file()).is_empty());
}

#[tokio::test]
async fn test_pre_cancelled_crawl_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 10, "");

    let cancel = CancellationToken::new();
    cancel.cancel();
    let stats = run_crawl(config.clone(), cancel).await.unwrap();

    assert_eq!(stats.processed, 0);
    assert_eq!(
        read_lines(&config.output.frontier_file()),
        vec![format!("{}/education/fr", server.uri())]
    );
}
