//! Rate-limited HTTP fetch client
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - The robots.txt gate (one paced fetch per new origin)
//! - Process-wide pacing of every network attempt
//! - Retry with exponential backoff for transient failures
//! - Bounded body reads and redirect resolution

use crate::config::CrawlConfig;
use crate::crawler::pacer::{sleep_or_cancel, Pacer, RetryPolicy};
use crate::robots::RobotsCache;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Upper bound for the TCP connect phase
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Response of a completed fetch
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URL that was requested
    pub url: String,

    /// Final HTTP status code
    pub status_code: u16,

    /// Content-Type header value
    pub content_type: Option<String>,

    /// Decoded body; absent when oversized or not a text type
    pub body: Option<String>,

    /// URL the content was served from after redirects
    pub final_url: String,

    /// When the response headers arrived
    pub fetched_at: DateTime<Utc>,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn was_redirected(&self) -> bool {
        self.final_url != self.url
    }
}

/// Disposition of a fetch call
#[derive(Debug)]
pub enum FetchOutcome {
    /// A response was received (any status)
    Fetched(FetchResult),

    /// Robots denial, permanent error, or retries exhausted
    Failed,

    /// The stop signal fired during pacing or backoff
    Interrupted,
}

impl FetchOutcome {
    pub fn into_result(self) -> Option<FetchResult> {
        match self {
            Self::Fetched(result) => Some(result),
            Self::Failed | Self::Interrupted => None,
        }
    }
}

/// Builds the HTTP client used for pages and robots.txt
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    let timeout = config.politeness.timeout_duration();

    Client::builder()
        .user_agent(config.politeness.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetch client owning the pacing clock and the robots cache
pub struct FetchClient {
    client: Client,
    robots: RobotsCache,
    pacer: Pacer,
    retry: RetryPolicy,
    user_agent: String,
    obey_robots: bool,
    max_content_bytes: usize,
    cancel: CancellationToken,
    requests: u64,
}

impl FetchClient {
    pub fn new(config: &CrawlConfig, cancel: CancellationToken) -> Result<Self, HarvestError> {
        let politeness = &config.politeness;
        Ok(Self {
            client: build_http_client(config)?,
            robots: RobotsCache::new(config.crawl.max_content_bytes),
            pacer: Pacer::new(politeness.rate, politeness.jitter),
            retry: RetryPolicy::new(
                politeness.max_retries,
                politeness.backoff_base,
                politeness.jitter,
            ),
            user_agent: politeness.user_agent.clone(),
            obey_robots: politeness.obey_robots,
            max_content_bytes: config.crawl.max_content_bytes,
            cancel,
            requests: 0,
        })
    }

    /// Fetches `url`, returning `None` on any failure
    pub async fn fetch(&mut self, url: &str) -> Option<FetchResult> {
        self.fetch_outcome(url).await.into_result()
    }

    /// Fetches `url`, distinguishing failures from interruption by the stop signal
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Robots disallow | `Failed`, no network attempt |
    /// | HTTP 429 / 5xx | Retry with backoff |
    /// | Timeout, connect, protocol or body error | Retry with backoff |
    /// | Any other HTTP status | `Fetched` |
    /// | Any other client error | `Failed` immediately |
    /// | Attempts exhausted | `Failed` |
    pub async fn fetch_outcome(&mut self, url: &str) -> FetchOutcome {
        if self.obey_robots {
            match self.robots_allows(url).await {
                Some(true) => {}
                Some(false) => {
                    tracing::info!("Disallowed by robots.txt: {}", url);
                    return FetchOutcome::Failed;
                }
                None => return FetchOutcome::Interrupted,
            }
        }

        for attempt in 0..self.retry.max_attempts {
            if !self.pacer.wait(&self.cancel).await {
                return FetchOutcome::Interrupted;
            }

            self.pacer.record_request();
            self.requests += 1;

            let failure = match self.client.get(url).send().await {
                Ok(response) if is_retryable_status(response.status()) => {
                    format!("HTTP {}", response.status().as_u16())
                }
                Ok(response) => match self.read_response(url, response).await {
                    Ok(result) => return FetchOutcome::Fetched(result),
                    Err(e) if is_retryable_error(&e) => e.to_string(),
                    Err(e) => {
                        tracing::warn!("Permanent fetch error for {}: {}", url, e);
                        return FetchOutcome::Failed;
                    }
                },
                Err(e) if is_retryable_error(&e) => e.to_string(),
                Err(e) => {
                    tracing::warn!("Permanent fetch error for {}: {}", url, e);
                    return FetchOutcome::Failed;
                }
            };

            if attempt + 1 >= self.retry.max_attempts {
                tracing::warn!(
                    "Giving up on {} after {} attempts: {}",
                    url,
                    self.retry.max_attempts,
                    failure
                );
                break;
            }

            let delay = self.retry.delay_for(attempt);
            tracing::warn!(
                "Attempt {}/{} for {} failed ({}), retrying in {:.2}s",
                attempt + 1,
                self.retry.max_attempts,
                url,
                failure,
                delay.as_secs_f64()
            );

            if !sleep_or_cancel(delay, &self.cancel).await {
                return FetchOutcome::Interrupted;
            }
        }

        FetchOutcome::Failed
    }

    /// Robots decision for `url`; `None` when interrupted while pacing the robots.txt request
    async fn robots_allows(&mut self, url: &str) -> Option<bool> {
        if let Some(decision) = self.robots.cached_decision(&self.user_agent, url) {
            return Some(decision);
        }

        if RobotsCache::origin_of(url).is_none() {
            return Some(true);
        }

        if !self.pacer.wait(&self.cancel).await {
            return None;
        }
        self.pacer.record_request();
        self.requests += 1;

        Some(self.robots.allowed(&self.client, &self.user_agent, url).await)
    }

    async fn read_response(&self, url: &str, response: Response) -> Result<FetchResult, reqwest::Error> {
        let fetched_at = Utc::now();
        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string());

        let body = if is_textual(content_type.as_deref()) {
            read_capped_body(response, self.max_content_bytes).await?
        } else {
            None
        };

        if final_url != url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        Ok(FetchResult {
            url: url.to_string(),
            status_code,
            content_type,
            body,
            final_url,
            fetched_at,
        })
    }

    /// Network requests issued so far, robots.txt included
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    /// Number of origins with a cached robots policy
    pub fn robots_origins(&self) -> usize {
        self.robots.len()
    }

    /// Releases the client; pooled connections are dropped with it
    pub fn close(&mut self) {
        tracing::debug!(
            "Fetch client closed after {} requests across {} origins",
            self.requests,
            self.robots.len()
        );
    }
}

/// Reads at most `max_bytes` of body; `Ok(None)` when the body is larger
pub(crate) async fn read_capped_body(
    mut response: Response,
    max_bytes: usize,
) -> Result<Option<String>, reqwest::Error> {
    if let Some(length) = response.content_length() {
        if length > max_bytes as u64 {
            tracing::debug!(
                "Skipping body of {}: {} bytes exceeds limit",
                response.url(),
                length
            );
            return Ok(None);
        }
    }

    let mut buffer = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if buffer.len() + chunk.len() > max_bytes {
            tracing::debug!("Skipping body of {}: exceeds {} bytes", response.url(), max_bytes);
            return Ok(None);
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout()
        || error.is_connect()
        || error.is_request()
        || error.is_body()
        || error.is_decode()
}

/// True for content types whose body is worth decoding as text
///
/// A missing header is treated as textual so the HTML check can decide later.
fn is_textual(content_type: Option<&str>) -> bool {
    let Some(ct) = content_type else {
        return true;
    };
    let ct = ct.to_ascii_lowercase();
    ct.starts_with("text/") || ct.contains("html") || ct.contains("xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use std::time::Instant;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HTML: &str = "<html><body><p>Bonjour</p></body></html>";

    fn test_config(base: &str, extra_politeness: &str) -> CrawlConfig {
        let toml = format!(
            r#"
[crawl]
seeds = ["{base}/education/fr"]
allow-paths = ["/education"]
target-domain = "127.0.0.1"
max-content-bytes = 1000

[politeness]
user-agent = "TestBot/1.0 (+test@example.com)"
rate = 100.0
timeout = 5.0
max-retries = 3
backoff-base = 0.01
jitter = 0.0
{extra_politeness}

[output]
records-path = "records.jsonl"
"#
        );
        parse_config(&toml, None).unwrap()
    }

    fn client_for(server: &MockServer, extra: &str) -> FetchClient {
        let config = test_config(&server.uri(), extra);
        FetchClient::new(&config, CancellationToken::new()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/education/fr"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(HTML)
                    .insert_header("content-type", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let mut client = client_for(&server, "obey-robots = false");
        let url = format!("{}/education/fr", server.uri());
        let before = Utc::now();
        let result = client.fetch(&url).await.unwrap();
        let after = Utc::now();

        assert_eq!(result.status_code, 200);
        assert_eq!(result.content_type.as_deref(), Some("text/html; charset=utf-8"));
        assert_eq!(result.body.as_deref(), Some(HTML));
        assert_eq!(result.final_url, url);
        assert!(!result.was_redirected());
        assert!(before <= result.fetched_at && result.fetched_at <= after);
    }

    #[tokio::test]
    async fn test_retries_exhausted_on_503() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/education/busy"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let mut client = client_for(&server, "obey-robots = false");
        let result = client
            .fetch(&format!("{}/education/busy", server.uri()))
            .await;

        assert!(result.is_none());
        assert_eq!(client.request_count(), 3);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/education/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/education/flaky"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(HTML, "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let mut client = client_for(&server, "obey-robots = false");
        let result = client
            .fetch(&format!("{}/education/flaky", server.uri()))
            .await
            .unwrap();

        assert_eq!(result.status_code, 200);
        assert_eq!(client.request_count(), 3);
    }

    #[tokio::test]
    async fn test_rate_limited_status_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/education/limited"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&server)
            .await;

        let mut client = client_for(&server, "obey-robots = false");
        assert!(client
            .fetch(&format!("{}/education/limited", server.uri()))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/education/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server, "obey-robots = false");
        let result = client
            .fetch(&format!("{}/education/missing", server.uri()))
            .await
            .unwrap();

        assert_eq!(result.status_code, 404);
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn test_oversized_body_is_absent() {
        let server = MockServer::start().await;
        let big = format!("<html><body>{}</body></html>", "x".repeat(5000));
        Mock::given(method("GET"))
            .and(path("/education/big"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(big, "text/html"))
            .mount(&server)
            .await;

        let mut client = client_for(&server, "obey-robots = false");
        let result = client
            .fetch(&format!("{}/education/big", server.uri()))
            .await
            .unwrap();

        assert_eq!(result.status_code, 200);
        assert_eq!(result.content_type.as_deref(), Some("text/html"));
        assert!(result.body.is_none());
    }

    #[tokio::test]
    async fn test_binary_body_not_read() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/education/doc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(vec![0x25u8, 0x50, 0x44, 0x46], "application/pdf"),
            )
            .mount(&server)
            .await;

        let mut client = client_for(&server, "obey-robots = false");
        let result = client
            .fetch(&format!("{}/education/doc", server.uri()))
            .await
            .unwrap();

        assert_eq!(result.content_type.as_deref(), Some("application/pdf"));
        assert!(result.body.is_none());
    }

    #[tokio::test]
    async fn test_redirect_reports_final_url() {
        let server = MockServer::start().await;
        let target = format!("{}/education/new", server.uri());
        Mock::given(method("GET"))
            .and(path("/education/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", target.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/education/new"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(HTML, "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let mut client = client_for(&server, "obey-robots = false");
        let result = client
            .fetch(&format!("{}/education/old", server.uri()))
            .await
            .unwrap();

        assert_eq!(result.final_url, target);
        assert!(result.was_redirected());
    }

    #[tokio::test]
    async fn test_robots_disallow_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: TestBot\nDisallow: /education/private"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/education/private"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut client = client_for(&server, "");
        let url = format!("{}/education/private", server.uri());

        assert!(client.fetch(&url).await.is_none());
        assert!(client.fetch(&url).await.is_none());
        assert_eq!(client.request_count(), 1);
        assert_eq!(client.robots_origins(), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_fails_after_retries() {
        let toml_base = "http://127.0.0.1:1";
        let config = test_config(toml_base, "obey-robots = false");
        let mut client = FetchClient::new(&config, CancellationToken::new()).unwrap();

        assert!(client.fetch("http://127.0.0.1:1/education/fr").await.is_none());
        assert_eq!(client.request_count(), 3);
    }

    #[tokio::test]
    async fn test_consecutive_fetches_are_paced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(HTML, "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let mut config = test_config(&server.uri(), "obey-robots = false");
        config.politeness.rate = 2.0;
        config.politeness.jitter = 0.2;
        let mut client = FetchClient::new(&config, CancellationToken::new()).unwrap();

        let start = Instant::now();
        client.fetch(&format!("{}/education/a", server.uri())).await.unwrap();
        client.fetch(&format!("{}/education/b", server.uri())).await.unwrap();
        let elapsed = start.elapsed().as_secs_f64();

        assert!(elapsed >= 0.5, "elapsed {}", elapsed);
        assert!(elapsed < 1.5, "elapsed {}", elapsed);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_backoff() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut config = test_config(&server.uri(), "obey-robots = false");
        config.politeness.backoff_base = 30.0;
        let cancel = CancellationToken::new();
        let mut client = FetchClient::new(&config, cancel.clone()).unwrap();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let outcome = client
            .fetch_outcome(&format!("{}/education/slow", server.uri()))
            .await;

        assert!(matches!(outcome, FetchOutcome::Interrupted));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_retryable_status() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::FORBIDDEN));
    }

    #[test]
    fn test_is_textual() {
        assert!(is_textual(Some("text/html; charset=utf-8")));
        assert!(is_textual(Some("application/xhtml+xml")));
        assert!(is_textual(Some("text/plain")));
        assert!(is_textual(None));
        assert!(!is_textual(Some("application/pdf")));
        assert!(!is_textual(Some("image/png")));
    }
}
