//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - A single global pacing delay between requests
//! - GET requests with a bounded timeout
//! - Single-hop requests: redirects are reported, never followed here
//! - Status and Content-Type classification before any body is read
//! - Error classification into HTTP/transport/timeout/TLS failures

use crate::config::UserAgentConfig;
use reqwest::header::{HeaderMap, CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Response};
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use url::Url;

/// Maximum redirect hops followed for a single URL
pub const MAX_REDIRECTS: usize = 10;

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects; relative links resolve against this
    pub final_url: Url,

    /// HTTP status code (always 2xx)
    pub status_code: u16,

    /// Content-Type header value (may be empty when the server sent none)
    pub content_type: String,

    /// Page body
    pub body: String,
}

/// What a page request produced when it did not fail
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// An HTML page, body included
    Page(FetchedPage),

    /// A 3xx answer; `location` is the raw `Location` header, unresolved
    Redirect { location: String },
}

/// A response of any status, as returned before page-level classification
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub final_url: Url,
    pub status_code: u16,
    pub content_type: String,
    pub location: Option<String>,
    pub body: String,
}

/// Decision taken from the status line and headers alone
#[derive(Debug, Clone, PartialEq, Eq)]
enum HeadVerdict {
    /// 2xx HTML; the body is worth reading
    Page,
    /// 3xx with a `Location` header
    Redirect(String),
}

/// Returns true for the 3xx family
pub fn is_redirect_status(status_code: u16) -> bool {
    (300..400).contains(&status_code)
}

/// Failure classes recorded in the error log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// Non-2xx status
    Http,
    /// Connection refused/reset, DNS failure, body read failure
    Transport,
    /// No response within the configured bound
    Timeout,
    /// TLS handshake or certificate failure
    Tls,
    /// Redirect chain too long
    Redirect,
    /// 2xx response that is not an HTML document
    NotHtml,
}

impl FailureKind {
    /// Stable label used in the error log
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::Tls => "tls",
            Self::Redirect => "redirect",
            Self::NotHtml => "not-html",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a fetch did not produce a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Server answered with a non-2xx status
    Http { status_code: u16 },

    /// Request exceeded the timeout
    Timeout,

    /// Connection-level failure
    Transport { detail: String },

    /// TLS/certificate failure
    Tls { detail: String },

    /// Redirect chain too long, or a hop left the crawl scope
    Redirect { detail: String },

    /// Page is not HTML (Content-Type mismatch)
    NotHtml { content_type: String },
}

impl FetchFailure {
    /// Returns the failure class
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Http { .. } => FailureKind::Http,
            Self::Timeout => FailureKind::Timeout,
            Self::Transport { .. } => FailureKind::Transport,
            Self::Tls { .. } => FailureKind::Tls,
            Self::Redirect { .. } => FailureKind::Redirect,
            Self::NotHtml { .. } => FailureKind::NotHtml,
        }
    }

    /// Status code or error category, as written to the error log
    pub fn detail(&self) -> String {
        match self {
            Self::Http { status_code } => status_code.to_string(),
            Self::Timeout => "request timed out".to_string(),
            Self::Transport { detail } | Self::Tls { detail } | Self::Redirect { detail } => {
                detail.clone()
            }
            Self::NotHtml { content_type } => content_type.clone(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind(), self.detail())
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Bound on each whole request, body included
///
/// # Example
///
/// ```no_run
/// use campus_crawler::config::UserAgentConfig;
/// use campus_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "Campus-Crawler".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.edu/about".to_string(),
///     contact_email: "admin@example.edu".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(20)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::none()) // Redirect hops are checked by the caller
        .gzip(true)
        .brotli(true)
        .build()
}

/// Global politeness throttle
///
/// Enforces a minimum gap between the completion of one request and the start
/// of the next, across all hosts.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last_completed: Option<Instant>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_completed: None,
        }
    }

    /// Sleeps until `delay` has passed since the last completed request
    pub async fn wait(&self) {
        if let Some(last) = self.last_completed {
            sleep_until(last + self.delay).await;
        }
    }

    /// Records that a request just finished
    pub fn mark_complete(&mut self) {
        self.last_completed = Some(Instant::now());
    }

    /// Configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Sequential, rate-limited HTTP fetcher
///
/// Every request made by the crawler, robots.txt included, goes through one
/// `Fetcher`, so no two requests are ever in flight at once.
pub struct Fetcher {
    client: Client,
    throttle: Throttle,
}

impl Fetcher {
    /// Creates a fetcher with its own client
    pub fn new(
        user_agent: &UserAgentConfig,
        timeout: Duration,
        delay: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            build_http_client(user_agent, timeout)?,
            delay,
        ))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, delay: Duration) -> Self {
        Self {
            client,
            throttle: Throttle::new(delay),
        }
    }

    /// Requests a page and classifies the answer from its headers
    ///
    /// The body is only downloaded for 2xx HTML responses. Redirects are
    /// returned to the caller unfollowed, so every hop can be scope- and
    /// robots-checked before it is requested.
    ///
    /// # Classification
    ///
    /// | Outcome | Result |
    /// |---------|--------|
    /// | 2xx, HTML (or no) Content-Type | `Ok(Page)` |
    /// | 3xx with `Location` | `Ok(Redirect)` |
    /// | 2xx, other Content-Type | `NotHtml` |
    /// | any other status (401, 403, 404, 5xx, 3xx without `Location`) | `Http` |
    /// | no response within timeout | `Timeout` |
    /// | certificate / handshake error | `Tls` |
    /// | connection refused/reset, DNS | `Transport` |
    pub async fn fetch(&mut self, url: &Url) -> Result<FetchOutcome, FetchFailure> {
        self.throttle.wait().await;
        let result = self.fetch_page(url).await;
        self.throttle.mark_complete();
        result
    }

    /// Minimum gap between requests
    pub fn delay(&self) -> Duration {
        self.throttle.delay()
    }

    /// Issues a paced GET and returns the response whatever its status
    ///
    /// Redirects are not followed; the `Location` header is passed back.
    pub async fn get(&mut self, url: &Url) -> Result<RawResponse, FetchFailure> {
        self.throttle.wait().await;
        let result = self.read_raw(url).await;
        self.throttle.mark_complete();
        result
    }

    async fn fetch_page(&self, url: &Url) -> Result<FetchOutcome, FetchFailure> {
        let response = self.send(url).await?;
        let status_code = response.status().as_u16();
        let content_type = header_text(response.headers(), CONTENT_TYPE.as_str());
        let location = header_location(response.headers());

        if let HeadVerdict::Redirect(location) =
            classify_head(status_code, &content_type, location)?
        {
            return Ok(FetchOutcome::Redirect { location });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| classify_error(&e))?;

        Ok(FetchOutcome::Page(FetchedPage {
            final_url,
            status_code,
            content_type,
            body,
        }))
    }

    async fn send(&self, url: &Url) -> Result<Response, FetchFailure> {
        self.client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(&e))
    }

    async fn read_raw(&self, url: &Url) -> Result<RawResponse, FetchFailure> {
        let response = self.send(url).await?;
        let status_code = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = header_text(response.headers(), CONTENT_TYPE.as_str());
        let location = header_location(response.headers());

        let body = response.text().await.map_err(|e| classify_error(&e))?;

        Ok(RawResponse {
            final_url,
            status_code,
            content_type,
            location,
            body,
        })
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .trim()
        .to_string()
}

fn header_location(headers: &HeaderMap) -> Option<String> {
    Some(header_text(headers, LOCATION.as_str())).filter(|l| !l.is_empty())
}

/// Classifies a response from its status and headers
fn classify_head(
    status_code: u16,
    content_type: &str,
    location: Option<String>,
) -> Result<HeadVerdict, FetchFailure> {
    if is_redirect_status(status_code) {
        return location
            .map(HeadVerdict::Redirect)
            .ok_or(FetchFailure::Http { status_code });
    }

    if !(200..300).contains(&status_code) {
        return Err(FetchFailure::Http { status_code });
    }

    if !is_html_content_type(content_type) {
        return Err(FetchFailure::NotHtml {
            content_type: content_type.to_string(),
        });
    }

    Ok(HeadVerdict::Page)
}

/// Returns true for HTML content types; a missing header counts as HTML
fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    mime.is_empty() || mime == "text/html" || mime == "application/xhtml+xml"
}

/// Maps a reqwest error onto a failure class
fn classify_error(error: &reqwest::Error) -> FetchFailure {
    let detail = error_chain(error);

    if error.is_timeout() {
        FetchFailure::Timeout
    } else if is_tls_message(&detail) {
        FetchFailure::Tls { detail }
    } else if error.is_connect() {
        FetchFailure::Transport {
            detail: format!("connection failed: {}", detail),
        }
    } else {
        FetchFailure::Transport { detail }
    }
}

/// Joins an error and all of its sources into one line
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !parts.contains(&text) {
            parts.push(text);
        }
        source = inner.source();
    }
    parts.join(": ")
}

fn is_tls_message(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|needle| lower.contains(needle))
}
