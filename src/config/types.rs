use serde::Deserialize;

/// Main configuration structure for a crawl run
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub scope: ScopeConfig,
    #[serde(default)]
    pub robots: RobotsConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub seeds: Vec<String>,
}

/// Crawler pacing and limits
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages saved before the run stops
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Minimum time between the end of one request and the start of the next (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Flush the link list after this many saved pages
    #[serde(rename = "flush-every", default = "default_flush_every")]
    pub flush_every: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            request_timeout_secs: default_request_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            flush_every: default_flush_every(),
        }
    }
}

/// Which URLs are eligible for crawling at all
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeConfig {
    /// Hosts must equal this suffix or end with `.<suffix>`
    #[serde(rename = "allowed-domain-suffix")]
    pub allowed_domain_suffix: String,

    /// Substrings that mark authentication or session endpoints
    #[serde(rename = "skip-url-patterns", default = "default_skip_url_patterns")]
    pub skip_url_patterns: Vec<String>,

    /// Path extensions of non-HTML resources (with leading dot)
    #[serde(rename = "skip-extensions", default = "default_skip_extensions")]
    pub skip_extensions: Vec<String>,
}

impl ScopeConfig {
    /// Scope for `allowed_domain_suffix` with the default skip lists
    #[cfg(test)]
    pub(crate) fn new(allowed_domain_suffix: impl Into<String>) -> Self {
        Self {
            allowed_domain_suffix: allowed_domain_suffix.into(),
            skip_url_patterns: default_skip_url_patterns(),
            skip_extensions: default_skip_extensions(),
        }
    }
}

/// What to do when a host's robots.txt cannot be retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotsFailurePolicy {
    /// Treat the host as fully allowed
    #[default]
    Allow,
    /// Treat the host as fully disallowed
    Deny,
}

/// robots.txt handling
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RobotsConfig {
    #[serde(rename = "on-fetch-failure", default)]
    pub on_fetch_failure: RobotsFailurePolicy,

    /// Path prefixes that are always treated as disallowed, on every host
    #[serde(rename = "extra-disallowed-prefixes", default)]
    pub extra_disallowed_prefixes: Vec<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Full header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Newline-delimited list of visited page URLs
    #[serde(rename = "links-path")]
    pub links_path: String,

    /// Append-only fetch failure log
    #[serde(rename = "error-log-path")]
    pub error_log_path: String,
}

fn default_max_pages() -> usize {
    20_000
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_request_delay_ms() -> u64 {
    1_000
}

fn default_flush_every() -> usize {
    25
}

fn default_skip_url_patterns() -> Vec<String> {
    ["auth/shib_login", "/login", "/logout", "confirm", "/signin", "/sso/"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_skip_extensions() -> Vec<String> {
    [
        ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".doc", ".docx",
        ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".rar", ".mp4", ".mp3", ".mov", ".avi",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
