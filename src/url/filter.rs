use crate::config::ScopeConfig;
use std::fmt;
use url::Url;

/// Why a URL was dropped before any network access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeRejection {
    /// Not http or https
    Scheme(String),
    /// Host outside the allowed domain suffix
    Domain(String),
    /// Matches an authentication/session pattern
    Pattern(String),
    /// Points at a non-HTML resource type
    Extension(String),
}

impl fmt::Display for ScopeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheme(s) => write!(f, "unsupported scheme '{}'", s),
            Self::Domain(h) => write!(f, "host '{}' outside allowed domain", h),
            Self::Pattern(p) => write!(f, "matches skip pattern '{}'", p),
            Self::Extension(e) => write!(f, "skipped extension '{}'", e),
        }
    }
}

/// Checks whether `host` equals `suffix` or is a subdomain of it
///
/// Matching happens on label boundaries, so "notexample.edu" is not inside
/// "example.edu".
pub fn host_matches_suffix(host: &str, suffix: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let suffix = suffix.to_ascii_lowercase();

    host == suffix
        || (host.len() > suffix.len()
            && host.ends_with(&suffix)
            && host.as_bytes()[host.len() - suffix.len() - 1] == b'.')
}

/// Purely syntactic domain/pattern/extension filter
///
/// Runs before any robots.txt lookup or fetch so that ineligible URLs never
/// cost a request.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    allowed_domain_suffix: String,
    skip_patterns: Vec<String>,
    skip_extensions: Vec<String>,
}

impl UrlFilter {
    /// Builds a filter from the scope configuration
    pub fn new(scope: &ScopeConfig) -> Self {
        Self {
            allowed_domain_suffix: scope.allowed_domain_suffix.to_ascii_lowercase(),
            skip_patterns: scope
                .skip_url_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            skip_extensions: scope
                .skip_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Returns true when the URL may be crawled
    pub fn is_eligible(&self, url: &Url) -> bool {
        self.check(url).is_ok()
    }

    /// Returns the first rule the URL breaks, if any
    ///
    /// Rules are checked cheapest-first: scheme, host, URL patterns, extension.
    pub fn check(&self, url: &Url) -> Result<(), ScopeRejection> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ScopeRejection::Scheme(url.scheme().to_string()));
        }

        let host = url.host_str().unwrap_or_default();
        if !host_matches_suffix(host, &self.allowed_domain_suffix) {
            return Err(ScopeRejection::Domain(host.to_string()));
        }

        let lowered = url.as_str().to_lowercase();
        if let Some(pattern) = self.skip_patterns.iter().find(|p| lowered.contains(p.as_str())) {
            return Err(ScopeRejection::Pattern(pattern.clone()));
        }

        let path = url.path().to_lowercase();
        if let Some(ext) = self.skip_extensions.iter().find(|e| path.ends_with(e.as_str())) {
            return Err(ScopeRejection::Extension(ext.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> UrlFilter {
        UrlFilter::new(&ScopeConfig::new("example.edu"))
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_host_matches_suffix() {
        assert!(host_matches_suffix("example.edu", "example.edu"));
        assert!(host_matches_suffix("www.example.edu", "example.edu"));
        assert!(host_matches_suffix("calendar.Example.EDU", "example.edu"));
        assert!(!host_matches_suffix("notexample.edu", "example.edu"));
        assert!(!host_matches_suffix("example.edu.evil.com", "example.edu"));
        assert!(!host_matches_suffix("edu", "example.edu"));
    }

    #[test]
    fn test_accepts_in_domain_page() {
        assert!(filter().is_eligible(&url("https://www.example.edu/admissions/")));
        assert!(filter().is_eligible(&url("http://library.example.edu/hours?day=mon")));
    }

    #[test]
    fn test_rejects_off_domain() {
        assert_eq!(
            filter().check(&url("https://example.com/page")),
            Err(ScopeRejection::Domain("example.com".to_string()))
        );
    }

    #[test]
    fn test_rejects_auth_patterns() {
        let f = filter();
        assert!(matches!(
            f.check(&url("https://example.edu/auth/shib_login?target=x")),
            Err(ScopeRejection::Pattern(_))
        ));
        assert!(matches!(
            f.check(&url("https://calendar.example.edu/event/123/confirm")),
            Err(ScopeRejection::Pattern(_))
        ));
        assert!(matches!(
            f.check(&url("https://example.edu/portal/Logout")),
            Err(ScopeRejection::Pattern(_))
        ));
    }

    #[test]
    fn test_rejects_extensions_case_insensitively() {
        let f = filter();
        assert_eq!(
            f.check(&url("https://example.edu/catalog.PDF")),
            Err(ScopeRejection::Extension(".pdf".to_string()))
        );
        assert!(!f.is_eligible(&url("https://example.edu/img/logo.png")));
        assert!(!f.is_eligible(&url("https://example.edu/forms/app.docx")));
        assert!(f.is_eligible(&url("https://example.edu/pdf-guide/")));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            filter().check(&url("ftp://example.edu/file")),
            Err(ScopeRejection::Scheme(_))
        ));
    }
}
