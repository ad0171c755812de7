use crate::UrlError;
use url::Url;

/// Normalizes a discovered URL into its canonical dedup key
///
/// # Normalization Steps
///
/// 1. Resolve `raw` against `base` when given (relative links), otherwise parse it as absolute
/// 2. Reject anything that is not http/https (mailto:, javascript:, tel:, data:, ...)
/// 3. Reject URLs without a host
/// 4. Lowercase scheme and host, drop default ports, resolve dot segments
/// 5. Strip the trailing dot of a fully qualified host (`example.edu.`)
/// 6. Remove the fragment (everything after #)
///
/// Path and query keep their case. The result is idempotent: normalizing a
/// canonical URL again yields the same URL.
///
/// # Arguments
///
/// * `raw` - The URL as found in a page or configuration
/// * `base` - The page the URL was found on, if any
///
/// # Returns
///
/// * `Ok(Url)` - Canonical URL
/// * `Err(UrlError)` - Failed to parse, unsupported scheme, or no host
///
/// # Examples
///
/// ```
/// use campus_crawler::url::normalize_url;
/// use url::Url;
///
/// let base = Url::parse("https://Example.EDU/dept/").unwrap();
/// let url = normalize_url("../About#staff", Some(&base)).unwrap();
/// assert_eq!(url.as_str(), "https://example.edu/About");
/// ```
pub fn normalize_url(raw: &str, base: Option<&Url>) -> Result<Url, UrlError> {
    let raw = raw.trim();

    let mut url = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw),
    }
    .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = match url.host_str() {
        Some(host) => host.trim_end_matches('.').to_string(),
        None => return Err(UrlError::MissingDomain),
    };
    if host.is_empty() {
        return Err(UrlError::MissingDomain);
    }
    if url.host_str() != Some(host.as_str()) {
        url.set_host(Some(&host))
            .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;
    }

    url.set_fragment(None);

    Ok(url)
}
