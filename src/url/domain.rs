use url::Url;

/// Returns the key under which per-host state (robots.txt) is cached
///
/// The key is the lowercase host plus an explicit port when the URL carries a
/// non-default one, so `https://example.edu/` and `https://example.edu:8443/`
/// get separate robots.txt lookups. Scheme is not part of the key.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use campus_crawler::url::host_key;
///
/// let url = Url::parse("https://EXAMPLE.edu/path").unwrap();
/// assert_eq!(host_key(&url), Some("example.edu".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
