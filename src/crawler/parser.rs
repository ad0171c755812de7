//! HTML parser for extracting links and metadata
//!
//! This module parses fetched HTML into:
//! - Every hyperlink reference, resolved to an absolute URL
//! - The page title (used for progress logging)
//!
//! It carries no crawl policy. Scheme, scope, robots and dedup decisions all
//! belong to the caller.

use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All hyperlinks found on the page, absolute but not normalized
    pub links: Vec<String>,
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// - `<a href>` and `<area href>` are collected in document order
/// - A `<base href>` in the document overrides `base_url` for resolution
/// - Fragments, query strings and non-http schemes are kept as-is
/// - hrefs that cannot be resolved at all are skipped
///
/// html5ever recovers from any markup, so malformed or empty input simply
/// yields fewer (or zero) links.
///
/// # Example
///
/// ```
/// use campus_crawler::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page#top">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.edu/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.edu/page#top".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    if html.trim().is_empty() {
        return ParsedPage::default();
    }

    let document = Html::parse_document(html);
    let base = document_base(&document, base_url);

    ParsedPage {
        title: extract_title(&document),
        links: collect_links(&document, &base),
    }
}

/// Returns every hyperlink in `html`, resolved against `base_url`
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    parse_html(html, base_url).links
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Honors `<base href>` when present and resolvable
fn document_base(document: &Html, base_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| base_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| base_url.clone())
}

fn collect_links(document: &Html, base: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href], area[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| base.join(href).ok())
        .map(|url| url.to_string())
        .collect()
}
