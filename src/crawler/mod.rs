//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Paced HTTP fetching and failure classification
//! - HTML parsing and link extraction
//! - The breadth-first frontier
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, is_redirect_status, FailureKind, FetchFailure, FetchOutcome, FetchedPage,
    Fetcher, RawResponse, Throttle, MAX_REDIRECTS,
};
pub use frontier::Frontier;
pub use parser::{extract_links, parse_html, ParsedPage};

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::CrawlerError;

/// Runs a complete crawl operation to its natural end
///
/// This is the main entry point for starting a crawl without an external stop
/// signal; use [`Coordinator::run_until`] to race the crawl against one. It
/// will:
/// 1. Normalize the seeds and open the outputs
/// 2. Build the HTTP client
/// 3. Fetch pages breadth-first, following in-scope links
/// 4. Stop on frontier exhaustion or the page cap
/// 5. Flush outputs and emit the summary
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl reached a terminal state
/// * `Err(CrawlerError)` - A seed was unusable or an output could not be written
///
/// # Example
///
/// ```no_run
/// use campus_crawler::config::load_config;
/// use campus_crawler::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = crawl(config).await?;
/// println!("{}", summary.stop_reason);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<CrawlSummary, CrawlerError> {
    Coordinator::new(config, None)?.run().await
}
