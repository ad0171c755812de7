//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that ties the components together:
//! - Seeding the frontier
//! - Filtering and robots checks on dequeue and on discovery
//! - Fetching, link extraction and normalization
//! - Writing the link list and error log
//! - Deciding and reporting why the run stopped

use crate::config::Config;
use crate::crawler::{
    parse_html, FetchFailure, FetchOutcome, FetchedPage, Fetcher, Frontier, MAX_REDIRECTS,
};
use crate::output::{CrawlStatistics, CrawlSummary, ErrorLogger, ErrorRecord, LinkWriter, Reporter};
use crate::robots::RobotsGatekeeper;
use crate::state::{CrawlPhase, CrawlState, StopReason};
use crate::url::{normalize_url, UrlFilter};
use crate::CrawlerError;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Main crawler coordinator structure
///
/// Owns every piece of mutable run state. The loop is single-threaded: the
/// frontier, robots cache and outputs are only ever touched from
/// [`Coordinator::run_until`].
pub struct Coordinator {
    config: Config,
    config_hash: Option<String>,
    filter: UrlFilter,
    robots: RobotsGatekeeper,
    fetcher: Fetcher,
    frontier: Frontier,
    state: CrawlState,
    links: LinkWriter,
    errors: ErrorLogger,
    reporter: Reporter,
    stats: CrawlStatistics,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `config_hash` - Hash of the configuration file, echoed in the summary
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Seeds enqueued and outputs open
    /// * `Err(CrawlerError)` - A seed is unusable or an output cannot be opened
    pub fn new(config: Config, config_hash: Option<String>) -> Result<Self, CrawlerError> {
        let filter = UrlFilter::new(&config.scope);

        let mut frontier = Frontier::new();
        for seed in &config.seeds {
            let url = normalize_url(seed, None).map_err(|e| CrawlerError::InvalidSeed {
                url: seed.clone(),
                reason: e.to_string(),
            })?;

            if let Err(rejection) = filter.check(&url) {
                return Err(CrawlerError::InvalidSeed {
                    url: seed.clone(),
                    reason: rejection.to_string(),
                });
            }

            frontier.enqueue(url);
        }

        if frontier.is_empty() {
            return Err(CrawlerError::InvalidSeed {
                url: String::new(),
                reason: "no seed URLs configured".to_string(),
            });
        }

        let fetcher = Fetcher::new(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
            Duration::from_millis(config.crawler.request_delay_ms),
        )?;

        let robots = RobotsGatekeeper::new(&config.robots, &config.user_agent.crawler_name);

        let links_path = Path::new(&config.output.links_path);
        let links = LinkWriter::create(links_path, config.crawler.flush_every)
            .map_err(|source| output_error(links_path, source))?;

        let error_log_path = Path::new(&config.output.error_log_path);
        let errors =
            ErrorLogger::open(error_log_path).map_err(|source| output_error(error_log_path, source))?;

        let state = CrawlState::new(config.crawler.max_pages);

        Ok(Self {
            config,
            config_hash,
            filter,
            robots,
            fetcher,
            frontier,
            state,
            links,
            errors,
            reporter: Reporter::new(false),
            stats: CrawlStatistics::default(),
        })
    }

    /// Replaces the default stdout reporter
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    #[cfg(test)]
    fn frontier_size(&self) -> usize {
        self.frontier.size()
    }

    /// Runs until the frontier is exhausted or the page cap is reached
    pub async fn run(self) -> Result<CrawlSummary, CrawlerError> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Runs the main crawl loop, stopping early when `shutdown` completes
    ///
    /// An in-flight request is abandoned on shutdown. Outputs are flushed and
    /// the summary is emitted for every terminal reason.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<CrawlSummary, CrawlerError>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            "Starting crawl: {} seed(s), cap {} pages, {}ms between requests",
            self.frontier.size(),
            self.state.max_pages(),
            self.fetcher.delay().as_millis()
        );
        self.state.transition(CrawlPhase::Running)?;

        tokio::pin!(shutdown);

        let reason = tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::warn!("Interrupted, flushing outputs");
                StopReason::Interrupted
            }
            result = self.crawl_loop() => result?,
        };

        self.finish(reason)
    }

    async fn crawl_loop(&mut self) -> Result<StopReason, CrawlerError> {
        loop {
            if let Some(reason) = self.state.termination(self.frontier.is_empty()) {
                return Ok(reason);
            }

            let Some(url) = self.frontier.dequeue() else {
                return Ok(StopReason::Exhausted);
            };

            self.visit(url).await?;
        }
    }

    /// Processes a single dequeued URL
    ///
    /// Only output failures are returned as errors; everything that goes
    /// wrong with the URL itself is logged and counted.
    async fn visit(&mut self, url: Url) -> Result<(), CrawlerError> {
        if let Err(rejection) = self.filter.check(&url) {
            tracing::debug!("Skipping {} ({})", url, rejection);
            self.stats.scope_rejections += 1;
            return Ok(());
        }

        if !self.robots.is_allowed(&url, &mut self.fetcher).await {
            tracing::debug!("URL {} disallowed by robots.txt", url);
            self.stats.robots_denied += 1;
            return Ok(());
        }

        match self.fetch_in_scope(&url).await {
            Ok(Some(page)) => self.handle_page(url, page),
            Ok(None) => Ok(()),
            Err(failure) => self.handle_failure(&url, failure),
        }
    }

    /// Fetches `url`, following redirects only while they stay crawlable
    ///
    /// Every hop is normalized, filtered, robots-checked and paced like a
    /// dequeued URL. A hop that leaves the scope or is disallowed fails the
    /// source URL with a `redirect` failure. A hop to a URL that is already
    /// queued or visited ends the visit silently: that page is covered on
    /// its own.
    async fn fetch_in_scope(&mut self, url: &Url) -> Result<Option<FetchedPage>, FetchFailure> {
        let mut current = url.clone();
        let mut hops = 0;

        loop {
            let location = match self.fetcher.fetch(&current).await? {
                FetchOutcome::Page(page) => return Ok(Some(page)),
                FetchOutcome::Redirect { location } => location,
            };

            if hops == MAX_REDIRECTS {
                return Err(FetchFailure::Redirect {
                    detail: format!("more than {} redirects", MAX_REDIRECTS),
                });
            }
            hops += 1;

            let next = normalize_url(&location, Some(&current)).map_err(|e| {
                FetchFailure::Redirect {
                    detail: format!("unusable redirect target {}: {}", location, e),
                }
            })?;

            if let Err(rejection) = self.filter.check(&next) {
                return Err(FetchFailure::Redirect {
                    detail: format!("redirected out of scope to {} ({})", next, rejection),
                });
            }

            if !self.robots.is_allowed(&next, &mut self.fetcher).await {
                self.stats.robots_denied += 1;
                return Err(FetchFailure::Redirect {
                    detail: format!("redirected to {} (disallowed by robots.txt)", next),
                });
            }

            if !self.frontier.mark_visited(&next) {
                tracing::debug!("{} redirects to already known {}", url, next);
                return Ok(None);
            }

            tracing::debug!("{} redirected to {}", current, next);
            current = next;
        }
    }

    fn handle_page(&mut self, url: Url, page: FetchedPage) -> Result<(), CrawlerError> {
        let ordinal = self.state.record_saved();
        self.stats.saved += 1;
        self.links
            .append(&url)
            .map_err(|source| output_error(self.links.path(), source))?;

        let parsed = parse_html(&page.body, &page.final_url);
        tracing::debug!(
            "Fetched {} ({}, {:?}): {} links",
            url,
            page.status_code,
            parsed.title.as_deref().unwrap_or(""),
            parsed.links.len()
        );

        self.handle_discovered_links(&parsed.links, &page.final_url);

        self.reporter.progress(
            ordinal,
            &url,
            self.state.elapsed(),
            self.frontier.size(),
        );
        Ok(())
    }

    /// Normalizes, filters and enqueues links found on a page
    ///
    /// The robots check here only consults rules already cached; hosts not
    /// yet loaded are checked again when the URL is dequeued.
    fn handle_discovered_links(&mut self, links: &[String], base_url: &Url) {
        for link in links {
            let candidate = match normalize_url(link, Some(base_url)) {
                Ok(url) => url,
                Err(e) => {
                    tracing::trace!("Ignoring link {}: {}", link, e);
                    self.stats.unparsable_links += 1;
                    continue;
                }
            };

            if self.frontier.contains(&candidate) {
                continue;
            }

            if let Err(rejection) = self.filter.check(&candidate) {
                tracing::trace!("Rejected {} ({})", candidate, rejection);
                self.stats.scope_rejections += 1;
                continue;
            }

            if self.robots.cached_decision(&candidate) == Some(false) {
                tracing::debug!("URL {} disallowed by robots.txt", candidate);
                self.stats.robots_denied += 1;
                continue;
            }

            if self.frontier.enqueue(candidate) {
                self.stats.enqueued += 1;
            }
        }
    }

    fn handle_failure(&mut self, url: &Url, failure: FetchFailure) -> Result<(), CrawlerError> {
        tracing::warn!("Failed to fetch {}: {}", url, failure);
        self.stats.record_failure(failure.kind());

        let record = ErrorRecord::new(url, &failure);
        self.errors
            .record(&record)
            .map_err(|source| output_error(self.errors.path(), source))
    }

    /// Fixes the stop reason, closes outputs and emits the summary
    fn finish(mut self, reason: StopReason) -> Result<CrawlSummary, CrawlerError> {
        self.state.transition(CrawlPhase::Finished(reason))?;
        let reason = self.state.stop_reason().unwrap_or(reason);
        tracing::info!(
            "Crawl finished ({}): {} pages saved, {} URLs fetched of {} discovered, {} left in frontier",
            reason,
            self.state.saved(),
            self.frontier.visited_count(),
            self.frontier.seen_count(),
            self.frontier.size()
        );

        let links_path = self.links.path().to_path_buf();
        let written = self
            .links
            .finish()
            .map_err(|source| output_error(&links_path, source))?;

        let error_log_path = self.errors.path().to_path_buf();
        let failures = self
            .errors
            .close()
            .map_err(|source| output_error(&error_log_path, source))?;

        tracing::info!(
            "Wrote {} URLs to {} and {} failures to {} ({} robots.txt host(s) cached)",
            written,
            links_path.display(),
            failures,
            error_log_path.display(),
            self.robots.host_count()
        );

        self.state.transition(CrawlPhase::Done)?;

        let summary = CrawlSummary {
            stop_reason: reason,
            saved: self.state.saved(),
            max_pages: self.state.max_pages(),
            frontier_remaining: self.frontier.size(),
            elapsed: self.state.elapsed(),
            links_path: self.config.output.links_path.clone(),
            error_log_path: self.config.output.error_log_path.clone(),
            config_hash: self.config_hash.take(),
            statistics: std::mem::take(&mut self.stats),
        };

        self.reporter.finish(&summary);
        Ok(summary)
    }
}

fn output_error(path: &Path, source: std::io::Error) -> CrawlerError {
    CrawlerError::Output {
        path: path.display().to_string(),
        source,
    }
}
