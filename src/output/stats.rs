//! Progress reporting and run statistics
//!
//! This module formats the progress stream and the termination summary, and
//! keeps the counters printed at the end of a run.

use crate::crawler::FailureKind;
use crate::state::StopReason;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Counters collected over one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages written to the link list
    pub saved: u64,

    /// Fetch failures by class
    pub failures: BTreeMap<FailureKind, u64>,

    /// Links dropped by the domain/pattern/extension filter
    pub scope_rejections: u64,

    /// URLs dropped by robots.txt
    pub robots_denied: u64,

    /// Extracted links that did not parse as http(s) URLs
    pub unparsable_links: u64,

    /// New URLs added to the frontier
    pub enqueued: u64,
}

impl CrawlStatistics {
    /// Counts one failure of the given class
    pub fn record_failure(&mut self, kind: FailureKind) {
        *self.failures.entry(kind).or_insert(0) += 1;
    }

    /// Total failures across all classes
    pub fn total_failures(&self) -> u64 {
        self.failures.values().sum()
    }
}

/// Final outcome of a run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub stop_reason: StopReason,
    pub saved: usize,
    pub max_pages: usize,
    pub frontier_remaining: usize,
    pub elapsed: Duration,
    pub links_path: String,
    pub error_log_path: String,
    pub config_hash: Option<String>,
    pub statistics: CrawlStatistics,
}

/// Formats one progress line: `[<ordinal>] <url> - elapsed: <seconds>s, frontier=<size>`
pub fn progress_line(ordinal: usize, url: &Url, elapsed: Duration, frontier: usize) -> String {
    format!(
        "[{}] {} - elapsed: {:.1}s, frontier={}",
        ordinal,
        url,
        elapsed.as_secs_f64(),
        frontier
    )
}

/// Formats the one-line termination summary
pub fn summary_line(summary: &CrawlSummary) -> String {
    let reason = match summary.stop_reason {
        StopReason::Exhausted => "exhausted (no more eligible pages to crawl)".to_string(),
        StopReason::MaxPagesReached => format!(
            "max-pages-reached (cap {}, {} URLs left in frontier)",
            summary.max_pages, summary.frontier_remaining
        ),
        StopReason::Interrupted => format!(
            "interrupted ({} URLs left in frontier)",
            summary.frontier_remaining
        ),
    };

    format!(
        "Stop reason: {}; saved {} URLs to {}",
        reason, summary.saved, summary.links_path
    )
}

/// Writes the progress stream and summary to stdout
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    /// `quiet` suppresses progress lines; the summary is always printed
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Emits one progress line for a saved page
    pub fn progress(&self, ordinal: usize, url: &Url, elapsed: Duration, frontier: usize) {
        let line = progress_line(ordinal, url, elapsed, frontier);
        if self.quiet {
            tracing::debug!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    /// Emits the termination summary and statistics
    pub fn finish(&self, summary: &CrawlSummary) {
        println!();
        println!("{}", summary_line(summary));
        println!(
            "Errors (if any) are logged in {}",
            summary.error_log_path
        );
        if let Some(hash) = &summary.config_hash {
            println!("Config hash: {}", hash);
        }
        if !self.quiet {
            println!();
            print_statistics(&summary.statistics, summary.elapsed);
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics, elapsed: Duration) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages saved: {}", stats.saved);
    println!("  URLs enqueued: {}", stats.enqueued);
    println!("  Elapsed: {:.1}s", elapsed.as_secs_f64());
    if elapsed.as_secs_f64() > 0.0 {
        println!(
            "  Rate: {:.2} pages/sec",
            stats.saved as f64 / elapsed.as_secs_f64()
        );
    }
    println!();

    println!("Skipped:");
    println!("  Out of scope: {}", stats.scope_rejections);
    println!("  Disallowed by robots.txt: {}", stats.robots_denied);
    println!("  Unparsable links: {}", stats.unparsable_links);
    println!();

    if !stats.failures.is_empty() {
        println!("Fetch Failures ({}):", stats.total_failures());
        let mut failure_counts: Vec<_> = stats.failures.iter().collect();
        failure_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in failure_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    let attempted = stats.saved + stats.total_failures();
    let success_rate = if attempted > 0 {
        (stats.saved as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} fetches produced a page)",
        success_rate, stats.saved, attempted
    );
}
