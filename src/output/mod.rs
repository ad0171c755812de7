//! Output module for the crawl artifacts and reports
//!
//! This module handles:
//! - The visited-URL link list (batched, periodically flushed)
//! - The append-only fetch failure log
//! - Progress lines, the termination summary and run statistics

mod error_log;
mod links;
pub mod stats;

pub use error_log::{ErrorLogger, ErrorRecord};
pub use links::LinkWriter;
pub use stats::{print_statistics, CrawlStatistics, CrawlSummary, Reporter};
