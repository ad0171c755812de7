//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The run's state machine (init, running, finished, done)
//! - `StopReason`: Why the run ended (exhausted, max pages reached, interrupted)
//! - `CrawlState`: Saved-page counter, cap and elapsed time, owned by the main loop

mod crawl_state;

// Re-export main types
pub use crawl_state::{CrawlPhase, CrawlState, StopReason};
