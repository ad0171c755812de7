/// Crawl lifecycle definitions
///
/// A run moves `Init -> Running -> Finished(reason) -> Done`. The terminal
/// reason is fixed exactly once; outputs are flushed only on the way into
/// `Done`.
use crate::CrawlerError;
use std::fmt;
use std::time::{Duration, Instant};

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The frontier ran dry: the eligible graph reachable from the seeds is covered
    Exhausted,

    /// The saved-page cap was hit while URLs were still queued
    MaxPagesReached,

    /// An operator stopped the run (Ctrl-C) before either of the above
    Interrupted,
}

impl StopReason {
    /// Stable label used in the termination summary
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::MaxPagesReached => "max-pages-reached",
            Self::Interrupted => "interrupted",
        }
    }

    /// Returns true for the two reasons that mean the run completed normally
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Exhausted | Self::MaxPagesReached)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of the crawl state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Seeds enqueued, counters zeroed
    Init,

    /// Main loop processing the frontier
    Running,

    /// Loop exited; the reason is final
    Finished(StopReason),

    /// Outputs flushed and summary emitted
    Done,
}

impl CrawlPhase {
    /// Returns true if `self -> to` is a legal transition
    pub fn can_transition_to(&self, to: CrawlPhase) -> bool {
        matches!(
            (self, to),
            (Self::Init, Self::Running)
                | (Self::Init, Self::Finished(_))
                | (Self::Running, Self::Finished(_))
                | (Self::Finished(_), Self::Done)
        )
    }

    /// Returns the stop reason once one has been decided
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Self::Finished(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Mutable run state, owned by the main loop
#[derive(Debug)]
pub struct CrawlState {
    phase: CrawlPhase,
    stop_reason: Option<StopReason>,
    saved: usize,
    max_pages: usize,
    started_at: Instant,
}

impl CrawlState {
    /// Creates the state for a run that may save at most `max_pages` pages
    pub fn new(max_pages: usize) -> Self {
        Self {
            phase: CrawlPhase::Init,
            stop_reason: None,
            saved: 0,
            max_pages,
            started_at: Instant::now(),
        }
    }

    #[cfg(test)]
    fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Stop reason, once the run has finished
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Number of pages written to the link list
    pub fn saved(&self) -> usize {
        self.saved
    }

    /// Configured cap
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Time since the state was created
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Returns true once the saved-page cap is reached
    pub fn cap_reached(&self) -> bool {
        self.saved >= self.max_pages
    }

    /// Counts one more saved page and returns its 1-based ordinal
    pub fn record_saved(&mut self) -> usize {
        self.saved += 1;
        self.saved
    }

    /// Moves to `to`, rejecting illegal transitions
    pub fn transition(&mut self, to: CrawlPhase) -> Result<(), CrawlerError> {
        if !self.phase.can_transition_to(to) {
            return Err(CrawlerError::InvalidTransition {
                from: self.phase,
                to,
            });
        }

        if let Some(reason) = to.stop_reason() {
            self.stop_reason = Some(reason);
        }
        self.phase = to;
        Ok(())
    }

    /// Decides why the loop stops, given whether the frontier still has work
    ///
    /// Returns `None` while the loop should keep going. When the cap is hit at
    /// the same moment the frontier empties, the graph was fully covered, so
    /// the reason is `Exhausted`.
    pub fn termination(&self, frontier_empty: bool) -> Option<StopReason> {
        if frontier_empty {
            Some(StopReason::Exhausted)
        } else if self.cap_reached() {
            Some(StopReason::MaxPagesReached)
        } else {
            None
        }
    }
}
