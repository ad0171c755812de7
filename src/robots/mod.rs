//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Each host's rules are fetched once per run and never refreshed.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsGatekeeper, RobotsSource};
pub use parser::ParsedRobots;
