//! URL handling module for Campus-Crawler
//!
//! This module provides URL normalization, host extraction and the syntactic
//! scope filter that decides whether a URL is eligible for crawling.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::host_key;
pub use filter::{host_matches_suffix, ScopeRejection, UrlFilter};
pub use normalize::normalize_url;
