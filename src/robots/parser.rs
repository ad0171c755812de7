//! Robots.txt parser implementation
//!
//! This module wraps the robotstxt crate's matcher behind a ruleset type that
//! can also represent the two blanket outcomes (allow everything, deny
//! everything) used when a host has no usable robots.txt.

use robotstxt::DefaultMatcher;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rules {
    AllowAll,
    DenyAll,
    Content(String),
}

/// Parsed robots.txt data for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRobots {
    rules: Rules,
}

impl ParsedRobots {
    /// Creates a ruleset from raw robots.txt content
    ///
    /// Empty content allows everything.
    pub fn from_content(content: &str) -> Self {
        let rules = if content.trim().is_empty() {
            Rules::AllowAll
        } else {
            Rules::Content(content.to_string())
        };
        Self { rules }
    }

    /// Creates a permissive ruleset that allows everything
    pub fn allow_all() -> Self {
        Self {
            rules: Rules::AllowAll,
        }
    }

    /// Creates a ruleset that disallows everything
    pub fn deny_all() -> Self {
        Self {
            rules: Rules::DenyAll,
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The crawler's product token (e.g. "Campus-Crawler");
    ///   rules for `User-agent: *` apply when no group names it
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.rules {
            Rules::AllowAll => true,
            Rules::DenyAll => false,
            Rules::Content(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, user_agent, url)
            }
        }
    }
}
