//! Per-host robots.txt gatekeeper
//!
//! The gatekeeper fetches each host's robots.txt the first time a URL on that
//! host is checked, keeps the resulting ruleset for the rest of the run, and
//! answers path-level permission questions from the cache afterwards.

use crate::config::{RobotsConfig, RobotsFailurePolicy};
use crate::crawler::{is_redirect_status, Fetcher, RawResponse, MAX_REDIRECTS};
use crate::robots::ParsedRobots;
use crate::url::host_key;
use std::collections::HashMap;
use url::Url;

/// How a host's ruleset was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsSource {
    /// robots.txt was fetched and parsed
    Fetched,
    /// The host answered 4xx: no robots.txt, nothing is restricted
    Missing { status_code: u16 },
    /// robots.txt could not be retrieved; the failure policy decided
    Unavailable { reason: String },
    /// Inserted directly (tests, pre-seeded hosts)
    Preset,
}

/// Ruleset cached for one host
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The rules in force for the host
    pub content: ParsedRobots,

    /// Where the rules came from
    pub source: RobotsSource,
}

impl CachedRobots {
    /// Checks if a URL is allowed according to the cached robots.txt
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        self.content.is_allowed(url, user_agent)
    }
}

/// robots.txt compliance check with a per-host cache
///
/// A host whose robots.txt cannot be retrieved (timeout, transport error,
/// 5xx) gets the configured [`RobotsFailurePolicy`], decided once and kept for
/// the whole run. A 4xx answer means the site has no robots.txt and is always
/// treated as unrestricted.
pub struct RobotsGatekeeper {
    user_agent: String,
    failure_policy: RobotsFailurePolicy,
    extra_disallowed_prefixes: Vec<String>,
    cache: HashMap<String, CachedRobots>,
}

impl RobotsGatekeeper {
    /// Creates a gatekeeper
    ///
    /// # Arguments
    ///
    /// * `config` - robots.txt settings (failure policy, static prefixes)
    /// * `user_agent` - Product token matched against `User-agent:` groups
    pub fn new(config: &RobotsConfig, user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            failure_policy: config.on_fetch_failure,
            extra_disallowed_prefixes: config.extra_disallowed_prefixes.clone(),
            cache: HashMap::new(),
        }
    }

    /// Decides whether `url` may be fetched
    ///
    /// Fetches and caches the host's robots.txt through `fetcher` on first
    /// use. Never fails: every retrieval problem degrades to the failure
    /// policy.
    pub async fn is_allowed(&mut self, url: &Url, fetcher: &mut Fetcher) -> bool {
        if self.is_statically_disallowed(url) {
            return false;
        }

        let Some(host) = host_key(url) else {
            return false;
        };

        if !self.cache.contains_key(&host) {
            let cached = self.load(url, &host, fetcher).await;
            self.cache.insert(host.clone(), cached);
        }

        self.cache
            .get(&host)
            .map(|cached| cached.is_allowed(url.as_str(), &self.user_agent))
            .unwrap_or(false)
    }

    /// Answers from the cache only; `None` when the host has not been loaded
    pub fn cached_decision(&self, url: &Url) -> Option<bool> {
        if self.is_statically_disallowed(url) {
            return Some(false);
        }
        let host = host_key(url)?;
        self.cache
            .get(&host)
            .map(|cached| cached.is_allowed(url.as_str(), &self.user_agent))
    }

    /// Installs a ruleset for a host without fetching
    #[cfg(test)]
    fn insert(&mut self, host: &str, content: ParsedRobots) {
        self.cache.insert(
            host.to_lowercase(),
            CachedRobots {
                content,
                source: RobotsSource::Preset,
            },
        );
    }

    /// Returns the cached entry for a host key, if loaded
    #[cfg(test)]
    fn get(&self, host: &str) -> Option<&CachedRobots> {
        self.cache.get(host)
    }

    /// Number of hosts with a cached ruleset
    pub fn host_count(&self) -> usize {
        self.cache.len()
    }

    fn is_statically_disallowed(&self, url: &Url) -> bool {
        let path = url.path();
        self.extra_disallowed_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    async fn load(&self, url: &Url, host: &str, fetcher: &mut Fetcher) -> CachedRobots {
        let robots_url = match url.join("/robots.txt") {
            Ok(u) => u,
            Err(e) => return self.unavailable(host, format!("bad robots.txt URL: {}", e)),
        };

        tracing::debug!("Fetching robots.txt for host: {}", host);

        match self.fetch_following_redirects(robots_url, fetcher).await {
            Ok(response) if (200..300).contains(&response.status_code) => {
                tracing::info!("Loaded robots.txt for {}", host);
                CachedRobots {
                    content: ParsedRobots::from_content(&response.body),
                    source: RobotsSource::Fetched,
                }
            }
            Ok(response) if (400..500).contains(&response.status_code) => {
                tracing::info!(
                    "No robots.txt for {} (HTTP {}), allowing all",
                    host,
                    response.status_code
                );
                CachedRobots {
                    content: ParsedRobots::allow_all(),
                    source: RobotsSource::Missing {
                        status_code: response.status_code,
                    },
                }
            }
            Ok(response) => self.unavailable(host, format!("HTTP {}", response.status_code)),
            Err(reason) => self.unavailable(host, reason),
        }
    }

    /// GETs robots.txt, following redirects that stay on the same host name
    async fn fetch_following_redirects(
        &self,
        mut target: Url,
        fetcher: &mut Fetcher,
    ) -> Result<RawResponse, String> {
        for _ in 0..=MAX_REDIRECTS {
            let response = fetcher.get(&target).await.map_err(|f| f.to_string())?;
            if !is_redirect_status(response.status_code) {
                return Ok(response);
            }

            let next = response
                .location
                .as_deref()
                .and_then(|location| target.join(location).ok())
                .ok_or_else(|| format!("HTTP {} without usable Location", response.status_code))?;

            if next.host_str() != target.host_str() {
                return Err(format!("robots.txt redirected off host to {}", next));
            }

            tracing::debug!("robots.txt redirected from {} to {}", target, next);
            target = next;
        }

        Err(format!("more than {} redirects", MAX_REDIRECTS))
    }

    fn unavailable(&self, host: &str, reason: String) -> CachedRobots {
        let content = match self.failure_policy {
            RobotsFailurePolicy::Allow => ParsedRobots::allow_all(),
            RobotsFailurePolicy::Deny => ParsedRobots::deny_all(),
        };

        tracing::warn!(
            "robots.txt unavailable for {} ({}); applying {:?} policy for the rest of the run",
            host,
            reason,
            self.failure_policy
        );

        CachedRobots {
            content,
            source: RobotsSource::Unavailable { reason },
        }
    }
}
