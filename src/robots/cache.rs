//! Per-origin robots.txt cache
//!
//! Each origin (scheme + host + port) is fetched at most once per process; a failed
//! fetch is remembered as a permissive policy and never retried.

use crate::crawler::read_capped_body;
use crate::robots::ParsedRobots;
use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Robots policies keyed by origin, living for the process lifetime only
#[derive(Debug)]
pub struct RobotsCache {
    policies: HashMap<String, ParsedRobots>,
    max_body_bytes: usize,
}

impl RobotsCache {
    /// Creates an empty cache; robots.txt bodies above `max_body_bytes` are ignored
    pub fn new(max_body_bytes: usize) -> Self {
        Self {
            policies: HashMap::new(),
            max_body_bytes,
        }
    }

    /// Origin key for a URL, e.g. `https://www.epfl.ch` or `http://127.0.0.1:8080`
    pub fn origin_of(url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        parsed.host_str()?;
        Some(parsed.origin().ascii_serialization())
    }

    /// True when the origin's policy has already been fetched (or defaulted)
    pub fn contains_origin(&self, origin: &str) -> bool {
        self.policies.contains_key(origin)
    }

    /// Looks up a cached decision; `None` means the origin has not been fetched yet
    pub fn cached_decision(&self, user_agent: &str, url: &str) -> Option<bool> {
        let origin = Self::origin_of(url)?;
        self.policies
            .get(&origin)
            .map(|policy| policy.is_allowed(url, user_agent))
    }

    /// Records the policy of an origin
    pub fn insert(&mut self, origin: String, policy: ParsedRobots) {
        self.policies.insert(origin, policy);
    }

    /// Number of origins with a recorded policy
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Decides whether `url` may be fetched, fetching the origin's robots.txt on first use
    ///
    /// The caller is responsible for pacing before this call when the origin is new.
    pub async fn allowed(&mut self, client: &Client, user_agent: &str, url: &str) -> bool {
        let Some(origin) = Self::origin_of(url) else {
            return true;
        };

        if !self.contains_origin(&origin) {
            let policy = fetch_robots(client, &origin, self.max_body_bytes).await;
            self.insert(origin.clone(), policy);
        }

        self.policies
            .get(&origin)
            .map_or(true, |policy| policy.is_allowed(url, user_agent))
    }
}

/// Fetches and parses `{origin}/robots.txt`
///
/// Any failure (network error, non-success status, unreadable body, or a body
/// larger than `max_bytes`) degrades to [`ParsedRobots::allow_all`].
pub async fn fetch_robots(client: &Client, origin: &str, max_bytes: usize) -> ParsedRobots {
    let robots_url = format!("{}/robots.txt", origin);
    tracing::debug!("Fetching robots.txt: {}", robots_url);

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("robots.txt fetch failed for {}, allowing all: {}", origin, e);
            return ParsedRobots::allow_all();
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(
            "robots.txt for {} returned HTTP {}, allowing all",
            origin,
            status.as_u16()
        );
        return ParsedRobots::allow_all();
    }

    match read_capped_body(response, max_bytes).await {
        Ok(Some(body)) => ParsedRobots::from_content(&body),
        Ok(None) => {
            tracing::warn!(
                "robots.txt for {} exceeds {} bytes, allowing all",
                origin,
                max_bytes
            );
            ParsedRobots::allow_all()
        }
        Err(e) => {
            tracing::warn!("robots.txt body unreadable for {}, allowing all: {}", origin, e);
            ParsedRobots::allow_all()
        }
    }
}
