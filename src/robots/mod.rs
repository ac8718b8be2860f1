//! robots.txt gate with a per-origin cache.
//!
//! Each origin's robots.txt is fetched at most once per session. A fetch
//! failure or non-200 status caches a permissive default, so an origin
//! without robots.txt never blocks the crawl. The gate itself is never
//! retried.

use dashmap::DashMap;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use texting_robots::Robot;

use crate::utils::constants::ROBOTS_TIMEOUT_SECS;
use crate::utils::origin;

enum RobotsEntry {
    /// No usable robots.txt: allow everything.
    AllowAll,
    Rules(Arc<Robot>),
}

/// Session-owned robots.txt evaluator.
pub struct RobotsGate {
    follow: bool,
    user_agent: String,
    cache: DashMap<String, RobotsEntry>,
    client: reqwest::Client,
}

impl RobotsGate {
    /// Create a gate evaluating rules for `user_agent`.
    ///
    /// With `follow` disabled every URL is allowed and nothing is fetched.
    #[must_use]
    pub fn new(follow: bool, user_agent: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(ROBOTS_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            follow,
            user_agent: user_agent.into(),
            cache: DashMap::new(),
            client,
        }
    }

    /// Whether the configured user agent may fetch `url`.
    pub async fn allowed(&self, url: &str) -> bool {
        if !self.follow {
            return true;
        }
        let Some(origin) = origin(url) else {
            // Unparseable URLs fail later at fetch time, not here.
            return true;
        };

        if !self.cache.contains_key(&origin) {
            let entry = self.load(&origin).await;
            self.cache.entry(origin.clone()).or_insert(entry);
        }

        match self.cache.get(&origin).as_deref() {
            Some(RobotsEntry::Rules(robot)) => robot.allowed(url),
            _ => true,
        }
    }

    /// Number of origins with cached decisions.
    #[must_use]
    pub fn cached_origins(&self) -> usize {
        self.cache.len()
    }

    async fn load(&self, origin: &str) -> RobotsEntry {
        let robots_url = format!("{origin}/robots.txt");
        match self.client.get(&robots_url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => match Robot::new(&self.user_agent, body.as_bytes()) {
                    Ok(robot) => {
                        debug!("robots.txt loaded for {origin}");
                        RobotsEntry::Rules(Arc::new(robot))
                    }
                    Err(e) => {
                        warn!("robots.txt unparseable for {origin}: {e}, allowing all");
                        RobotsEntry::AllowAll
                    }
                },
                Err(e) => {
                    debug!("robots.txt body read failed for {origin}: {e}, allowing all");
                    RobotsEntry::AllowAll
                }
            },
            Ok(resp) => {
                debug!(
                    "robots.txt status {} for {origin}, allowing all",
                    resp.status()
                );
                RobotsEntry::AllowAll
            }
            Err(e) => {
                debug!("robots.txt fetch failed for {origin}: {e}, allowing all");
                RobotsEntry::AllowAll
            }
        }
    }
}
