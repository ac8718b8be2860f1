//! Core configuration types for crawl sessions
//!
//! This module contains the main `CrawlConfig` struct that defines the
//! fetch, politeness, and limit parameters for a crawl session.

use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    BROWSER_USER_AGENT, DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_DELAY_RANGE,
    DEFAULT_DOMAIN_DELAY_SECS, DEFAULT_EXCLUDE_EXTENSIONS, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_DOMAINS, DEFAULT_MAX_PAGES, DEFAULT_MAX_PAGES_PER_DOMAIN,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY,
};

/// Main configuration struct for crawl sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Global HTTP concurrency cap, enforced by a counting semaphore
    pub(crate) max_concurrency: usize,

    /// Per-request total timeout in seconds
    ///
    /// Browser navigations receive the same budget, applied in milliseconds
    /// to the page-load wait.
    pub(crate) request_timeout_secs: u64,

    /// Maximum HTTP attempts per URL (first try included)
    pub(crate) retry: u32,

    /// Randomized post-attempt sleep range `[min, max)` in seconds
    ///
    /// Applied after every attempt, success or failure, to avoid a
    /// machine-regular request cadence.
    pub(crate) delay_range: (f64, f64),

    /// Allow escalation to the browser fetcher when HTML mode fails
    pub(crate) enable_browser: bool,

    /// Honour robots.txt decisions
    pub(crate) follow_robots: bool,

    /// Per-host minimum interval between requests, in seconds
    pub(crate) domain_delay_secs: f64,

    /// Session page cap
    pub(crate) max_pages: usize,

    /// Maximum follow depth from a seed URL
    pub(crate) max_depth: u32,

    /// Cap on distinct hosts per session
    pub(crate) max_domains: usize,

    /// Per-host page cap in multi-domain mode
    pub(crate) max_pages_per_domain: usize,

    /// Pages crawled between checkpoints
    pub(crate) checkpoint_interval: usize,

    /// URL suffixes skipped when enqueueing follow-up links
    pub(crate) exclude_extensions: Vec<String>,

    /// User agent for HTTP requests and robots.txt evaluation
    pub(crate) user_agent: String,

    /// Run the browser headless (disable only for local debugging)
    pub(crate) headless: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry: DEFAULT_RETRY,
            delay_range: DEFAULT_DELAY_RANGE,
            enable_browser: true,
            follow_robots: true,
            domain_delay_secs: DEFAULT_DOMAIN_DELAY_SECS,
            max_pages: DEFAULT_MAX_PAGES,
            max_depth: DEFAULT_MAX_DEPTH,
            max_domains: DEFAULT_MAX_DOMAINS,
            max_pages_per_domain: DEFAULT_MAX_PAGES_PER_DOMAIN,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            exclude_extensions: DEFAULT_EXCLUDE_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            headless: true,
        }
    }
}

impl CrawlConfig {
    /// Start building a configuration
    #[must_use]
    pub fn builder() -> super::builder::CrawlConfigBuilder {
        super::builder::CrawlConfigBuilder::default()
    }
}
