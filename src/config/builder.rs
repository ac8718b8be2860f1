//! Fluent builder for `CrawlConfig`
//!
//! Every field has a sensible default, so the builder has no required
//! states; `build()` validates the cross-field constraints once instead of
//! re-checking them in hot paths.

use anyhow::{Result, anyhow};

use super::types::CrawlConfig;

#[derive(Debug, Default)]
pub struct CrawlConfigBuilder {
    config: CrawlConfig,
}

impl CrawlConfigBuilder {
    /// Global HTTP concurrency cap
    #[must_use]
    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.config.max_concurrency = n;
        self
    }

    /// Per-request total timeout in seconds
    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// Maximum HTTP attempts per URL
    #[must_use]
    pub fn retry(mut self, attempts: u32) -> Self {
        self.config.retry = attempts;
        self
    }

    /// Randomized post-attempt sleep range `[min, max)` in seconds
    #[must_use]
    pub fn delay_range(mut self, min: f64, max: f64) -> Self {
        self.config.delay_range = (min, max);
        self
    }

    /// Allow escalation to the browser fetcher
    #[must_use]
    pub fn enable_browser(mut self, enabled: bool) -> Self {
        self.config.enable_browser = enabled;
        self
    }

    /// Honour robots.txt decisions
    #[must_use]
    pub fn follow_robots(mut self, follow: bool) -> Self {
        self.config.follow_robots = follow;
        self
    }

    /// Per-host minimum interval between requests, in seconds
    #[must_use]
    pub fn domain_delay_secs(mut self, secs: f64) -> Self {
        self.config.domain_delay_secs = secs;
        self
    }

    /// Session page cap
    #[must_use]
    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = n;
        self
    }

    /// Maximum follow depth from a seed URL
    #[must_use]
    pub fn max_depth(mut self, depth: u32) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Cap on distinct hosts per session
    #[must_use]
    pub fn max_domains(mut self, n: usize) -> Self {
        self.config.max_domains = n;
        self
    }

    /// Per-host page cap in multi-domain mode
    #[must_use]
    pub fn max_pages_per_domain(mut self, n: usize) -> Self {
        self.config.max_pages_per_domain = n;
        self
    }

    /// Pages crawled between checkpoints
    #[must_use]
    pub fn checkpoint_interval(mut self, pages: usize) -> Self {
        self.config.checkpoint_interval = pages;
        self
    }

    /// Replace the banned-extension list
    #[must_use]
    pub fn exclude_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.exclude_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    /// User agent for HTTP requests and robots.txt evaluation
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Run the browser headless
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Validate and produce the configuration
    ///
    /// # Errors
    ///
    /// Returns an error when a field is out of range (zero concurrency or
    /// retries, inverted delay range, negative domain delay).
    pub fn build(self) -> Result<CrawlConfig> {
        let c = &self.config;
        if c.max_concurrency == 0 {
            return Err(anyhow!("max_concurrency must be at least 1"));
        }
        if c.retry == 0 {
            return Err(anyhow!("retry must be at least 1"));
        }
        let (min, max) = c.delay_range;
        if min < 0.0 || max < min {
            return Err(anyhow!(
                "delay_range must satisfy 0 <= min <= max, got [{min}, {max})"
            ));
        }
        if c.domain_delay_secs < 0.0 {
            return Err(anyhow!("domain_delay must not be negative"));
        }
        Ok(self.config)
    }
}
