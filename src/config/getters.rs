//! Getter methods for `CrawlConfig`
//!
//! Fields are private to keep validation in the builder; read access goes
//! through these accessors.

use std::time::Duration;

use super::types::CrawlConfig;

impl CrawlConfig {
    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }

    #[must_use]
    pub fn retry(&self) -> u32 {
        self.retry
    }

    #[must_use]
    pub fn delay_range(&self) -> (f64, f64) {
        self.delay_range
    }

    #[must_use]
    pub fn enable_browser(&self) -> bool {
        self.enable_browser
    }

    #[must_use]
    pub fn follow_robots(&self) -> bool {
        self.follow_robots
    }

    #[must_use]
    pub fn domain_delay(&self) -> Duration {
        Duration::from_secs_f64(self.domain_delay_secs)
    }

    #[must_use]
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[must_use]
    pub fn max_domains(&self) -> usize {
        self.max_domains
    }

    #[must_use]
    pub fn max_pages_per_domain(&self) -> usize {
        self.max_pages_per_domain
    }

    #[must_use]
    pub fn checkpoint_interval(&self) -> usize {
        self.checkpoint_interval
    }

    #[must_use]
    pub fn exclude_extensions(&self) -> &[String] {
        &self.exclude_extensions
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }
}
