//! Shared configuration constants for pagesift
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Browser-like user agent sent by the HTTP fetcher
///
/// Many listing sites serve a degraded or empty page to clients that do not
/// identify as a mainstream browser. Updated alongside Chrome stable.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Accept header preferring HTML responses
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

/// Default global HTTP concurrency cap
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Default per-request total timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Default maximum HTTP attempts per URL
pub const DEFAULT_RETRY: u32 = 3;

/// Default randomized post-attempt delay range in seconds
pub const DEFAULT_DELAY_RANGE: (f64, f64) = (0.5, 1.5);

/// Default per-host minimum interval between requests, in seconds
///
/// Conservative politeness default. Most servers can absorb one request per
/// second per client without issue.
pub const DEFAULT_DOMAIN_DELAY_SECS: f64 = 1.0;

/// Default session page cap
pub const DEFAULT_MAX_PAGES: usize = 100_000;

/// Default maximum follow depth from a seed URL
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// Default cap on distinct hosts per session
pub const DEFAULT_MAX_DOMAINS: usize = 100;

/// Default per-host page cap in multi-domain mode
pub const DEFAULT_MAX_PAGES_PER_DOMAIN: usize = 1000;

/// Default number of crawled pages between checkpoints
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 100;

/// Fixed timeout for robots.txt fetches, in seconds
///
/// robots.txt is fetched once per origin and never retried; a short fixed
/// timeout keeps a slow origin from stalling the whole session.
pub const ROBOTS_TIMEOUT_SECS: u64 = 5;

/// URL suffixes skipped by default when following links
pub const DEFAULT_EXCLUDE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".ico", ".css", ".js",
    ".pdf", ".zip", ".rar", ".gz", ".mp3", ".mp4", ".avi", ".exe", ".dmg",
];
