//! Dual-mode fetch engine.
//!
//! Starts in lightweight HTTP mode and escalates to browser rendering when
//! HTTP fails outright or extracts nothing. A successful escalation is
//! memoised per host so later pages on the same domain go straight to the
//! mode that worked.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::config::CrawlConfig;
use crate::detect::PaginationHint;
use crate::extract::{Item, SmartExtractor};
use crate::fetch::{BrowserFetcher, HttpFetcher};
use crate::login::Credentials;
use crate::proxy::ProxyProvider;
use crate::utils::{domain, resolve};

/// Fetch mode: a value, not a class hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// HTML first, browser as memoised fallback
    Auto,
    /// Plain HTTP fetch only
    Html,
    /// Full browser rendering only
    Browser,
}

impl CrawlMode {
    /// Parse a mode name; anything unrecognised reads as `Auto`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "html" => Self::Html,
            "browser" => Self::Browser,
            _ => Self::Auto,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Html => "html",
            Self::Browser => "browser",
        }
    }
}

#[derive(Debug, Default)]
struct EngineCounters {
    html_success: AtomicU64,
    html_failed: AtomicU64,
    browser_success: AtomicU64,
    browser_failed: AtomicU64,
    auto_switches: AtomicU64,
}

/// Snapshot of the engine's fetch statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineStats {
    pub html_success: u64,
    pub html_failed: u64,
    pub browser_success: u64,
    pub browser_failed: u64,
    pub auto_switches: u64,
    pub html_success_rate: f64,
    pub browser_success_rate: f64,
    pub total_requests: u64,
}

/// Result of `fetch_and_extract` for one URL.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub items: Vec<Item>,
    pub next_url: Option<String>,
    pub mode: CrawlMode,
    /// Whether any fetch produced a body. `false` means the URL consumed a
    /// page attempt without yielding HTML.
    pub fetched: bool,
}

/// One-shot probe of a page: items, pagination, and the learned patterns.
#[derive(Debug, Clone)]
pub struct PageProbe {
    pub url: String,
    pub mode: CrawlMode,
    pub items: Vec<Item>,
    pub next_url: Option<String>,
    pub patterns: Option<crate::detect::PatternSet>,
}

/// Engine composing the HTTP and browser fetchers with the extractor.
pub struct DualModeEngine {
    http: HttpFetcher,
    browser: Option<BrowserFetcher>,
    extractor: SmartExtractor,
    domain_modes: DashMap<String, CrawlMode>,
    counters: EngineCounters,
    max_concurrency: usize,
}

impl DualModeEngine {
    #[must_use]
    pub fn new(config: &CrawlConfig, credentials: Credentials, proxy: Arc<ProxyProvider>) -> Self {
        let http = HttpFetcher::new(config, &credentials, Arc::clone(&proxy));
        let browser = config
            .enable_browser()
            .then(|| BrowserFetcher::new(config, credentials, proxy));
        Self {
            http,
            browser,
            extractor: SmartExtractor::new(),
            domain_modes: DashMap::new(),
            counters: EngineCounters::default(),
            max_concurrency: config.max_concurrency(),
        }
    }

    #[must_use]
    pub fn extractor(&self) -> &SmartExtractor {
        &self.extractor
    }

    /// Fetch a URL with smart mode selection.
    ///
    /// Returns the HTML (if any) and the mode that actually ran.
    pub async fn fetch(&self, url: &str, mode: CrawlMode) -> (Option<String>, CrawlMode) {
        let host = domain(url);

        let mut selected = mode;
        if selected == CrawlMode::Auto {
            selected = match self.domain_modes.get(&host) {
                Some(remembered) => {
                    debug!("[mode] using remembered mode for {host}: {}", remembered.as_str());
                    *remembered
                }
                None => CrawlMode::Html,
            };
        }

        let (html, actual) = self.fetch_with_mode(url, selected).await;

        if html.is_none() && selected == CrawlMode::Html && self.browser.is_some() {
            info!("[auto-switch] HTML mode failed, trying browser for {url}");
            let (html, actual) = self.fetch_with_mode(url, CrawlMode::Browser).await;
            if html.is_some() {
                self.remember_browser_mode(&host);
            }
            return (html, actual);
        }

        (html, actual)
    }

    /// Fetch and extract in one step, escalating on empty extraction.
    pub async fn fetch_and_extract(&self, url: &str, mode: CrawlMode) -> Extraction {
        let (html, actual) = self.fetch(url, mode).await;
        let Some(html) = html else {
            return Extraction {
                items: Vec::new(),
                next_url: None,
                mode: actual,
                fetched: false,
            };
        };

        let mut items = self.extractor.extract_auto(&html, url);
        let mut next_url = self.detect_next_page(&html, url);
        let mut mode_used = actual;

        // Zero items over plain HTML usually means the page builds its DOM
        // with JavaScript; render once and re-detect before giving up.
        if items.is_empty() && actual == CrawlMode::Html && self.browser.is_some() {
            info!("[auto-switch] no items in HTML mode, trying browser for {url}");
            let (rendered, _) = self.fetch_with_mode(url, CrawlMode::Browser).await;
            if let Some(rendered) = rendered {
                let recovered = self.extractor.extract_fresh(&rendered, url);
                if !recovered.is_empty() {
                    self.remember_browser_mode(&domain(url));
                    items = recovered;
                    mode_used = CrawlMode::Browser;
                    next_url = self.detect_next_page(&rendered, url);
                }
            }
        }

        Extraction {
            items,
            next_url,
            mode: mode_used,
            fetched: true,
        }
    }

    /// Fetch many URLs concurrently under a caller-supplied bound.
    ///
    /// Per-URL failures are logged and yield `(url, None, mode)` entries;
    /// panicked tasks are dropped with a log line.
    pub async fn fetch_batch(
        self: &Arc<Self>,
        urls: &[String],
        mode: CrawlMode,
        max_concurrent: Option<usize>,
    ) -> Vec<(String, Option<String>, CrawlMode)> {
        let limit = max_concurrent.unwrap_or(self.max_concurrency).max(1);
        let semaphore = Arc::new(Semaphore::new(limit));

        let mut tasks = Vec::with_capacity(urls.len());
        for url in urls {
            let engine = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let url = url.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let (html, actual) = engine.fetch(&url, mode).await;
                (url, html, actual)
            }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(entry) => results.push(entry),
                Err(e) => warn!("[batch] fetch task failed: {e}"),
            }
        }
        results
    }

    /// Probe a single page: fetch, extract, and report learned patterns.
    pub async fn probe(&self, url: &str, mode: CrawlMode) -> PageProbe {
        let extraction = self.fetch_and_extract(url, mode).await;
        let patterns = self
            .extractor
            .patterns(&domain(url))
            .map(|cached| (*cached).clone());
        PageProbe {
            url: url.to_string(),
            mode: extraction.mode,
            items: extraction.items,
            next_url: extraction.next_url,
            patterns,
        }
    }

    /// Pin a preferred mode for a host.
    pub fn set_domain_mode(&self, host: &str, mode: CrawlMode) {
        self.domain_modes.insert(host.to_string(), mode);
    }

    /// Remembered mode for a host, if any.
    #[must_use]
    pub fn domain_mode(&self, host: &str) -> Option<CrawlMode> {
        self.domain_modes.get(host).map(|m| *m)
    }

    pub fn clear_domain_modes(&self) {
        self.domain_modes.clear();
    }

    /// Remembered modes as a plain map, for session snapshots.
    #[must_use]
    pub fn domain_modes(&self) -> HashMap<String, CrawlMode> {
        self.domain_modes
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Current fetch statistics.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        let html_success = self.counters.html_success.load(Ordering::Relaxed);
        let html_failed = self.counters.html_failed.load(Ordering::Relaxed);
        let browser_success = self.counters.browser_success.load(Ordering::Relaxed);
        let browser_failed = self.counters.browser_failed.load(Ordering::Relaxed);
        let total_html = html_success + html_failed;
        let total_browser = browser_success + browser_failed;
        EngineStats {
            html_success,
            html_failed,
            browser_success,
            browser_failed,
            auto_switches: self.counters.auto_switches.load(Ordering::Relaxed),
            html_success_rate: rate(html_success, total_html),
            browser_success_rate: rate(browser_success, total_browser),
            total_requests: total_html + total_browser,
        }
    }

    async fn fetch_with_mode(&self, url: &str, mode: CrawlMode) -> (Option<String>, CrawlMode) {
        match mode {
            CrawlMode::Html => {
                let html = self.http.fetch(url).await;
                self.count(&self.counters.html_success, &self.counters.html_failed, &html);
                (html, CrawlMode::Html)
            }
            CrawlMode::Browser => match &self.browser {
                Some(browser) => {
                    let html = browser.fetch_html(url).await;
                    self.count(
                        &self.counters.browser_success,
                        &self.counters.browser_failed,
                        &html,
                    );
                    (html, CrawlMode::Browser)
                }
                None => {
                    warn!("[mode] browser mode requested but browser is disabled");
                    (None, CrawlMode::Browser)
                }
            },
            // Auto resolves before this point.
            CrawlMode::Auto => (None, CrawlMode::Auto),
        }
    }

    fn count(&self, success: &AtomicU64, failed: &AtomicU64, html: &Option<String>) {
        if html.is_some() {
            success.fetch_add(1, Ordering::Relaxed);
        } else {
            failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn remember_browser_mode(&self, host: &str) {
        self.domain_modes
            .insert(host.to_string(), CrawlMode::Browser);
        self.counters.auto_switches.fetch_add(1, Ordering::Relaxed);
        info!("[mode] remembered browser mode for {host}");
    }

    /// Derive the next-page URL from the page's pagination hint.
    ///
    /// The hint is computed from the page being processed, not from the
    /// domain cache: a button's target and a template's position move page
    /// over page, and resuming from a checkpoint must reach the same next
    /// URL an uninterrupted run would.
    fn detect_next_page(&self, html: &str, url: &str) -> Option<String> {
        let doc = scraper::Html::parse_document(html);
        match crate::detect::pagination::detect_pagination(&doc, url)? {
            PaginationHint::Button { next_url, .. } => Some(next_url),
            PaginationHint::Links {
                url_pattern,
                current,
                ..
            } => {
                if !url_pattern.contains("{page}") {
                    return None;
                }
                let page = template_page_for(url, &url_pattern).unwrap_or(current);
                let next = url_pattern.replace("{page}", &(page + 1).to_string());
                resolve(url, &next)
            }
            // No driver for load-more in this engine.
            PaginationHint::LoadMore { .. } => None,
        }
    }
}

fn rate(success: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        success as f64 / total as f64
    }
}

/// Read the page number the current URL occupies in a `{page}` template.
///
/// `/cat?p={page}` against `https://e.com/cat?p=2` yields 2, letting the
/// engine advance a numbered chain from any page of it.
fn template_page_for(url: &str, pattern: &str) -> Option<u64> {
    let prefix = pattern.split("{page}").next()?;
    if prefix.is_empty() {
        return None;
    }
    let start = url.rfind(prefix)? + prefix.len();
    let digits: String = url[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
