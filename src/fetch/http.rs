//! Bounded-concurrency HTTP fetcher.
//!
//! At most `max_concurrency` requests are in flight globally, enforced by a
//! counting semaphore. Each attempt obtains a proxy from the provider, sends
//! browser-like headers plus any ready-made cookies and auth headers, and is
//! followed by a randomized delay whether it succeeded or not. The fetcher
//! never surfaces errors to callers; exhausted retries become `None`.

use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::config::CrawlConfig;
use crate::error::{CrawlError, CrawlResult};
use crate::login::Credentials;
use crate::proxy::ProxyProvider;
use crate::utils::constants::ACCEPT_HTML;

pub struct HttpFetcher {
    semaphore: Arc<Semaphore>,
    client: reqwest::Client,
    timeout: Duration,
    retry: u32,
    delay_range: (f64, f64),
    headers: HeaderMap,
    proxy: Arc<ProxyProvider>,
}

impl HttpFetcher {
    #[must_use]
    pub fn new(config: &CrawlConfig, credentials: &Credentials, proxy: Arc<ProxyProvider>) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrency())),
            client: reqwest::Client::new(),
            timeout: config.request_timeout(),
            retry: config.retry(),
            delay_range: config.delay_range(),
            headers: build_headers(config.user_agent(), credentials),
            proxy,
        }
    }

    /// Fetch a URL, retrying on timeout, transport error, and non-200 status.
    ///
    /// Returns the decoded body on status 200, `None` when retries are
    /// exhausted.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        let _permit = self.semaphore.acquire().await.ok()?;

        for attempt in 1..=self.retry {
            let proxy = self.proxy.http_proxy().await;
            match self.attempt(url, proxy).await {
                Ok(body) => {
                    debug!("[fetch] OK 200 -> {url}");
                    self.random_delay().await;
                    return Some(body);
                }
                Err(CrawlError::Timeout(_)) => {
                    warn!("[fetch] timeout (attempt {attempt}/{}) -> {url}", self.retry);
                }
                Err(CrawlError::Status(code)) => {
                    warn!(
                        "[fetch] status {code} (attempt {attempt}/{}) -> {url}",
                        self.retry
                    );
                }
                Err(e) => {
                    warn!("[fetch] {e} (attempt {attempt}/{}) -> {url}", self.retry);
                }
            }
            self.random_delay().await;
        }

        None
    }

    async fn attempt(&self, url: &str, proxy: Option<String>) -> CrawlResult<String> {
        // A proxied attempt needs its own client; reqwest binds proxies at
        // client construction.
        let client = match proxy {
            Some(endpoint) => {
                let proxy = reqwest::Proxy::all(&endpoint)
                    .map_err(|e| CrawlError::Transport(format!("bad proxy {endpoint}: {e}")))?;
                reqwest::Client::builder()
                    .proxy(proxy)
                    .build()
                    .map_err(|e| CrawlError::Transport(e.to_string()))?
            }
            None => self.client.clone(),
        };

        let resp = client
            .get(url)
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CrawlError::Timeout(self.timeout)
                } else {
                    CrawlError::Transport(e.to_string())
                }
            })?;

        if resp.status() != StatusCode::OK {
            return Err(CrawlError::Status(resp.status().as_u16()));
        }

        resp.text()
            .await
            .map_err(|e| CrawlError::Transport(e.to_string()))
    }

    /// Sleep for a duration drawn uniformly from the configured range.
    async fn random_delay(&self) {
        let (min, max) = self.delay_range;
        let secs = if max > min {
            use rand::Rng;
            let mut rng = rand::rng();
            rng.random_range(min..max)
        } else {
            min
        };
        if secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }
}

fn build_headers(user_agent: &str, credentials: &Credentials) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    if let Some(cookie) = credentials.cookie_header()
        && let Ok(value) = HeaderValue::from_str(&cookie)
    {
        headers.insert(COOKIE, value);
    }
    for (name, value) in &credentials.auth_headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!("skipping invalid auth header: {name}"),
        }
    }
    headers
}
