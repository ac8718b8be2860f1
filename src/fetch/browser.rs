//! Headless-browser fetcher returning post-JS HTML.
//!
//! Each invocation launches a fresh browser with no cross-call state:
//! cookies are installed scoped to the target URL, navigation and load waits
//! run under the configured timeout, and the rendered DOM is serialized back
//! as HTML. Any failure returns `None`.

use anyhow::{Result, anyhow};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use futures::StreamExt;
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CrawlConfig;
use crate::login::Credentials;
use crate::proxy::ProxyProvider;

/// Wrap a page operation with an explicit timeout.
///
/// Prevents indefinite hangs on navigation against servers that stream or
/// long-poll forever.
async fn with_page_timeout<F, T, E>(operation: F, budget: Duration, name: &str) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(budget, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(anyhow!("{name} failed: {e}")),
        Err(_) => Err(anyhow!("{name} timeout after {budget:?}")),
    }
}

pub struct BrowserFetcher {
    timeout: Duration,
    headless: bool,
    credentials: Credentials,
    proxy: Arc<ProxyProvider>,
}

impl BrowserFetcher {
    #[must_use]
    pub fn new(config: &CrawlConfig, credentials: Credentials, proxy: Arc<ProxyProvider>) -> Self {
        Self {
            timeout: config.request_timeout(),
            headless: config.headless(),
            credentials,
            proxy,
        }
    }

    /// Render a page and return its post-JS HTML, or `None` on any failure.
    pub async fn fetch_html(&self, url: &str) -> Option<String> {
        match self.render(url).await {
            Ok(html) => {
                debug!("[browser] rendered -> {url}");
                Some(html)
            }
            Err(e) => {
                warn!("[browser] {url} -> {e:#}");
                None
            }
        }
    }

    async fn render(&self, url: &str) -> Result<String> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-blink-features=AutomationControlled");
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(proxy) = self.proxy.browser_proxy().await {
            builder = builder.arg(format!("--proxy-server={}", proxy.server));
        }
        let config = builder
            .build()
            .map_err(|e| anyhow!("browser config: {e}"))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| anyhow!("browser launch: {e}"))?;

        // Drive the CDP connection until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = self.render_page(&browser, url).await;

        let _ = browser.close().await;
        let _ = browser.wait().await;
        handler_task.abort();

        result
    }

    async fn render_page(&self, browser: &Browser, url: &str) -> Result<String> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| anyhow!("new page: {e}"))?;

        if !self.credentials.cookies.is_empty() {
            let cookies = self
                .credentials
                .cookies
                .iter()
                .map(|(name, value)| {
                    CookieParam::builder()
                        .name(name.clone())
                        .value(value.clone())
                        .url(url.to_string())
                        .build()
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| anyhow!("cookie param: {e}"))?;
            page.set_cookies(cookies)
                .await
                .map_err(|e| anyhow!("set cookies: {e}"))?;
        }

        with_page_timeout(page.goto(url), self.timeout, "navigation").await?;
        with_page_timeout(page.wait_for_navigation(), self.timeout, "page load").await?;
        with_page_timeout(page.content(), self.timeout, "content").await
    }
}
