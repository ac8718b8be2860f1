//! Tests for the dual-mode engine over a mock HTTP site.
//!
//! Browser escalation needs a real Chromium and is exercised separately;
//! these tests run the engine with the browser disabled.

use std::sync::Arc;

use pagesift::{
    CrawlConfig, CrawlMode, Credentials, DualModeEngine, ProxyProvider,
};

const LISTING: &str = r#"
    <html><body>
      <div class="product-card"><h3>Red shoe</h3><img src="/img/r.jpg">
        <span class="price">$10.50</span><a href="/p/1">view</a></div>
      <div class="product-card"><h3>Blue shoe</h3><img src="/img/b.jpg">
        <span class="price">$20.00</span><a href="/p/2">view</a></div>
      <div class="product-card"><h3>Green shoe</h3><img src="/img/g.jpg">
        <span class="price">$30.00</span><a href="/p/3">view</a></div>
      <a class="next" href="/page/2">Next</a>
    </body></html>"#;

fn engine() -> Arc<DualModeEngine> {
    let config = CrawlConfig::builder()
        .enable_browser(false)
        .retry(1)
        .delay_range(0.0, 0.0)
        .build()
        .expect("valid config");
    Arc::new(DualModeEngine::new(
        &config,
        Credentials::default(),
        Arc::new(ProxyProvider::disabled()),
    ))
}

#[tokio::test]
async fn extracts_items_and_next_page_from_a_listing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/list")
        .with_status(200)
        .with_body(LISTING)
        .create_async()
        .await;

    let engine = engine();
    let url = format!("{}/list", server.url());
    let extraction = engine.fetch_and_extract(&url, CrawlMode::Html).await;

    assert!(extraction.fetched);
    assert_eq!(extraction.mode, CrawlMode::Html);
    assert_eq!(extraction.items.len(), 3);
    assert_eq!(
        extraction.next_url.as_deref(),
        Some(format!("{}/page/2", server.url()).as_str())
    );

    let first = &extraction.items[0];
    assert_eq!(first.get_str("title"), Some("Red shoe"));
    assert_eq!(
        first.get_str("link"),
        Some(format!("{}/p/1", server.url()).as_str())
    );
    assert_eq!(
        first.get("price_normalized").and_then(serde_json::Value::as_f64),
        Some(10.50)
    );
}

#[tokio::test]
async fn numbered_pagination_yields_the_next_template_page() {
    let mut server = mockito::Server::new_async().await;
    let body = r#"
        <html><body>
          <ul>
            <li class="row"><h4>Item one</h4><a href="/d/1">open</a></li>
            <li class="row"><h4>Item two</h4><a href="/d/2">open</a></li>
            <li class="row"><h4>Item three</h4><a href="/d/3">open</a></li>
          </ul>
          <nav><a href="/cat?p=1">1</a><a href="/cat?p=2">2</a><a href="/cat?p=3">3</a></nav>
        </body></html>"#;
    server
        .mock("GET", "/cat?p=1")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let engine = engine();
    let url = format!("{}/cat?p=1", server.url());
    let extraction = engine.fetch_and_extract(&url, CrawlMode::Html).await;

    assert!(extraction.fetched);
    assert_eq!(
        extraction.next_url.as_deref(),
        Some(format!("{}/cat?p=2", server.url()).as_str())
    );
}

#[tokio::test]
async fn failed_fetch_reports_unfetched_extraction() {
    let engine = engine();
    let extraction = engine
        .fetch_and_extract("http://127.0.0.1:9/list", CrawlMode::Html)
        .await;

    assert!(!extraction.fetched);
    assert!(extraction.items.is_empty());
    assert_eq!(extraction.next_url, None);

    let stats = engine.stats();
    assert_eq!(stats.html_failed, 1);
    assert_eq!(stats.html_success, 0);
}

#[tokio::test]
async fn auto_mode_respects_remembered_browser_preference() {
    let mut server = mockito::Server::new_async().await;
    // With the browser disabled, a remembered browser preference means the
    // fetch is attempted (and fails) in browser mode, never over HTTP.
    let http = server
        .mock("GET", "/page")
        .expect(0)
        .create_async()
        .await;

    let engine = engine();
    let url = format!("{}/page", server.url());
    let host = pagesift::utils::domain(&url);
    engine.set_domain_mode(&host, CrawlMode::Browser);

    let (html, mode) = engine.fetch(&url, CrawlMode::Auto).await;
    assert_eq!(html, None);
    assert_eq!(mode, CrawlMode::Browser);
    http.assert_async().await;
}

#[tokio::test]
async fn batch_fetch_returns_an_entry_per_url() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/a")
        .with_status(200)
        .with_body("<html>a</html>")
        .create_async()
        .await;
    server
        .mock("GET", "/b")
        .with_status(200)
        .with_body("<html>b</html>")
        .create_async()
        .await;

    let engine = engine();
    let urls = vec![
        format!("{}/a", server.url()),
        format!("{}/b", server.url()),
        "http://127.0.0.1:9/dead".to_string(),
    ];
    let results = engine.fetch_batch(&urls, CrawlMode::Html, Some(2)).await;

    assert_eq!(results.len(), 3);
    let ok = results.iter().filter(|(_, html, _)| html.is_some()).count();
    assert_eq!(ok, 2);
}

#[tokio::test]
async fn probe_reports_patterns_and_samples() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/list")
        .with_status(200)
        .with_body(LISTING)
        .create_async()
        .await;

    let engine = engine();
    let url = format!("{}/list", server.url());
    let probe = engine.probe(&url, CrawlMode::Html).await;

    assert_eq!(probe.items.len(), 3);
    let patterns = probe.patterns.expect("patterns cached by the probe");
    let best = patterns.best_container().expect("container detected");
    assert_eq!(best.selector, "div.product-card");
    assert_eq!(best.count, 3);
    assert!(patterns.pagination.is_some());
}

#[tokio::test]
async fn engine_stats_accumulate() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/one")
        .with_status(200)
        .with_body("<html>x</html>")
        .create_async()
        .await;

    let engine = engine();
    let _ = engine
        .fetch(&format!("{}/one", server.url()), CrawlMode::Html)
        .await;
    let _ = engine.fetch("http://127.0.0.1:9/two", CrawlMode::Html).await;

    let stats = engine.stats();
    assert_eq!(stats.html_success, 1);
    assert_eq!(stats.html_failed, 1);
    assert_eq!(stats.total_requests, 2);
    assert!((stats.html_success_rate - 0.5).abs() < f64::EPSILON);
}
