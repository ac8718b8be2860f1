//! Smart extractor: per-item field extraction over detected patterns.
//!
//! The extractor keeps a per-domain [`PatternSet`] cache so detection runs
//! once per domain, not once per page. Extraction tries the cached
//! content-structure selectors first and falls back to the field heuristics,
//! then infers dynamic fields and attaches provenance metadata under the
//! reserved `_meta` key.

pub mod clean;
pub mod dynamic;
pub mod fields;
pub mod price;

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::detect::dom::element_text;
use crate::detect::{PatternSet, SmartDetector};
use crate::utils::{domain, resolve};

/// Reserved key carrying the container selector and structural signature
/// that produced an item.
pub const META_KEY: &str = "_meta";

/// An extracted record: canonical fields plus dynamically inferred ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Item {
    fields: serde_json::Map<String, Value>,
}

impl Item {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    #[must_use]
    pub fn as_map(&self) -> &serde_json::Map<String, Value> {
        &self.fields
    }

    #[must_use]
    pub fn into_map(self) -> serde_json::Map<String, Value> {
        self.fields
    }
}

/// Zero-configuration data extractor with a per-domain pattern cache.
#[derive(Debug, Default)]
pub struct SmartExtractor {
    detector: SmartDetector,
    patterns: DashMap<String, Arc<PatternSet>>,
}

impl SmartExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract items from a page, detecting patterns on first contact with
    /// the page's domain and reusing them afterwards.
    #[must_use]
    pub fn extract_auto(&self, html: &str, url: &str) -> Vec<Item> {
        let domain = domain(url);
        let patterns = match self.patterns.get(&domain) {
            Some(cached) => Arc::clone(&cached),
            None => self.detect_and_cache(&domain, html, url),
        };
        clean::clean_items(extract_with_patterns(html, url, &patterns))
    }

    /// Extract items after re-running detection, replacing any cached
    /// patterns for the domain.
    ///
    /// The mode-escalation path uses this: patterns learned from an empty
    /// HTML-mode body must not shadow what the rendered DOM actually holds.
    #[must_use]
    pub fn extract_fresh(&self, html: &str, url: &str) -> Vec<Item> {
        let domain = domain(url);
        let patterns = self.detect_and_cache(&domain, html, url);
        clean::clean_items(extract_with_patterns(html, url, &patterns))
    }

    /// Cached patterns for a domain.
    #[must_use]
    pub fn patterns(&self, domain: &str) -> Option<Arc<PatternSet>> {
        self.patterns.get(domain).map(|p| Arc::clone(&p))
    }

    /// Replace the cached patterns for a domain.
    pub fn set_patterns(&self, domain: &str, patterns: PatternSet) {
        self.patterns.insert(domain.to_string(), Arc::new(patterns));
    }

    pub fn clear_cache(&self) {
        self.patterns.clear();
    }

    #[must_use]
    pub fn detector(&self) -> &SmartDetector {
        &self.detector
    }

    fn detect_and_cache(&self, domain: &str, html: &str, url: &str) -> Arc<PatternSet> {
        let patterns = Arc::new(self.detector.analyze_page(html, url));
        self.patterns
            .insert(domain.to_string(), Arc::clone(&patterns));
        patterns
    }
}

fn extract_with_patterns(html: &str, url: &str, patterns: &PatternSet) -> Vec<Item> {
    let Some(best) = patterns.best_container() else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse(&best.selector) else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);
    doc.select(&selector)
        .map(|el| {
            extract_item(
                el,
                url,
                &patterns.content_structure,
                &best.selector,
                &best.signature,
            )
        })
        .collect()
}

/// Extract one item from a container element.
pub(crate) fn extract_item(
    el: ElementRef,
    base_url: &str,
    structure: &HashMap<String, String>,
    container_selector: &str,
    container_signature: &str,
) -> Item {
    let mut item = Item::new();

    // Content-structure fast path.
    if let Some(found) = select_first(el, structure.get("title")) {
        let text = element_text(found);
        if !text.is_empty() {
            item.set("title", text);
        }
    }
    if let Some(found) = select_first(el, structure.get("link"))
        && let Some(href) = found.value().attr("href")
        && let Some(link) = resolve(base_url, href)
    {
        item.set("link", link);
    }
    if let Some(found) = select_first(el, structure.get("image")) {
        let src = found
            .value()
            .attr("src")
            .or_else(|| found.value().attr("data-src"));
        if let Some(src) = src
            && let Some(image) = resolve(base_url, src)
        {
            item.set("image", image);
        }
    }
    if let Some(found) = select_first(el, structure.get("price")) {
        let text = element_text(found);
        if !text.is_empty() {
            item.set("price", text);
        }
    }

    // Heuristic fallbacks for whatever the fast path missed.
    if !item.contains("title")
        && let Some(title) = fields::extract_title(el)
    {
        item.set("title", title);
    }
    if !item.contains("link")
        && let Some(link) = fields::extract_link(el, base_url)
    {
        item.set("link", link);
    }
    if !item.contains("image")
        && let Some(image) = fields::extract_image(el, base_url)
    {
        item.set("image", image);
    }
    if !item.contains("price")
        && let Some(price) = fields::extract_price(el)
    {
        item.set("price", price);
    }
    if let Some(description) = fields::extract_description(el) {
        item.set("description", description);
    }

    dynamic::extract_dynamic_fields(el, base_url, &mut item);

    let mut meta = serde_json::Map::new();
    meta.insert(
        "selector".to_string(),
        Value::String(container_selector.to_string()),
    );
    meta.insert(
        "signature".to_string(),
        Value::String(container_signature.to_string()),
    );
    item.set_value(META_KEY, Value::Object(meta));

    item
}

fn select_first<'a>(el: ElementRef<'a>, selector: Option<&String>) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector?).ok()?;
    el.select(&selector).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <div class="product-card"><h3>Red shoe</h3><img src="/r.jpg">
            <span class="price">$10.50</span><a href="/p/1">view</a>
            <span class="badge">Sale</span></div>
          <div class="product-card"><h3>Blue shoe</h3><img src="/b.jpg">
            <span class="price">$20</span><a href="/p/2">view</a>
            <span class="badge">New</span></div>
          <div class="product-card"><h3>Green shoe</h3><img src="/g.jpg">
            <span class="price">$30</span><a href="/p/3">view</a>
            <span class="badge">Hot</span></div>
        </body></html>"#;

    const URL: &str = "https://shop.example.com/list";

    #[test]
    fn extracts_all_cards_with_canonical_fields() {
        let extractor = SmartExtractor::new();
        let items = extractor.extract_auto(LISTING, URL);
        assert_eq!(items.len(), 3);

        let titles: Vec<_> = items.iter().filter_map(|i| i.get_str("title")).collect();
        assert_eq!(titles, vec!["Red shoe", "Blue shoe", "Green shoe"]);

        let first = &items[0];
        assert_eq!(first.get_str("link"), Some("https://shop.example.com/p/1"));
        assert_eq!(first.get_str("image"), Some("https://shop.example.com/r.jpg"));
        assert_eq!(
            first.get("price_normalized").and_then(Value::as_f64),
            Some(10.50)
        );
        assert_eq!(first.get_str("badge"), Some("Sale"));
    }

    #[test]
    fn metadata_carries_selector_and_signature() {
        let extractor = SmartExtractor::new();
        let items = extractor.extract_auto(LISTING, URL);
        let meta = items[0].get(META_KEY).and_then(Value::as_object).unwrap();
        assert_eq!(
            meta.get("selector").and_then(Value::as_str),
            Some("div.product-card")
        );
        assert!(meta.get("signature").and_then(Value::as_str).is_some());
    }

    #[test]
    fn cache_holds_patterns_identical_to_fresh_detection() {
        let extractor = SmartExtractor::new();
        let _ = extractor.extract_auto(LISTING, URL);
        let cached = extractor.patterns("shop.example.com").expect("cached");
        let fresh = SmartDetector::new().analyze_page(LISTING, URL);
        assert_eq!(*cached, fresh);
    }

    #[test]
    fn extract_fresh_replaces_stale_patterns() {
        let extractor = SmartExtractor::new();
        // First contact with an empty body caches an empty pattern set.
        let items = extractor.extract_auto("<html><body></body></html>", URL);
        assert!(items.is_empty());
        // A cached empty pattern keeps yielding nothing for the rich page.
        assert!(extractor.extract_auto(LISTING, URL).is_empty());
        // Fresh extraction re-detects and recovers the items.
        let items = extractor.extract_fresh(LISTING, URL);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn pages_without_patterns_yield_no_items() {
        let extractor = SmartExtractor::new();
        let items = extractor.extract_auto("<p>nothing repeating here</p>", "https://x.com/");
        assert!(items.is_empty());
    }
}
