//! Infinite-scroll detection.
//!
//! Detection only: the hint records which indicators fired so a browser
//! driver higher up the stack can decide to scroll. Nothing in this crate
//! drives the scrolling.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

use super::ScrollHint;
use super::dom::all_elements;

const SCROLL_KEYWORDS: &[&str] = &[
    "infinite",
    "scroll",
    "lazy",
    "load-more",
    "auto-load",
    "endless",
    "continuous",
];

lazy_static! {
    static ref SCRIPTS: Selector = Selector::parse("script").expect("script selector");
    static ref API_LOAD: Regex =
        Regex::new(r"(?i)(/api/.*?load|/ajax/.*?load)").expect("api-load pattern");
}

/// Look for infinite-scroll indicators in scripts, attributes, and raw HTML.
#[must_use]
pub fn detect_infinite_scroll(doc: &Html, raw_html: &str) -> Option<ScrollHint> {
    let mut indicators = Vec::new();

    for script in doc.select(&SCRIPTS) {
        let body: String = script.text().collect::<String>().to_lowercase();
        if SCROLL_KEYWORDS.iter().any(|kw| body.contains(kw)) {
            indicators.push("script".to_string());
        }
    }

    for el in all_elements(doc) {
        let haystack = super::dom::attr_haystack(el);
        if SCROLL_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
            indicators.push(format!("element:{}", el.value().name()));
        }
    }

    indicators.extend(
        API_LOAD
            .find_iter(raw_html)
            .take(3)
            .map(|m| m.as_str().to_string()),
    );

    if indicators.is_empty() {
        None
    } else {
        Some(ScrollHint { indicators })
    }
}
