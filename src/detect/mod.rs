//! Smart detector: DOM clustering and page-pattern recognition.
//!
//! Given a page's HTML and URL, `SmartDetector::analyze_page` produces a
//! [`PatternSet`]: scored repeating-container candidates, a pagination hint,
//! infinite-scroll indicators, and a relative-selector map for the canonical
//! content fields. Detection is pure over the HTML; the same input always
//! yields the same `PatternSet`.

pub mod containers;
pub(crate) mod dom;
pub mod pagination;
pub mod scroll;
pub mod signature;
pub mod structure;

use std::collections::HashMap;

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::extract::Item;

/// One hypothesised repeating container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContainerCandidate {
    /// CSS selector matching the cluster's members
    pub selector: String,
    /// Structural signature the cluster was bucketed by
    pub signature: String,
    /// Cluster size on the analysed page
    pub count: usize,
    /// Heuristic quality score; candidates sort by this, descending
    pub score: u32,
    /// Fields extracted from the cluster's representative element
    pub sample: Item,
}

/// Detected pagination pattern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaginationHint {
    /// An explicit next link; `next_url` is already absolute.
    Button { next_url: String, selector: String },
    /// Numbered page links sharing a `{page}` URL template.
    Links {
        url_pattern: String,
        current: u64,
        known_pages: Vec<u64>,
    },
    /// A load-more trigger. Recorded for callers with a browser driver;
    /// the core derives no next URL from it.
    LoadMore { selector: String },
}

/// Infinite-scroll indicators found on the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrollHint {
    pub indicators: Vec<String>,
}

/// Everything detection learned about one page, cached per domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatternSet {
    /// Container candidates, best first
    pub containers: Vec<ContainerCandidate>,
    pub pagination: Option<PaginationHint>,
    pub infinite_scroll: Option<ScrollHint>,
    /// Canonical field name -> relative selector inside the top container
    pub content_structure: HashMap<String, String>,
}

impl PatternSet {
    /// The winning container candidate, if any cluster survived.
    #[must_use]
    pub fn best_container(&self) -> Option<&ContainerCandidate> {
        self.containers.first()
    }
}

/// Zero-configuration pattern detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartDetector;

impl SmartDetector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Analyse a page and return every detected pattern.
    #[must_use]
    pub fn analyze_page(&self, html: &str, url: &str) -> PatternSet {
        let doc = Html::parse_document(html);

        let containers = containers::detect_containers(&doc, url);
        let pagination = pagination::detect_pagination(&doc, url);
        let infinite_scroll = scroll::detect_infinite_scroll(&doc, html);
        let content_structure = containers
            .first()
            .map(|best| structure::content_structure(&doc, &best.selector))
            .unwrap_or_default();

        PatternSet {
            containers,
            pagination,
            infinite_scroll,
            content_structure,
        }
    }
}
