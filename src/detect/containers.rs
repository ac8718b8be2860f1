//! Container clustering, scoring, and selector generation.
//!
//! Every non-inline, non-leaf element is bucketed by structural signature.
//! Buckets with at least `MIN_REPEATS` members are candidate listings; each
//! is scored by how many items it holds and how many content fields a sample
//! item yields.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html};

use super::dom::{all_elements, is_leaf};
use super::signature::SignatureBuilder;
use super::ContainerCandidate;
use crate::extract::fields;
use crate::extract::Item;

/// Minimum cluster size before a signature counts as a repeating pattern.
pub const MIN_REPEATS: usize = 3;

lazy_static! {
    /// Classes carrying a long digit run or a hex hash are build artifacts
    /// (CSS modules, hashed bundles) and too unstable for selectors.
    static ref UNSTABLE_CLASS: Regex =
        Regex::new(r"\d{4,}|[0-9a-f]{8}").expect("unstable-class pattern is valid");
}

/// Tags never proposed as containers.
fn is_inline_tag(tag: &str) -> bool {
    matches!(
        tag,
        "a" | "span"
            | "b"
            | "strong"
            | "em"
            | "i"
            | "small"
            | "label"
            | "mark"
            | "code"
            | "time"
            | "button"
            | "input"
            | "select"
            | "option"
            | "textarea"
            | "svg"
            | "path"
            | "br"
            | "hr"
            | "img"
    )
}

/// Generate a CSS selector for an element, preferring stable classes.
///
/// Falls back to `parentTag.parentClass > tag` when the element has no
/// stable class of its own, then to the bare tag. Deterministic from the
/// element alone.
#[must_use]
pub fn generate_selector(el: ElementRef) -> String {
    let value = el.value();
    let tag = value.name();

    let stable: Vec<&str> = value
        .classes()
        .filter(|class| !UNSTABLE_CLASS.is_match(class))
        .take(2)
        .collect();
    if !stable.is_empty() {
        return format!("{tag}.{}", stable.join("."));
    }

    if let Some(parent) = el.parent().and_then(ElementRef::wrap)
        && let Some(parent_class) = parent.value().classes().next()
    {
        return format!("{}.{parent_class} > {tag}", parent.value().name());
    }

    tag.to_string()
}

/// Score a container candidate from its sample item and cluster size.
#[must_use]
pub fn score_container(sample: &Item, count: usize) -> u32 {
    let mut score = 10 * count.min(20) as u32;
    if sample.get_str("title").is_some() {
        score += 100;
    }
    if sample.get_str("link").is_some() {
        score += 50;
    }
    if sample.get_str("price").is_some() {
        score += 30;
    }
    if sample.get_str("image").is_some() {
        score += 20;
    }
    if sample.get_str("description").is_some() {
        score += 10;
    }
    score
}

/// Cluster a document's elements and return scored candidates, best first.
#[must_use]
pub fn detect_containers(doc: &Html, base_url: &str) -> Vec<ContainerCandidate> {
    let mut builder = SignatureBuilder::new();
    // signature -> (representative node, cluster size); the first member
    // stands in for the template.
    let mut buckets: std::collections::HashMap<String, (ego_tree::NodeId, usize)> =
        std::collections::HashMap::new();

    for el in all_elements(doc) {
        if is_inline_tag(el.value().name()) || is_leaf(el) {
            continue;
        }
        let signature = builder.signature_of(el);
        buckets
            .entry(signature)
            .and_modify(|(_, count)| *count += 1)
            .or_insert((el.id(), 1));
    }

    let mut candidates = Vec::new();
    for (signature, (rep_id, count)) in buckets {
        if count < MIN_REPEATS {
            continue;
        }
        let Some(rep) = doc.tree.get(rep_id).and_then(ElementRef::wrap) else {
            continue;
        };
        let selector = generate_selector(rep);
        let sample = fields::sample_item(rep, base_url);
        let score = score_container(&sample, count);
        candidates.push(ContainerCandidate {
            selector,
            signature,
            count,
            score,
            sample,
        });
    }

    // Ties broken by selector so detection stays pure over the HTML.
    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.selector.cmp(&b.selector))
            .then_with(|| a.signature.cmp(&b.signature))
    });
    candidates
}
