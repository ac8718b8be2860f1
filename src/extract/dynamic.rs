//! Dynamic field inference from DOM hints.
//!
//! Descendants near the container surface (depth <= 2) that are not one of
//! the canonical fields get a key inferred from their attributes: tokens are
//! normalised to snake_case and folded through a synonym map, with prefix
//! matches (`author_*`, `date_*`) reduced to the prefix. Values come from
//! the node's text, or from the natural attribute for images, links, time
//! elements, and meta tags. First write wins; canonical fields are never
//! overwritten.

use scraper::ElementRef;

use super::Item;
use crate::detect::dom::{depth_within, descendant_elements, element_text};
use crate::utils::text::snake_token;
use crate::utils::resolve;

const MAX_DEPTH: usize = 2;

const HINT_ATTRS: &[&str] = &[
    "class",
    "id",
    "itemprop",
    "aria-label",
    "data-name",
    "data-field",
    "data-type",
    "data-category",
    "data-meta",
];

const CANONICAL: &[&str] = &["title", "link", "image", "price", "description"];

const REDUCIBLE_PREFIXES: &[&str] = &[
    "author_", "date_", "time_", "category_", "tag_", "label_", "badge_",
];

fn synonym(token: &str) -> Option<&'static str> {
    Some(match token {
        "author" | "byline" | "writer" | "posted_by" => "author",
        "time" => "time",
        "date" | "datetime" | "published" => "date",
        "updated" => "updated",
        "category" | "cat" | "section" => "category",
        "tag" | "tags" => "tag",
        "label" => "label",
        "badge" => "badge",
        "subtitle" => "subtitle",
        "summary" | "excerpt" => "summary",
        "rating" => "rating",
        "reviews" => "reviews",
        "comment" | "comments" => "comments",
        "meta" => "meta",
        _ => return None,
    })
}

/// Infer and attach dynamic fields to an item.
pub fn extract_dynamic_fields(el: ElementRef, base_url: &str, item: &mut Item) {
    for node in descendant_elements(el) {
        match depth_within(el, node) {
            Some(depth) if depth <= MAX_DEPTH => {}
            _ => continue,
        }

        let Some(key) = infer_field_key(node) else {
            continue;
        };
        if CANONICAL.contains(&key.as_str()) || item.contains(&key) {
            continue;
        }

        if let Some(value) = node_value(node, base_url) {
            item.set(key, value);
        }
    }
}

/// Guess a field name from the node's attribute hints.
fn infer_field_key(node: ElementRef) -> Option<String> {
    let mut tokens: Vec<String> = Vec::new();
    for attr in HINT_ATTRS {
        let Some(value) = node.value().attr(attr) else {
            continue;
        };
        for raw in value.split_whitespace() {
            let token = snake_token(raw);
            if !token.is_empty() {
                tokens.push(token);
            }
        }
    }

    for token in &tokens {
        if let Some(mapped) = synonym(token) {
            return Some(mapped.to_string());
        }
        if REDUCIBLE_PREFIXES.iter().any(|p| token.starts_with(p)) {
            return token.split('_').next().map(str::to_string);
        }
    }

    if let Some(first) = tokens.into_iter().next() {
        return Some(first);
    }

    match node.value().name() {
        "time" => Some("date".to_string()),
        "label" => Some("label".to_string()),
        "small" => Some("meta".to_string()),
        _ => None,
    }
}

/// The node's value: text, or the natural attribute for special tags.
fn node_value(node: ElementRef, base_url: &str) -> Option<String> {
    let value = node.value();
    match value.name() {
        "img" => {
            for attr in ["src", "data-src", "data-lazy", "data-original"] {
                if let Some(src) = value.attr(attr) {
                    let token = src.split_whitespace().next().unwrap_or(src);
                    return resolve(base_url, token);
                }
            }
            None
        }
        "a" if value.attr("href").is_some() => {
            let text = element_text(node);
            if text.chars().count() < 3 {
                resolve(base_url, value.attr("href").unwrap_or(""))
            } else {
                Some(text)
            }
        }
        "time" if value.attr("datetime").is_some() => {
            value.attr("datetime").map(str::to_string)
        }
        "meta" if value.attr("content").is_some() => {
            value.attr("content").map(|c| c.trim().to_string())
        }
        _ => {
            let text = element_text(node);
            if text.is_empty() { None } else { Some(text) }
        }
    }
}
