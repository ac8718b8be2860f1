//! Content-structure analysis: per-field relative selectors.
//!
//! Samples up to five instances of the winning container and records where
//! each canonical field lives inside them, as a `tag.firstClass` relative
//! selector. The most common location across samples wins, giving the
//! extractor a fast path that survives minor per-item variation.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};

use super::dom::{attr_haystack, descendant_elements, element_text, is_leaf, relative_selector};
use crate::extract::price::CURRENCY_RE;

const SAMPLE_LIMIT: usize = 5;
const TITLE_HINTS: &[&str] = &["title", "name", "heading"];

/// Build the field -> relative-selector map for a container selector.
#[must_use]
pub fn content_structure(doc: &Html, container_selector: &str) -> HashMap<String, String> {
    let Ok(selector) = Selector::parse(container_selector) else {
        return HashMap::new();
    };

    let mut votes: HashMap<&'static str, HashMap<String, usize>> = HashMap::new();
    let mut vote = |field: &'static str, el: ElementRef| {
        *votes
            .entry(field)
            .or_default()
            .entry(relative_selector(el))
            .or_insert(0) += 1;
    };

    for sample in doc.select(&selector).take(SAMPLE_LIMIT) {
        if let Some(el) = find_title_element(sample) {
            vote("title", el);
        }
        if let Some(el) = descendant_elements(sample)
            .find(|e| e.value().name() == "a" && e.value().attr("href").is_some())
        {
            vote("link", el);
        }
        if let Some(el) = descendant_elements(sample).find(|e| e.value().name() == "img") {
            vote("image", el);
        }
        if let Some(el) = find_price_element(sample) {
            vote("price", el);
        }
    }

    votes
        .into_iter()
        .filter_map(|(field, counts)| {
            most_common(counts).map(|selector| (field.to_string(), selector))
        })
        .collect()
}

/// First heading, else first descendant hinting at a title in class/id.
fn find_title_element(container: ElementRef) -> Option<ElementRef<'_>> {
    descendant_elements(container)
        .find(|el| {
            matches!(
                el.value().name(),
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
            )
        })
        .or_else(|| {
            descendant_elements(container).find(|el| {
                let haystack = attr_haystack(*el);
                TITLE_HINTS.iter().any(|hint| haystack.contains(hint))
            })
        })
}

/// First leaf descendant that is price-like by class/id or by currency text.
fn find_price_element(container: ElementRef) -> Option<ElementRef<'_>> {
    descendant_elements(container).find(|el| {
        if !is_leaf(*el) {
            return false;
        }
        let haystack = attr_haystack(*el);
        if haystack.contains("price") || haystack.contains("cost") {
            return true;
        }
        CURRENCY_RE.is_match(&element_text(*el))
    })
}

/// Highest-voted selector; ties resolved lexicographically for determinism.
fn most_common(counts: HashMap<String, usize>) -> Option<String> {
    counts
        .into_iter()
        .max_by(|(sel_a, count_a), (sel_b, count_b)| {
            count_a.cmp(count_b).then_with(|| sel_b.cmp(sel_a))
        })
        .map(|(selector, _)| selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_fields_to_relative_selectors() {
        let doc = Html::parse_document(
            r#"
            <div class="card"><h3 class="name">A</h3><a href="/1">go</a>
              <img class="thumb" src="/a.jpg"><span class="price">$5</span></div>
            <div class="card"><h3 class="name">B</h3><a href="/2">go</a>
              <img class="thumb" src="/b.jpg"><span class="price">$6</span></div>
            <div class="card"><h3 class="name">C</h3><a href="/3">go</a>
              <img class="thumb" src="/c.jpg"><span class="price">$7</span></div>
            "#,
        );
        let structure = content_structure(&doc, "div.card");
        assert_eq!(structure.get("title").map(String::as_str), Some("h3.name"));
        assert_eq!(structure.get("link").map(String::as_str), Some("a"));
        assert_eq!(structure.get("image").map(String::as_str), Some("img.thumb"));
        assert_eq!(
            structure.get("price").map(String::as_str),
            Some("span.price")
        );
    }

    #[test]
    fn price_found_by_currency_text_alone() {
        let doc = Html::parse_document(
            r#"<li class="row"><h4>X</h4><em>$1,200</em></li>
               <li class="row"><h4>Y</h4><em>$900</em></li>"#,
        );
        let structure = content_structure(&doc, "li.row");
        assert_eq!(structure.get("price").map(String::as_str), Some("em"));
    }

    #[test]
    fn invalid_selector_yields_empty_map() {
        let doc = Html::parse_document("<div></div>");
        assert!(content_structure(&doc, "div..broken((").is_empty());
    }

    #[test]
    fn missing_fields_are_absent() {
        let doc = Html::parse_document(
            r#"<div class="t"><h5>first idea</h5></div><div class="t"><h5>second idea</h5></div>"#,
        );
        let structure = content_structure(&doc, "div.t");
        assert!(structure.contains_key("title"));
        assert!(!structure.contains_key("image"));
        assert!(!structure.contains_key("price"));
    }
}
