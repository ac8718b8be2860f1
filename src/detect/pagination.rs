//! Pagination detection: next buttons, numbered page links, load-more.
//!
//! Strategies run in order; the first that produces a hint wins. Keyword
//! sets cover English and Vietnamese listing conventions plus the common
//! arrow glyphs.

use lazy_static::lazy_static;
use scraper::{Html, Selector};

use super::PaginationHint;
use super::containers::generate_selector;
use super::dom::{attr_haystack, element_text};
use crate::utils::resolve;

const PAGINATION_KEYWORDS: &[&str] = &[
    "next",
    "tiếp",
    "sau",
    "→",
    "›",
    "»",
    "page",
    "trang",
    "pag",
    "pagination",
    "load more",
    "xem thêm",
    "see more",
];

const LOAD_MORE_KEYWORDS: &[&str] = &["load more", "xem thêm", "see more", "load-more"];

lazy_static! {
    static ref ANCHORS: Selector = Selector::parse("a[href]").expect("anchor selector");
    static ref CLICKABLES: Selector = Selector::parse("button, a, div").expect("clickable selector");
}

/// Detect the page's pagination pattern, if any.
#[must_use]
pub fn detect_pagination(doc: &Html, base_url: &str) -> Option<PaginationHint> {
    find_next_button(doc, base_url)
        .or_else(|| find_page_numbers(doc))
        .or_else(|| find_load_more(doc))
}

fn find_next_button(doc: &Html, base_url: &str) -> Option<PaginationHint> {
    for anchor in doc.select(&ANCHORS) {
        let text = element_text(anchor).to_lowercase();
        let haystack = format!(
            "{text} {} {}",
            attr_haystack(anchor),
            anchor.value().attr("rel").unwrap_or("").to_lowercase()
        );
        if !PAGINATION_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
            continue;
        }
        let href = anchor.value().attr("href")?;
        let Some(next_url) = resolve(base_url, href) else {
            continue;
        };
        return Some(PaginationHint::Button {
            next_url,
            selector: generate_selector(anchor),
        });
    }
    None
}

fn find_page_numbers(doc: &Html) -> Option<PaginationHint> {
    let mut numbered: Vec<(u64, String)> = Vec::new();
    for anchor in doc.select(&ANCHORS) {
        let text = element_text(anchor);
        if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let Ok(page) = text.parse::<u64>() else {
            continue;
        };
        if let Some(href) = anchor.value().attr("href") {
            numbered.push((page, href.to_string()));
        }
    }
    if numbered.len() < 2 {
        return None;
    }
    numbered.sort_by_key(|(page, _)| *page);

    let url_pattern = derive_url_pattern(&numbered[0].1, &numbered[1].1);
    Some(PaginationHint::Links {
        url_pattern,
        current: numbered[0].0,
        known_pages: numbered.iter().map(|(page, _)| *page).collect(),
    })
}

/// Derive a `{page}` template by character-wise prefix comparison of the two
/// lowest-numbered hrefs.
fn derive_url_pattern(first: &str, second: &str) -> String {
    let mut pattern = String::with_capacity(first.len() + 6);
    for (a, b) in first.chars().zip(second.chars()) {
        if a != b {
            break;
        }
        pattern.push(a);
    }
    pattern.push_str("{page}");
    pattern
}

fn find_load_more(doc: &Html) -> Option<PaginationHint> {
    for el in doc.select(&CLICKABLES) {
        let haystack = format!("{} {}", element_text(el).to_lowercase(), attr_haystack(el));
        if LOAD_MORE_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
            return Some(PaginationHint::LoadMore {
                selector: generate_selector(el),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_button_wins_first() {
        let doc = Html::parse_document(
            r#"<a href="/cat?p=1">1</a><a href="/cat?p=2">2</a>
               <a class="next" href="/page/2">Next</a>"#,
        );
        let hint = detect_pagination(&doc, "https://shop.example.com/list").unwrap();
        match hint {
            PaginationHint::Button { next_url, selector } => {
                assert_eq!(next_url, "https://shop.example.com/page/2");
                assert_eq!(selector, "a.next");
            }
            other => panic!("expected button hint, got {other:?}"),
        }
    }

    #[test]
    fn rel_attribute_counts_as_keyword() {
        let doc = Html::parse_document(r#"<a rel="next" href="/l/2">more stuff</a>"#);
        let hint = detect_pagination(&doc, "https://e.com/l/1").unwrap();
        assert!(matches!(hint, PaginationHint::Button { .. }));
    }

    #[test]
    fn page_numbers_yield_template() {
        let doc = Html::parse_document(
            r#"<a href="/cat?p=1">1</a><a href="/cat?p=2">2</a><a href="/cat?p=3">3</a>"#,
        );
        let hint = detect_pagination(&doc, "https://shop.example.com/cat?p=1").unwrap();
        match hint {
            PaginationHint::Links {
                url_pattern,
                current,
                known_pages,
            } => {
                assert_eq!(url_pattern, "/cat?p={page}");
                assert_eq!(current, 1);
                assert_eq!(known_pages, vec![1, 2, 3]);
            }
            other => panic!("expected links hint, got {other:?}"),
        }
    }

    #[test]
    fn single_number_is_not_pagination() {
        let doc = Html::parse_document(r#"<a href="/cat?p=1">1</a>"#);
        assert_eq!(detect_pagination(&doc, "https://e.com/cat"), None);
    }

    #[test]
    fn load_more_is_last_resort() {
        let doc = Html::parse_document(r#"<button class="load-more-btn">Load more</button>"#);
        let hint = detect_pagination(&doc, "https://e.com/feed").unwrap();
        match hint {
            PaginationHint::LoadMore { selector } => {
                assert_eq!(selector, "button.load-more-btn");
            }
            other => panic!("expected load_more hint, got {other:?}"),
        }
    }

    #[test]
    fn no_signals_means_none() {
        let doc = Html::parse_document("<p>just an article body</p>");
        assert_eq!(detect_pagination(&doc, "https://e.com/a"), None);
    }
}
