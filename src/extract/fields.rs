//! Canonical field heuristics: title, link, image, price, description.
//!
//! These run when the content-structure fast path is absent or comes up
//! empty. Each follows the same shape: try the strongest signal first, fall
//! back through weaker ones, give up with `None`.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::ElementRef;

use super::Item;
use super::price::CURRENCY_RE;
use crate::detect::dom::{attr_haystack, descendant_elements, element_text};
use crate::utils::{clean_text, resolve};

const TITLE_HINTS: &[&str] = &["title", "name", "heading", "product-name", "item-name"];
const PRICE_HINTS: &[&str] = &["price", "cost", "amount", "gia", "valor", "precio"];
const DESC_HINTS: &[&str] = &[
    "desc",
    "description",
    "summary",
    "excerpt",
    "content",
    "text",
    "detail",
];
const LINK_DATA_ATTRS: &[&str] = &["data-url", "data-href", "data-link"];
const IMG_SRC_ATTRS: &[&str] = &["src", "data-src", "data-lazy", "data-original", "data-srcset"];

lazy_static! {
    static ref STYLE_URL: Regex =
        Regex::new(r#"url\(['"]?([^'"]+)['"]?\)"#).expect("style url pattern");
    static ref QUOTED: Regex = Regex::new(r#"["']([^"']+)["']"#).expect("quoted pattern");
}

/// Extract the five canonical fields into a fresh item.
///
/// Used by the detector to build candidate samples; full extraction adds
/// structure-guided lookups, dynamic fields, and metadata on top.
#[must_use]
pub fn sample_item(el: ElementRef, base_url: &str) -> Item {
    let mut item = Item::new();
    if let Some(title) = extract_title(el) {
        item.set("title", title);
    }
    if let Some(link) = extract_link(el, base_url) {
        item.set("link", link);
    }
    if let Some(image) = extract_image(el, base_url) {
        item.set("image", image);
    }
    if let Some(price) = extract_price(el) {
        item.set("price", price);
    }
    if let Some(description) = extract_description(el) {
        item.set("description", description);
    }
    item
}

/// Headings first, then title-ish class/id hints, then the container's
/// `title` attribute, then the first image's `alt`.
#[must_use]
pub fn extract_title(el: ElementRef) -> Option<String> {
    for heading in descendant_elements(el).filter(|e| {
        matches!(
            e.value().name(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        )
    }) {
        let text = element_text(heading);
        if text.chars().count() > 3 {
            return Some(text);
        }
    }

    for node in descendant_elements(el) {
        let haystack = attr_haystack(node);
        if TITLE_HINTS.iter().any(|hint| haystack.contains(hint)) {
            let text = element_text(node);
            if text.chars().count() > 3 {
                return Some(text);
            }
        }
    }

    if let Some(title) = el.value().attr("title") {
        let title = clean_text(title);
        if !title.is_empty() {
            return Some(title);
        }
    }

    descendant_elements(el)
        .find(|e| e.value().name() == "img")
        .and_then(|img| img.value().attr("alt"))
        .map(clean_text)
        .filter(|alt| !alt.is_empty())
}

/// First anchor, then `data-*` link attributes, then an `onclick` handler
/// that navigates. Resolved against the page URL.
#[must_use]
pub fn extract_link(el: ElementRef, base_url: &str) -> Option<String> {
    if let Some(anchor) = descendant_elements(el)
        .find(|e| e.value().name() == "a" && e.value().attr("href").is_some())
        && let Some(href) = anchor.value().attr("href")
    {
        return resolve(base_url, href);
    }

    for attr in LINK_DATA_ATTRS {
        if let Some(value) = el.value().attr(attr) {
            return resolve(base_url, value);
        }
    }

    let onclick = el.value().attr("onclick").unwrap_or("");
    if onclick.contains("location.href") || onclick.contains("window.open") {
        if let Some(captured) = QUOTED.captures(onclick) {
            return resolve(base_url, &captured[1]);
        }
    }

    None
}

/// First image's source attributes, then a CSS background, then a
/// `<source srcset>`. Resolved against the page URL.
#[must_use]
pub fn extract_image(el: ElementRef, base_url: &str) -> Option<String> {
    if let Some(img) = descendant_elements(el).find(|e| e.value().name() == "img") {
        for attr in IMG_SRC_ATTRS {
            if let Some(value) = img.value().attr(attr) {
                let src = first_srcset_token(value);
                if !src.is_empty() {
                    return resolve(base_url, src);
                }
            }
        }
    }

    for node in descendant_elements(el) {
        if let Some(style) = node.value().attr("style")
            && let Some(captured) = STYLE_URL.captures(style)
        {
            return resolve(base_url, &captured[1]);
        }
    }

    if let Some(source) = descendant_elements(el)
        .find(|e| e.value().name() == "source" && e.value().attr("srcset").is_some())
        && let Some(srcset) = source.value().attr("srcset")
    {
        return resolve(base_url, first_srcset_token(srcset));
    }

    None
}

/// A srcset-style value carries `url widthDescriptor, ...`; keep the URL.
fn first_srcset_token(value: &str) -> &str {
    value.split_whitespace().next().unwrap_or(value)
}

/// Length in characters, not bytes; the blurb window is a human measure.
fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Price-hinted descendants with currency text, then `data-price`, then the
/// first currency match anywhere in the container text.
#[must_use]
pub fn extract_price(el: ElementRef) -> Option<String> {
    for node in descendant_elements(el) {
        let haystack = attr_haystack(node);
        if PRICE_HINTS.iter().any(|hint| haystack.contains(hint)) {
            let text = element_text(node);
            if CURRENCY_RE.is_match(&text) {
                return Some(text);
            }
        }
    }

    if let Some(value) = el.value().attr("data-price") {
        let value = clean_text(value);
        if !value.is_empty() {
            return Some(value);
        }
    }

    let text = element_text(el);
    CURRENCY_RE
        .find(&text)
        .map(|m| clean_text(m.as_str()))
}

/// Description-hinted descendants, then paragraphs, then a nested meta tag.
/// Text must be a plausible blurb: longer than 20 and shorter than 500.
#[must_use]
pub fn extract_description(el: ElementRef) -> Option<String> {
    for node in descendant_elements(el) {
        let haystack = attr_haystack(node);
        if DESC_HINTS.iter().any(|hint| haystack.contains(hint)) {
            let text = element_text(node);
            if char_len(&text) > 20 && char_len(&text) < 500 {
                return Some(text);
            }
        }
    }

    for p in descendant_elements(el).filter(|e| e.value().name() == "p") {
        let text = element_text(p);
        if char_len(&text) > 20 && char_len(&text) < 500 {
            return Some(text);
        }
    }

    descendant_elements(el)
        .find(|e| {
            e.value().name() == "meta" && e.value().attr("name") == Some("description")
        })
        .and_then(|meta| meta.value().attr("content"))
        .map(clean_text)
        .filter(|content| !content.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn container(html: &str) -> (Html, Selector) {
        (Html::parse_document(html), Selector::parse(".c").unwrap())
    }

    fn with_el<T>(html: &str, f: impl FnOnce(ElementRef) -> T) -> T {
        let (doc, sel) = container(html);
        f(doc.select(&sel).next().expect("container"))
    }

    const BASE: &str = "https://shop.example.com/list";

    #[test]
    fn title_prefers_headings() {
        let title = with_el(
            r#"<div class="c"><span class="name">hint name</span><h2>Heading title</h2></div>"#,
            extract_title,
        );
        assert_eq!(title.as_deref(), Some("Heading title"));
    }

    #[test]
    fn title_falls_back_to_hints_then_alt() {
        let title = with_el(
            r#"<div class="c"><span class="product-name">Fancy kettle</span></div>"#,
            extract_title,
        );
        assert_eq!(title.as_deref(), Some("Fancy kettle"));

        let title = with_el(
            r#"<div class="c"><img src="/k.jpg" alt="Kettle photo"></div>"#,
            extract_title,
        );
        assert_eq!(title.as_deref(), Some("Kettle photo"));
    }

    #[test]
    fn short_headings_are_skipped() {
        let title = with_el(
            r#"<div class="c"><h3>Ad</h3><div class="title">Real product title</div></div>"#,
            extract_title,
        );
        assert_eq!(title.as_deref(), Some("Real product title"));
    }

    #[test]
    fn link_resolves_anchor_then_data_then_onclick() {
        let link = with_el(
            r#"<div class="c"><a href="/p/9">view</a></div>"#,
            |el| extract_link(el, BASE),
        );
        assert_eq!(link.as_deref(), Some("https://shop.example.com/p/9"));

        let link = with_el(
            r#"<div class="c" data-href="/p/10"><b>x</b></div>"#,
            |el| extract_link(el, BASE),
        );
        assert_eq!(link.as_deref(), Some("https://shop.example.com/p/10"));

        let link = with_el(
            r#"<div class="c" onclick="location.href='/p/11'"><b>x</b></div>"#,
            |el| extract_link(el, BASE),
        );
        assert_eq!(link.as_deref(), Some("https://shop.example.com/p/11"));
    }

    #[test]
    fn image_handles_lazy_attrs_and_srcset() {
        let image = with_el(
            r#"<div class="c"><img data-src="/lazy.jpg"></div>"#,
            |el| extract_image(el, BASE),
        );
        assert_eq!(image.as_deref(), Some("https://shop.example.com/lazy.jpg"));

        let image = with_el(
            r#"<div class="c"><img data-srcset="/a-2x.jpg 2x, /a-1x.jpg 1x"></div>"#,
            |el| extract_image(el, BASE),
        );
        assert_eq!(image.as_deref(), Some("https://shop.example.com/a-2x.jpg"));

        let image = with_el(
            r#"<div class="c"><div style="background: url('/bg.png') no-repeat"><i>x</i></div></div>"#,
            |el| extract_image(el, BASE),
        );
        assert_eq!(image.as_deref(), Some("https://shop.example.com/bg.png"));
    }

    #[test]
    fn price_prefers_hinted_elements() {
        let price = with_el(
            r#"<div class="c"><span class="price">$ 19.99</span><p>only $5 shipping</p></div>"#,
            extract_price,
        );
        assert_eq!(price.as_deref(), Some("$ 19.99"));
    }

    #[test]
    fn price_falls_back_to_data_attr_and_text() {
        let price = with_el(
            r#"<div class="c" data-price="42.00"><b>x</b></div>"#,
            extract_price,
        );
        assert_eq!(price.as_deref(), Some("42.00"));

        let price = with_el(
            r#"<div class="c"><p>Now only €15,00 today</p></div>"#,
            extract_price,
        );
        assert_eq!(price.as_deref(), Some("€15,00"));
    }

    #[test]
    fn description_respects_length_window() {
        let desc = with_el(
            r#"<div class="c"><p class="desc">ok</p>
               <p>A plain paragraph that is comfortably long enough to qualify.</p></div>"#,
            extract_description,
        );
        assert_eq!(
            desc.as_deref(),
            Some("A plain paragraph that is comfortably long enough to qualify.")
        );
    }
}
