//! Item cleaning and validation.
//!
//! Runs after extraction: text fields are whitespace-collapsed, prices gain
//! a normalized numeric companion, URL fields that cannot be absolute or
//! root-relative are dropped, duplicates collapse on `(title, link)`, and
//! only items with a title plus at least one of link/image/price survive.

use std::collections::HashSet;

use serde_json::Value;

use super::Item;
use super::price::normalize_price;
use crate::utils::clean_text;

const TEXT_FIELDS: &[&str] = &["title", "description", "price"];
const URL_FIELDS: &[&str] = &["link", "image"];

/// Clean, normalize, deduplicate, and validate a page's items.
#[must_use]
pub fn clean_items(items: Vec<Item>) -> Vec<Item> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut cleaned = Vec::with_capacity(items.len());

    for mut item in items {
        for field in TEXT_FIELDS {
            let cleaned = item.get_str(*field).map(clean_text);
            if let Some(text) = cleaned {
                item.set(*field, text);
            }
        }

        let normalized = item.get_str("price").map(normalize_price);
        if let Some(normalized) = normalized {
            match normalized {
                Some(value) => item.set("price_normalized", value),
                None => item.set_value("price_normalized", Value::Null),
            }
        }

        for field in URL_FIELDS {
            let invalid = item
                .get_str(*field)
                .is_some_and(|url| !is_valid_url(url));
            if invalid {
                item.remove(*field);
            }
        }

        if !is_valid_item(&item) {
            continue;
        }

        let key = (
            item.get_str("title").unwrap_or_default().to_string(),
            item.get_str("link").unwrap_or_default().to_string(),
        );
        if !seen.insert(key) {
            continue;
        }

        cleaned.push(item);
    }

    cleaned
}

/// Accept absolute, scheme-relative, and root-relative URLs only.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
        || url.starts_with('/')
}

/// An item is valid iff it has a title and at least one of link/image/price.
#[must_use]
pub fn is_valid_item(item: &Item) -> bool {
    let has_title = item.get_str("title").is_some_and(|t| !t.is_empty());
    let has_content = ["link", "image", "price"]
        .iter()
        .any(|field| item.get_str(field).is_some_and(|v| !v.is_empty()));
    has_title && has_content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pairs: &[(&str, &str)]) -> Item {
        let mut item = Item::new();
        for (key, value) in pairs {
            item.set(*key, (*value).to_string());
        }
        item
    }

    #[test]
    fn whitespace_is_collapsed_and_price_normalized() {
        let items = clean_items(vec![item(&[
            ("title", "  Red   shoe \n"),
            ("price", " $1,234.56 "),
        ])]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get_str("title"), Some("Red shoe"));
        assert_eq!(items[0].get_str("price"), Some("$1,234.56"));
        assert_eq!(
            items[0].get("price_normalized").and_then(Value::as_f64),
            Some(1234.56)
        );
    }

    #[test]
    fn unparsable_price_yields_null_normalized() {
        let items = clean_items(vec![item(&[("title", "Thing"), ("price", "call us")])]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("price_normalized"), Some(&Value::Null));
    }

    #[test]
    fn bad_urls_are_dropped() {
        let items = clean_items(vec![item(&[
            ("title", "Thing"),
            ("link", "javascript:void(0)"),
            ("image", "/ok.jpg"),
        ])]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get_str("link"), None);
        assert_eq!(items[0].get_str("image"), Some("/ok.jpg"));
    }

    #[test]
    fn duplicates_collapse_on_title_and_link() {
        let items = clean_items(vec![
            item(&[("title", "Same"), ("link", "https://e.com/1")]),
            item(&[("title", "Same"), ("link", "https://e.com/1")]),
            item(&[("title", "Same"), ("link", "https://e.com/2")]),
        ]);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn validity_requires_title_and_content() {
        // No title at all.
        assert!(clean_items(vec![item(&[("link", "https://e.com/1")])]).is_empty());
        // Title but nothing else.
        assert!(clean_items(vec![item(&[("title", "Lonely")])]).is_empty());
        // Link dropped as invalid leaves no content.
        assert!(clean_items(vec![item(&[("title", "T"), ("link", "ftp://x")])]).is_empty());
    }
}
