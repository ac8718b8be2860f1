//! Low-level helpers over the parsed DOM tree.
//!
//! The detector and extractor both walk `scraper` trees; these helpers keep
//! the traversal conventions (descendants exclude the element itself, text is
//! whitespace-collapsed) in one place.

use scraper::{ElementRef, Html};

use crate::utils::clean_text;

/// All elements of a document, in document order.
pub(crate) fn all_elements(doc: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    doc.tree.nodes().filter_map(ElementRef::wrap)
}

/// Direct child elements of an element.
pub(crate) fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Descendant elements in document order, excluding the element itself.
pub(crate) fn descendant_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Whether an element has no child elements.
pub(crate) fn is_leaf(el: ElementRef) -> bool {
    child_elements(el).next().is_none()
}

/// Collapsed text content of an element's subtree.
pub(crate) fn element_text(el: ElementRef) -> String {
    let mut raw = String::new();
    for piece in el.text() {
        raw.push_str(piece);
        raw.push(' ');
    }
    clean_text(&raw)
}

/// Lowercased `class` plus `id` haystack used by keyword heuristics.
pub(crate) fn attr_haystack(el: ElementRef) -> String {
    let value = el.value();
    let mut hay = String::new();
    for class in value.classes() {
        hay.push_str(class);
        hay.push(' ');
    }
    if let Some(id) = value.id() {
        hay.push_str(id);
    }
    hay.make_ascii_lowercase();
    hay
}

/// Depth of `node` below `root`, or `None` when `node` is outside `root`.
pub(crate) fn depth_within(root: ElementRef, node: ElementRef) -> Option<usize> {
    let mut depth = 0;
    let mut current = *node;
    while current.id() != root.id() {
        current = current.parent()?;
        depth += 1;
    }
    Some(depth)
}

/// Relative selector for a child within its container: `tag.firstClass`,
/// or the bare tag when the child carries no classes.
pub(crate) fn relative_selector(el: ElementRef) -> String {
    let value = el.value();
    match value.classes().next() {
        Some(class) => format!("{}.{class}", value.name()),
        None => value.name().to_string(),
    }
}
