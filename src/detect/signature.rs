//! Structural signatures for DOM clustering.
//!
//! A signature captures an element's tag, its sorted class list, and the
//! multiset of its direct child tags:
//!
//! ```text
//! div.card.product|a:1-h3:1-img:1
//! span.price|leaf
//! ```
//!
//! Elements sharing a signature are hypothesised to be instances of one
//! repeated template. This runs over every element of every analysed page,
//! so the builder reuses its buffers across calls and makes a single pass
//! per element.

use scraper::ElementRef;

use super::dom::child_elements;

/// Reusable signature builder.
pub struct SignatureBuilder {
    out: String,
    classes: Vec<String>,
    child_counts: Vec<(String, u32)>,
}

impl Default for SignatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(64),
            classes: Vec::with_capacity(8),
            child_counts: Vec::with_capacity(8),
        }
    }

    /// Compute the structural signature of one element.
    pub fn signature_of(&mut self, el: ElementRef) -> String {
        let value = el.value();

        self.classes.clear();
        self.classes
            .extend(value.classes().map(|c| c.to_string()));
        self.classes.sort_unstable();

        self.child_counts.clear();
        for child in child_elements(el) {
            let name = child.value().name();
            match self
                .child_counts
                .iter_mut()
                .find(|(tag, _)| tag == name)
            {
                Some((_, count)) => *count += 1,
                None => self.child_counts.push((name.to_string(), 1)),
            }
        }
        self.child_counts.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let out = &mut self.out;
        out.clear();
        out.push_str(value.name());
        out.push('.');
        if self.classes.is_empty() {
            out.push('_');
        } else {
            for (i, class) in self.classes.iter().enumerate() {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(class);
            }
        }
        out.push('|');
        if self.child_counts.is_empty() {
            out.push_str("leaf");
        } else {
            for (i, (tag, count)) in self.child_counts.iter().enumerate() {
                if i > 0 {
                    out.push('-');
                }
                out.push_str(tag);
                out.push(':');
                out.push_str(&count.to_string());
            }
        }
        out.clone()
    }
}

/// One-off signature computation.
#[must_use]
pub fn structural_signature(el: ElementRef) -> String {
    SignatureBuilder::new().signature_of(el)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(doc: &'a Html, sel: &str) -> ElementRef<'a> {
        doc.select(&Selector::parse(sel).unwrap()).next().unwrap()
    }

    #[test]
    fn signature_sorts_classes_and_children() {
        let doc = Html::parse_document(
            r#"<div class="zeta alpha"><img src="x"><h3>t</h3><a href="/p">l</a><a href="/q">m</a></div>"#,
        );
        let el = first(&doc, "div");
        assert_eq!(
            structural_signature(el),
            "div.alpha.zeta|a:2-h3:1-img:1"
        );
    }

    #[test]
    fn leaf_elements_are_marked() {
        let doc = Html::parse_document(r#"<span class="price">$9</span>"#);
        assert_eq!(structural_signature(first(&doc, "span")), "span.price|leaf");
    }

    #[test]
    fn classless_elements_use_placeholder() {
        let doc = Html::parse_document("<section><p>x</p></section>");
        assert_eq!(structural_signature(first(&doc, "section")), "section._|p:1");
    }

    #[test]
    fn identical_templates_share_a_signature() {
        let doc = Html::parse_document(
            r#"<div class="c"><h3>a</h3><a href="/1">x</a></div>
               <div class="c"><h3>b</h3><a href="/2">y</a></div>"#,
        );
        let sel = Selector::parse("div.c").unwrap();
        let mut builder = SignatureBuilder::new();
        let sigs: Vec<_> = doc.select(&sel).map(|e| builder.signature_of(e)).collect();
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0], sigs[1]);
    }
}
