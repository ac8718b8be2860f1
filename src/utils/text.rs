//! Text cleanup helpers shared by the detector and extractor.

/// Collapse whitespace runs into single spaces and trim the ends.
///
/// Extracted DOM text tends to carry the indentation of the source markup;
/// every text field passes through here before it reaches an item.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Normalise an attribute token to a snake_case key.
///
/// Non-alphanumeric runs become single underscores; leading and trailing
/// underscores are stripped. Used by dynamic field inference.
#[must_use]
pub fn snake_token(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut last_was_sep = true;
    for ch in token.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_runs() {
        assert_eq!(clean_text("  a \n\t b  c  "), "a b c");
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn snake_token_normalises() {
        assert_eq!(snake_token("Posted-By"), "posted_by");
        assert_eq!(snake_token("__meta__"), "meta");
        assert_eq!(snake_token("price$value"), "price_value");
        assert_eq!(snake_token("***"), "");
    }
}
